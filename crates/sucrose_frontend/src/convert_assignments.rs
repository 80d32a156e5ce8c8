use std::collections::BTreeSet;

use sucrose_common::data::cell_ast as cell;
use sucrose_common::data::kernel_ast as kernel;
use sucrose_common::util::progress_logger::{ProgressLogger, ProgressSession};

/// The variables assigned somewhere in `expr` that are bound outside of it.
pub fn assigned_vars(expr: &kernel::Expr) -> BTreeSet<String> {
    use kernel::Expr as E;

    match expr {
        E::Int(_) | E::Bool(_) | E::Unit | E::Var(_) => BTreeSet::new(),

        E::Assign(name, value) => {
            let mut vars = assigned_vars(value);
            vars.insert(name.clone());
            vars
        }

        E::Let(name, value, body) => {
            let mut vars = assigned_vars(body);
            vars.remove(name);
            vars.extend(assigned_vars(value));
            vars
        }

        E::Lambda(params, body) => {
            let mut vars = assigned_vars(body);
            for param in params {
                vars.remove(param);
            }
            vars
        }

        E::Prim(_, lhs, rhs) => union([lhs.as_ref(), rhs.as_ref()]),
        E::If(cond, then_, else_) => union([cond.as_ref(), then_.as_ref(), else_.as_ref()]),
        E::While(cond, body) => union([cond.as_ref(), body.as_ref()]),
        E::Do(effect, value) => union([effect.as_ref(), value.as_ref()]),
        E::Tuple(items) => union(items),
        E::Get(tuple, _) => assigned_vars(tuple),
        E::Set(tuple, _, value) => union([tuple.as_ref(), value.as_ref()]),
        E::Apply(func, args) => union(std::iter::once(func.as_ref()).chain(args)),
    }
}

fn union<'a>(exprs: impl IntoIterator<Item = &'a kernel::Expr>) -> BTreeSet<String> {
    exprs.into_iter().flat_map(assigned_vars).collect()
}

fn cell_of(value: cell::Expr) -> cell::Expr {
    cell::Expr::Tuple(vec![value])
}

// Parameters that are assigned in `body` get rebound to a cell holding their initial value.
fn wrap_params(params: &[String], mutated: &BTreeSet<String>, body: cell::Expr) -> cell::Expr {
    params
        .iter()
        .rev()
        .filter(|param| mutated.contains(*param))
        .fold(body, |body, param| {
            cell::Expr::Let(
                param.clone(),
                Box::new(cell_of(cell::Expr::Var(param.clone()))),
                Box::new(body),
            )
        })
}

// The cells visible inside a scope binding `params`: outer cells not shadowed by a parameter,
// plus the parameters the scope itself assigns.
fn scope_cells(
    cells: &BTreeSet<String>,
    params: &[String],
    mutated: &BTreeSet<String>,
) -> BTreeSet<String> {
    let mut inner = cells.clone();
    for param in params {
        inner.remove(param);
        if mutated.contains(param) {
            inner.insert(param.clone());
        }
    }
    inner
}

/// `cells` holds the in-scope variables that are represented as cells.
fn convert_expr(expr: kernel::Expr, cells: &BTreeSet<String>) -> cell::Expr {
    stacker::maybe_grow(32 * 1024, 1024 * 1024, || convert_expr_inner(expr, cells))
}

fn convert_expr_inner(expr: kernel::Expr, cells: &BTreeSet<String>) -> cell::Expr {
    use kernel::Expr as E;

    let convert = |expr: Box<E>| Box::new(convert_expr(*expr, cells));

    match expr {
        E::Int(val) => cell::Expr::Int(val),
        E::Bool(val) => cell::Expr::Bool(val),
        E::Unit => cell::Expr::Unit,
        E::Var(name) => {
            if cells.contains(&name) {
                cell::Expr::Get(Box::new(cell::Expr::Var(name)), 0)
            } else {
                cell::Expr::Var(name)
            }
        }

        E::Assign(name, value) => {
            cell::Expr::Set(Box::new(cell::Expr::Var(name)), 0, convert(value))
        }

        E::Let(name, value, body) => {
            let value = convert_expr(*value, cells);
            let mutated = assigned_vars(&body);
            let params = std::slice::from_ref(&name);
            let inner = scope_cells(cells, params, &mutated);
            let body = convert_expr(*body, &inner);
            let value = if mutated.contains(&name) {
                cell_of(value)
            } else {
                value
            };
            cell::Expr::Let(name, Box::new(value), Box::new(body))
        }

        E::Lambda(params, body) => {
            let mutated = assigned_vars(&body);
            let inner = scope_cells(cells, &params, &mutated);
            let body = wrap_params(&params, &mutated, convert_expr(*body, &inner));
            cell::Expr::Lambda(params, Box::new(body))
        }

        E::Prim(op, lhs, rhs) => cell::Expr::Prim(op, convert(lhs), convert(rhs)),
        E::If(cond, then_, else_) => cell::Expr::If(convert(cond), convert(then_), convert(else_)),
        E::While(cond, body) => cell::Expr::While(convert(cond), convert(body)),
        E::Do(effect, value) => cell::Expr::Do(convert(effect), convert(value)),
        E::Tuple(items) => cell::Expr::Tuple(
            items
                .into_iter()
                .map(|item| convert_expr(item, cells))
                .collect(),
        ),
        E::Get(tuple, idx) => cell::Expr::Get(convert(tuple), idx),
        E::Set(tuple, idx, value) => cell::Expr::Set(convert(tuple), idx, convert(value)),
        E::Apply(func, args) => cell::Expr::Apply(
            convert(func),
            args.into_iter()
                .map(|arg| convert_expr(arg, cells))
                .collect(),
        ),
    }
}

pub fn convert_assignments(
    program: kernel::Program,
    progress: impl ProgressLogger,
) -> cell::Program {
    let progress = progress.start_session(None);

    let mutated = assigned_vars(&program.body);
    let cells = scope_cells(&BTreeSet::new(), &program.params, &mutated);
    let body = wrap_params(
        &program.params,
        &mutated,
        convert_expr(program.body, &cells),
    );

    progress.finish();

    cell::Program {
        params: program.params,
        body,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use sucrose_common::data::prim::PrimOp;
    use sucrose_common::util::progress_logger::Hidden;

    fn kvar(name: &str) -> kernel::Expr {
        kernel::Expr::Var(name.to_owned())
    }

    fn cvar(name: &str) -> cell::Expr {
        cell::Expr::Var(name.to_owned())
    }

    fn assign(name: &str, value: kernel::Expr) -> kernel::Expr {
        kernel::Expr::Assign(name.to_owned(), Box::new(value))
    }

    fn read_cell(name: &str) -> cell::Expr {
        cell::Expr::Get(Box::new(cvar(name)), 0)
    }

    #[test]
    fn test_assigned_vars_respects_shadowing() {
        // (let (x 1) (set! x 2)) (set! y 3)
        let expr = kernel::Expr::Do(
            Box::new(kernel::Expr::Let(
                "x".to_owned(),
                Box::new(kernel::Expr::Int(1)),
                Box::new(assign("x", kernel::Expr::Int(2))),
            )),
            Box::new(kernel::Expr::Lambda(
                vec!["z".to_owned()],
                Box::new(kernel::Expr::Do(
                    Box::new(assign("y", kernel::Expr::Int(3))),
                    Box::new(assign("z", kernel::Expr::Int(4))),
                )),
            )),
        );
        assert_eq!(
            assigned_vars(&expr),
            BTreeSet::from(["y".to_owned()])
        );
    }

    #[test]
    fn test_mutated_param_gets_prologue() {
        let program = kernel::Program {
            params: vec!["x".to_owned(), "y".to_owned()],
            body: kernel::Expr::Do(
                Box::new(assign(
                    "x",
                    kernel::Expr::Prim(PrimOp::Add, Box::new(kvar("x")), Box::new(kvar("y"))),
                )),
                Box::new(kvar("x")),
            ),
        };

        let converted = convert_assignments(program, Hidden);
        assert_eq!(
            converted.body,
            cell::Expr::Let(
                "x".to_owned(),
                Box::new(cell::Expr::Tuple(vec![cvar("x")])),
                Box::new(cell::Expr::Do(
                    Box::new(cell::Expr::Set(
                        Box::new(cvar("x")),
                        0,
                        Box::new(cell::Expr::Prim(
                            PrimOp::Add,
                            Box::new(read_cell("x")),
                            Box::new(cvar("y")),
                        )),
                    )),
                    Box::new(read_cell("x")),
                )),
            )
        );
    }

    #[test]
    fn test_shadowing_local_is_not_a_cell() {
        // (let (x 0) (begin (set! x 1) ((lambda (x) x) x)))
        let program = kernel::Program {
            params: vec![],
            body: kernel::Expr::Let(
                "x".to_owned(),
                Box::new(kernel::Expr::Int(0)),
                Box::new(kernel::Expr::Do(
                    Box::new(assign("x", kernel::Expr::Int(1))),
                    Box::new(kernel::Expr::Apply(
                        Box::new(kernel::Expr::Lambda(
                            vec!["x".to_owned()],
                            Box::new(kvar("x")),
                        )),
                        vec![kvar("x")],
                    )),
                )),
            ),
        };

        let converted = convert_assignments(program, Hidden);
        assert_eq!(
            converted.body,
            cell::Expr::Let(
                "x".to_owned(),
                Box::new(cell::Expr::Tuple(vec![cell::Expr::Int(0)])),
                Box::new(cell::Expr::Do(
                    Box::new(cell::Expr::Set(
                        Box::new(cvar("x")),
                        0,
                        Box::new(cell::Expr::Int(1)),
                    )),
                    Box::new(cell::Expr::Apply(
                        Box::new(cell::Expr::Lambda(
                            vec!["x".to_owned()],
                            Box::new(cvar("x")),
                        )),
                        vec![read_cell("x")],
                    )),
                )),
            )
        );
    }

    #[test]
    fn test_captured_cell_is_read_inside_lambda() {
        // (let (n 0) (lambda () (set! n (+ n 1))))
        let program = kernel::Program {
            params: vec![],
            body: kernel::Expr::Let(
                "n".to_owned(),
                Box::new(kernel::Expr::Int(0)),
                Box::new(kernel::Expr::Lambda(
                    vec![],
                    Box::new(assign(
                        "n",
                        kernel::Expr::Prim(
                            PrimOp::Add,
                            Box::new(kvar("n")),
                            Box::new(kernel::Expr::Int(1)),
                        ),
                    )),
                )),
            ),
        };

        let converted = convert_assignments(program, Hidden);
        assert_eq!(
            converted.body,
            cell::Expr::Let(
                "n".to_owned(),
                Box::new(cell::Expr::Tuple(vec![cell::Expr::Int(0)])),
                Box::new(cell::Expr::Lambda(
                    vec![],
                    Box::new(cell::Expr::Set(
                        Box::new(cvar("n")),
                        0,
                        Box::new(cell::Expr::Prim(
                            PrimOp::Add,
                            Box::new(read_cell("n")),
                            Box::new(cell::Expr::Int(1)),
                        )),
                    )),
                )),
            )
        );
    }
}
