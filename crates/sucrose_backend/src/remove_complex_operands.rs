use sucrose_common::data::cell_ast as cell;
use sucrose_common::data::monadic_ast::{Atom, Expr, Program};
use sucrose_common::util::fresh::FreshNames;
use sucrose_common::util::progress_logger::{ProgressLogger, ProgressSession};

/// Bindings that must be in scope, in order, before an atom is valid.
pub type Bindings = Vec<(String, Expr)>;

/// Nests `body` inside `bindings`, so that the first binding is the outermost `Let`.
pub fn wrap(bindings: Bindings, body: Expr) -> Expr {
    bindings
        .into_iter()
        .rev()
        .fold(body, |body, (name, value)| {
            Expr::Let(name, Box::new(value), Box::new(body))
        })
}

pub fn to_atom(expr: cell::Expr, fresh: &mut FreshNames) -> (Atom, Bindings) {
    stacker::maybe_grow(32 * 1024, 1024 * 1024, || to_atom_inner(expr, fresh))
}

fn to_atom_inner(expr: cell::Expr, fresh: &mut FreshNames) -> (Atom, Bindings) {
    match expr {
        cell::Expr::Int(val) => (Atom::Int(val), Vec::new()),
        cell::Expr::Bool(val) => (Atom::Bool(val), Vec::new()),
        cell::Expr::Unit => (Atom::Unit, Vec::new()),
        cell::Expr::Var(name) => (Atom::Var(name), Vec::new()),

        // Names are unique by now, so the binding can be moved out to wherever the atom is
        // needed without capturing anything.
        cell::Expr::Let(name, value, body) => {
            let mut bindings = vec![(name, to_expr(*value, fresh))];
            let (atom, body_bindings) = to_atom(*body, fresh);
            bindings.extend(body_bindings);
            (atom, bindings)
        }

        complex => {
            let tmp = fresh.fresh("tmp.");
            let value = to_expr(complex, fresh);
            (Atom::Var(tmp.clone()), vec![(tmp, value)])
        }
    }
}

fn to_atoms(exprs: Vec<cell::Expr>, fresh: &mut FreshNames) -> (Vec<Atom>, Bindings) {
    let mut bindings = Vec::new();
    let atoms = exprs
        .into_iter()
        .map(|expr| {
            let (atom, expr_bindings) = to_atom(expr, fresh);
            bindings.extend(expr_bindings);
            atom
        })
        .collect();
    (atoms, bindings)
}

pub fn to_expr(expr: cell::Expr, fresh: &mut FreshNames) -> Expr {
    stacker::maybe_grow(32 * 1024, 1024 * 1024, || to_expr_inner(expr, fresh))
}

fn to_expr_inner(expr: cell::Expr, fresh: &mut FreshNames) -> Expr {
    use cell::Expr as E;

    match expr {
        E::Int(_) | E::Bool(_) | E::Unit | E::Var(_) => {
            let (atom, bindings) = to_atom(expr, fresh);
            debug_assert!(bindings.is_empty());
            Expr::Atom(atom)
        }

        E::Prim(op, lhs, rhs) => {
            let (lhs, mut bindings) = to_atom(*lhs, fresh);
            let (rhs, rhs_bindings) = to_atom(*rhs, fresh);
            bindings.extend(rhs_bindings);
            wrap(bindings, Expr::Prim(op, lhs, rhs))
        }

        E::Let(name, value, body) => Expr::Let(
            name,
            Box::new(to_expr(*value, fresh)),
            Box::new(to_expr(*body, fresh)),
        ),

        E::If(cond, then_, else_) => {
            let (cond, bindings) = to_atom(*cond, fresh);
            let then_ = to_expr(*then_, fresh);
            let else_ = to_expr(*else_, fresh);
            wrap(bindings, Expr::If(cond, Box::new(then_), Box::new(else_)))
        }

        E::While(cond, body) => Expr::While(
            Box::new(to_expr(*cond, fresh)),
            Box::new(to_expr(*body, fresh)),
        ),

        E::Do(effect, value) => Expr::Do(
            Box::new(to_expr(*effect, fresh)),
            Box::new(to_expr(*value, fresh)),
        ),

        E::Tuple(items) => {
            let (items, bindings) = to_atoms(items, fresh);
            wrap(bindings, Expr::Tuple(items))
        }

        E::Get(tuple, idx) => {
            let (tuple, bindings) = to_atom(*tuple, fresh);
            wrap(bindings, Expr::Get(tuple, idx))
        }

        E::Set(tuple, idx, value) => {
            let (tuple, mut bindings) = to_atom(*tuple, fresh);
            let (value, value_bindings) = to_atom(*value, fresh);
            bindings.extend(value_bindings);
            wrap(bindings, Expr::Set(tuple, idx, value))
        }

        E::Lambda(params, body) => Expr::Lambda(params, Box::new(to_expr(*body, fresh))),

        E::Apply(func, args) => {
            let (func, mut bindings) = to_atom(*func, fresh);
            let (args, arg_bindings) = to_atoms(args, fresh);
            bindings.extend(arg_bindings);
            wrap(bindings, Expr::Apply(func, args))
        }
    }
}

pub fn remove_complex_operands(
    program: cell::Program,
    fresh: &mut FreshNames,
    progress: impl ProgressLogger,
) -> Program {
    let progress = progress.start_session(None);
    let body = to_expr(program.body, fresh);
    progress.finish();

    Program {
        params: program.params,
        body,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use sucrose_common::data::prim::PrimOp;
    use sucrose_common::util::progress_logger::Hidden;

    fn cvar(name: &str) -> cell::Expr {
        cell::Expr::Var(name.to_owned())
    }

    fn var(name: &str) -> Atom {
        Atom::Var(name.to_owned())
    }

    fn rco(body: cell::Expr) -> Expr {
        let program = cell::Program {
            params: vec!["x".to_owned()],
            body,
        };
        remove_complex_operands(program, &mut FreshNames::new(), Hidden).body
    }

    #[test]
    fn test_operands_are_bound_left_to_right() {
        // (+ (* x 2) (- x 1))
        let body = cell::Expr::Prim(
            PrimOp::Add,
            Box::new(cell::Expr::Prim(
                PrimOp::Multiply,
                Box::new(cvar("x")),
                Box::new(cell::Expr::Int(2)),
            )),
            Box::new(cell::Expr::Prim(
                PrimOp::Subtract,
                Box::new(cvar("x")),
                Box::new(cell::Expr::Int(1)),
            )),
        );
        assert_eq!(
            rco(body),
            Expr::Let(
                "tmp.0".to_owned(),
                Box::new(Expr::Prim(PrimOp::Multiply, var("x"), Atom::Int(2))),
                Box::new(Expr::Let(
                    "tmp.1".to_owned(),
                    Box::new(Expr::Prim(PrimOp::Subtract, var("x"), Atom::Int(1))),
                    Box::new(Expr::Prim(PrimOp::Add, var("tmp.0"), var("tmp.1"))),
                )),
            )
        );
    }

    #[test]
    fn test_let_in_operand_position_is_flattened() {
        // (tuple-ref (let (t (tuple x)) t) 0)
        let body = cell::Expr::Get(
            Box::new(cell::Expr::Let(
                "t".to_owned(),
                Box::new(cell::Expr::Tuple(vec![cvar("x")])),
                Box::new(cvar("t")),
            )),
            0,
        );
        assert_eq!(
            rco(body),
            Expr::Let(
                "t".to_owned(),
                Box::new(Expr::Tuple(vec![var("x")])),
                Box::new(Expr::Get(var("t"), 0)),
            )
        );
    }

    #[test]
    fn test_if_condition_is_atomized() {
        // (if (< x 0) 0 x)
        let body = cell::Expr::If(
            Box::new(cell::Expr::Prim(
                PrimOp::LessThan,
                Box::new(cvar("x")),
                Box::new(cell::Expr::Int(0)),
            )),
            Box::new(cell::Expr::Int(0)),
            Box::new(cvar("x")),
        );
        assert_eq!(
            rco(body),
            Expr::Let(
                "tmp.0".to_owned(),
                Box::new(Expr::Prim(PrimOp::LessThan, var("x"), Atom::Int(0))),
                Box::new(Expr::If(
                    var("tmp.0"),
                    Box::new(Expr::Atom(Atom::Int(0))),
                    Box::new(Expr::Atom(var("x"))),
                )),
            )
        );
    }
}
