use thiserror::Error;

use sucrose_common::data::kernel_ast as kernel;
use sucrose_common::data::prim::PrimOp;
use sucrose_common::data::sugar_ast::{self as sugar, ArithOp, Comparison, Pattern};
use sucrose_common::util::fresh::FreshNames;
use sucrose_common::util::progress_logger::{ProgressLogger, ProgressSession};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    #[error(
        "This `match` might not cover every value of its scrutinee. The last arm of a `match` \
        must be a wildcard, a variable, or a tuple of those."
    )]
    NonExhaustiveMatch,
}

fn prim(op: PrimOp, lhs: kernel::Expr, rhs: kernel::Expr) -> kernel::Expr {
    kernel::Expr::Prim(op, Box::new(lhs), Box::new(rhs))
}

fn if_(cond: kernel::Expr, then_: kernel::Expr, else_: kernel::Expr) -> kernel::Expr {
    kernel::Expr::If(Box::new(cond), Box::new(then_), Box::new(else_))
}

fn let_(name: String, value: kernel::Expr, body: kernel::Expr) -> kernel::Expr {
    kernel::Expr::Let(name, Box::new(value), Box::new(body))
}

fn get(tuple: kernel::Expr, idx: usize) -> kernel::Expr {
    kernel::Expr::Get(Box::new(tuple), idx)
}

fn is_atomic(expr: &kernel::Expr) -> bool {
    matches!(
        expr,
        kernel::Expr::Int(_) | kernel::Expr::Bool(_) | kernel::Expr::Unit | kernel::Expr::Var(_)
    )
}

fn is_literal(expr: &kernel::Expr) -> bool {
    matches!(
        expr,
        kernel::Expr::Int(_) | kernel::Expr::Bool(_) | kernel::Expr::Unit
    )
}

// Right fold with no trailing identity, so a binary node desugars to itself.
fn fold_right(
    mut operands: Vec<kernel::Expr>,
    empty: kernel::Expr,
    combine: impl Fn(kernel::Expr, kernel::Expr) -> kernel::Expr,
) -> kernel::Expr {
    let Some(mut acc) = operands.pop() else {
        return empty;
    };
    while let Some(operand) = operands.pop() {
        acc = combine(operand, acc);
    }
    acc
}

fn desugar_arith(op: ArithOp, operands: Vec<kernel::Expr>) -> kernel::Expr {
    match op {
        ArithOp::Add => fold_right(operands, kernel::Expr::Int(0), |lhs, rhs| {
            prim(PrimOp::Add, lhs, rhs)
        }),
        ArithOp::Multiply => fold_right(operands, kernel::Expr::Int(1), |lhs, rhs| {
            prim(PrimOp::Multiply, lhs, rhs)
        }),
        ArithOp::Subtract | ArithOp::Div => {
            let prim_op = if op == ArithOp::Subtract {
                PrimOp::Subtract
            } else {
                PrimOp::Div
            };
            let identity = if op == ArithOp::Subtract { 0 } else { 1 };
            match <[kernel::Expr; 1]>::try_from(operands) {
                // Negation and reciprocal
                Ok([operand]) => prim(prim_op, kernel::Expr::Int(identity), operand),
                Err(operands) => fold_right(operands, kernel::Expr::Int(identity), |lhs, rhs| {
                    prim(prim_op, lhs, rhs)
                }),
            }
        }
    }
}

// Only `<`, `=` and `>=` exist in the kernel. The other two swap their operands, which is only
// safe to do directly when the swap can't be observed.
fn compare_pair(
    cmp: Comparison,
    lhs: kernel::Expr,
    rhs: kernel::Expr,
    fresh: &mut FreshNames,
) -> kernel::Expr {
    let (op, swapped) = match cmp {
        Comparison::Less => (PrimOp::LessThan, false),
        Comparison::Equal => (PrimOp::EqualTo, false),
        Comparison::GreaterEqual => (PrimOp::GreaterThanOrEqualTo, false),
        Comparison::LessEqual => (PrimOp::GreaterThanOrEqualTo, true),
        Comparison::Greater => (PrimOp::LessThan, true),
    };

    if !swapped {
        prim(op, lhs, rhs)
    } else if is_literal(&lhs) || (is_atomic(&lhs) && is_atomic(&rhs)) {
        prim(op, rhs, lhs)
    } else {
        let lhs_name = fresh.fresh("cmp.");
        let lhs_var = kernel::Expr::Var(lhs_name.clone());
        let_(lhs_name, lhs, prim(op, rhs, lhs_var))
    }
}

fn desugar_compare(
    cmp: Comparison,
    operands: Vec<kernel::Expr>,
    fresh: &mut FreshNames,
) -> kernel::Expr {
    if operands.len() < 2 {
        // A lone operand is still evaluated when it has effects.
        return operands
            .into_iter()
            .filter(|operand| !is_atomic(operand))
            .fold(kernel::Expr::Bool(true), |acc, operand| {
                kernel::Expr::Do(Box::new(operand), Box::new(acc))
            });
    }

    let mut operands = match <[kernel::Expr; 2]>::try_from(operands) {
        Ok([lhs, rhs]) => return compare_pair(cmp, lhs, rhs, fresh),
        Err(operands) => operands,
    };

    // Longer chains evaluate every operand exactly once, left to right, before comparing.
    let mut bindings = Vec::new();
    if !operands.iter().all(is_atomic) {
        for operand in &mut operands {
            if !is_literal(operand) {
                let name = fresh.fresh("cmp.");
                let value = std::mem::replace(operand, kernel::Expr::Var(name.clone()));
                bindings.push((name, value));
            }
        }
    }

    let tests = operands
        .windows(2)
        .map(|pair| compare_pair(cmp, pair[0].clone(), pair[1].clone(), fresh))
        .collect::<Vec<_>>();
    let chain = fold_right(tests, kernel::Expr::Bool(true), |test, rest| {
        if_(test, rest, kernel::Expr::Bool(false))
    });

    bindings
        .into_iter()
        .rev()
        .fold(chain, |body, (name, value)| let_(name, value, body))
}

// A test that holds when `pattern` matches `scrutinee`, or `None` when it always does.
fn pattern_test(pattern: &Pattern, scrutinee: &kernel::Expr) -> Option<kernel::Expr> {
    match pattern {
        Pattern::Any | Pattern::Var(_) => None,
        Pattern::Int(val) => Some(prim(
            PrimOp::EqualTo,
            scrutinee.clone(),
            kernel::Expr::Int(*val),
        )),
        Pattern::Bool(val) => Some(prim(
            PrimOp::EqualTo,
            scrutinee.clone(),
            kernel::Expr::Bool(*val),
        )),
        Pattern::Tuple(items) => {
            let tests = items
                .iter()
                .enumerate()
                .filter_map(|(idx, item)| pattern_test(item, &get(scrutinee.clone(), idx)))
                .collect::<Vec<_>>();
            if tests.is_empty() {
                None
            } else {
                Some(fold_right(tests, kernel::Expr::Bool(true), |test, rest| {
                    if_(test, rest, kernel::Expr::Bool(false))
                }))
            }
        }
    }
}

fn bind_pattern(pattern: &Pattern, scrutinee: kernel::Expr, body: kernel::Expr) -> kernel::Expr {
    match pattern {
        Pattern::Any | Pattern::Int(_) | Pattern::Bool(_) => body,
        Pattern::Var(name) => let_(name.clone(), scrutinee, body),
        Pattern::Tuple(items) => items
            .iter()
            .enumerate()
            .rev()
            .fold(body, |body, (idx, item)| {
                bind_pattern(item, get(scrutinee.clone(), idx), body)
            }),
    }
}

struct Context<'a> {
    fresh: &'a mut FreshNames,
}

impl<'a> Context<'a> {
    fn desugar_all(&mut self, exprs: Vec<sugar::Expr>) -> Result<Vec<kernel::Expr>, Error> {
        exprs.into_iter().map(|expr| self.desugar_expr(expr)).collect()
    }

    fn desugar_boxed(&mut self, expr: Box<sugar::Expr>) -> Result<Box<kernel::Expr>, Error> {
        Ok(Box::new(self.desugar_expr(*expr)?))
    }

    // The name is bound once and assigned its value, so the recursive references and the body
    // share a single variable. Assignment conversion turns it into one cell.
    fn desugar_letrec(
        &mut self,
        name: String,
        value: sugar::Expr,
        body: sugar::Expr,
    ) -> Result<kernel::Expr, Error> {
        let value = self.desugar_expr(value)?;
        let body = self.desugar_expr(body)?;

        let init = kernel::Expr::Assign(name.clone(), Box::new(value));
        Ok(let_(
            name,
            kernel::Expr::Unit,
            kernel::Expr::Do(Box::new(init), Box::new(body)),
        ))
    }

    fn desugar_match(
        &mut self,
        scrutinee: sugar::Expr,
        arms: Vec<(Pattern, sugar::Expr)>,
    ) -> Result<kernel::Expr, Error> {
        match arms.last() {
            Some((pattern, _)) if pattern.is_irrefutable() => {}
            _ => return Err(Error::NonExhaustiveMatch),
        }

        let name = self.fresh.fresh("match.");
        let var = kernel::Expr::Var(name.clone());
        let scrutinee = self.desugar_expr(scrutinee)?;

        let mut result = None;
        for (pattern, body) in arms.into_iter().rev() {
            let body = bind_pattern(&pattern, var.clone(), self.desugar_expr(body)?);
            result = Some(match (pattern_test(&pattern, &var), result) {
                (Some(test), Some(rest)) => if_(test, body, rest),
                // An irrefutable arm shadows everything after it.
                (_, _) => body,
            });
        }

        // The last arm was checked above, so `result` is populated.
        Ok(let_(name, scrutinee, result.unwrap_or(kernel::Expr::Unit)))
    }

    fn desugar_expr(&mut self, expr: sugar::Expr) -> Result<kernel::Expr, Error> {
        stacker::maybe_grow(32 * 1024, 1024 * 1024, || self.desugar_expr_inner(expr))
    }

    fn desugar_expr_inner(&mut self, expr: sugar::Expr) -> Result<kernel::Expr, Error> {
        use sugar::Expr as S;

        Ok(match expr {
            S::Int(val) => kernel::Expr::Int(val),
            S::Bool(val) => kernel::Expr::Bool(val),
            S::Unit => kernel::Expr::Unit,
            S::Var(name) => kernel::Expr::Var(name),

            S::Arith(op, operands) => desugar_arith(op, self.desugar_all(operands)?),
            S::Compare(cmp, operands) => {
                let operands = self.desugar_all(operands)?;
                desugar_compare(cmp, operands, self.fresh)
            }
            S::Not(operand) => if_(
                prim(PrimOp::EqualTo, self.desugar_expr(*operand)?, kernel::Expr::Bool(true)),
                kernel::Expr::Bool(false),
                kernel::Expr::Bool(true),
            ),
            S::And(operands) => fold_right(
                self.desugar_all(operands)?,
                kernel::Expr::Bool(true),
                |lhs, rest| if_(lhs, rest, kernel::Expr::Bool(false)),
            ),
            S::Or(operands) => fold_right(
                self.desugar_all(operands)?,
                kernel::Expr::Bool(false),
                |lhs, rest| if_(lhs, kernel::Expr::Bool(true), rest),
            ),

            S::Let(name, value, body) => kernel::Expr::Let(
                name,
                self.desugar_boxed(value)?,
                self.desugar_boxed(body)?,
            ),
            S::LetStar(bindings, body) => {
                let bindings = bindings
                    .into_iter()
                    .map(|(name, value)| Ok((name, self.desugar_expr(value)?)))
                    .collect::<Result<Vec<_>, Error>>()?;
                let body = self.desugar_expr(*body)?;
                bindings
                    .into_iter()
                    .rev()
                    .fold(body, |body, (name, value)| let_(name, value, body))
            }
            S::LetRec(name, value, body) => self.desugar_letrec(name, *value, *body)?,

            S::If(cond, then_, else_) => kernel::Expr::If(
                self.desugar_boxed(cond)?,
                self.desugar_boxed(then_)?,
                self.desugar_boxed(else_)?,
            ),
            S::Cond(clauses, default) => {
                let clauses = clauses
                    .into_iter()
                    .map(|(test, body)| Ok((self.desugar_expr(test)?, self.desugar_expr(body)?)))
                    .collect::<Result<Vec<_>, Error>>()?;
                let default = self.desugar_expr(*default)?;
                clauses
                    .into_iter()
                    .rev()
                    .fold(default, |rest, (test, body)| if_(test, body, rest))
            }
            S::Match(scrutinee, arms) => self.desugar_match(*scrutinee, arms)?,

            S::Assign(name, value) => kernel::Expr::Assign(name, self.desugar_boxed(value)?),
            S::While(cond, body) => {
                kernel::Expr::While(self.desugar_boxed(cond)?, self.desugar_boxed(body)?)
            }
            S::Begin(exprs) => {
                fold_right(self.desugar_all(exprs)?, kernel::Expr::Unit, |effect, rest| {
                    kernel::Expr::Do(Box::new(effect), Box::new(rest))
                })
            }

            S::Tuple(items) => kernel::Expr::Tuple(self.desugar_all(items)?),
            S::Get(tuple, idx) => kernel::Expr::Get(self.desugar_boxed(tuple)?, idx),
            S::Set(tuple, idx, value) => kernel::Expr::Set(
                self.desugar_boxed(tuple)?,
                idx,
                self.desugar_boxed(value)?,
            ),

            S::Lambda(params, body) => kernel::Expr::Lambda(params, self.desugar_boxed(body)?),
            S::Apply(func, args) => {
                kernel::Expr::Apply(self.desugar_boxed(func)?, self.desugar_all(args)?)
            }
        })
    }
}

pub fn desugar(
    program: sugar::Program,
    fresh: &mut FreshNames,
    progress: impl ProgressLogger,
) -> Result<kernel::Program, Error> {
    let progress = progress.start_session(None);

    // Defines scope over everything after them, recursively when they define a function.
    let body = program
        .defines
        .into_iter()
        .rev()
        .fold(program.body, |body, define| match define.value {
            sugar::Expr::Lambda(..) => sugar::Expr::LetRec(
                define.name,
                Box::new(define.value),
                Box::new(body),
            ),
            value => sugar::Expr::Let(define.name, Box::new(value), Box::new(body)),
        });

    let body = Context { fresh }.desugar_expr(body)?;

    progress.finish();

    Ok(kernel::Program {
        params: program.params,
        body,
    })
}

/// Embeds a kernel program back into the surface dialect, one construct for one construct.
pub fn kernel_as_sugar(program: &kernel::Program) -> sugar::Program {
    fn embed(expr: &kernel::Expr) -> sugar::Expr {
        use kernel::Expr as K;
        use sugar::Expr as S;

        let boxed = |expr: &kernel::Expr| Box::new(embed(expr));
        match expr {
            K::Int(val) => S::Int(*val),
            K::Bool(val) => S::Bool(*val),
            K::Unit => S::Unit,
            K::Var(name) => S::Var(name.clone()),
            K::Prim(op, lhs, rhs) => {
                let operands = vec![embed(lhs), embed(rhs)];
                match op {
                    PrimOp::Add => S::Arith(ArithOp::Add, operands),
                    PrimOp::Subtract => S::Arith(ArithOp::Subtract, operands),
                    PrimOp::Multiply => S::Arith(ArithOp::Multiply, operands),
                    PrimOp::Div => S::Arith(ArithOp::Div, operands),
                    PrimOp::LessThan => S::Compare(Comparison::Less, operands),
                    PrimOp::EqualTo => S::Compare(Comparison::Equal, operands),
                    PrimOp::GreaterThanOrEqualTo => {
                        S::Compare(Comparison::GreaterEqual, operands)
                    }
                }
            }
            K::Let(name, value, body) => S::Let(name.clone(), boxed(value), boxed(body)),
            K::If(cond, then_, else_) => S::If(boxed(cond), boxed(then_), boxed(else_)),
            K::Assign(name, value) => S::Assign(name.clone(), boxed(value)),
            K::While(cond, body) => S::While(boxed(cond), boxed(body)),
            K::Do(effect, value) => S::Begin(vec![embed(effect), embed(value)]),
            K::Tuple(items) => S::Tuple(items.iter().map(embed).collect()),
            K::Get(tuple, idx) => S::Get(boxed(tuple), *idx),
            K::Set(tuple, idx, value) => S::Set(boxed(tuple), *idx, boxed(value)),
            K::Lambda(params, body) => S::Lambda(params.clone(), boxed(body)),
            K::Apply(func, args) => S::Apply(boxed(func), args.iter().map(embed).collect()),
        }
    }

    sugar::Program {
        params: program.params.clone(),
        defines: Vec::new(),
        body: embed(&program.body),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use sucrose_common::util::progress_logger::Hidden;

    fn var(name: &str) -> kernel::Expr {
        kernel::Expr::Var(name.to_owned())
    }

    fn svar(name: &str) -> sugar::Expr {
        sugar::Expr::Var(name.to_owned())
    }

    fn desugar_body(body: sugar::Expr) -> Result<kernel::Expr, Error> {
        let program = sugar::Program {
            params: vec!["a".to_owned(), "b".to_owned(), "c".to_owned()],
            defines: Vec::new(),
            body,
        };
        Ok(desugar(program, &mut FreshNames::new(), Hidden)?.body)
    }

    #[test]
    fn test_variadic_arith() {
        assert_eq!(
            desugar_body(sugar::Expr::Arith(ArithOp::Add, vec![])),
            Ok(kernel::Expr::Int(0))
        );
        assert_eq!(
            desugar_body(sugar::Expr::Arith(ArithOp::Multiply, vec![svar("a")])),
            Ok(var("a"))
        );
        assert_eq!(
            desugar_body(sugar::Expr::Arith(
                ArithOp::Add,
                vec![svar("a"), svar("b"), svar("c")]
            )),
            Ok(prim(
                PrimOp::Add,
                var("a"),
                prim(PrimOp::Add, var("b"), var("c"))
            ))
        );
        assert_eq!(
            desugar_body(sugar::Expr::Arith(ArithOp::Subtract, vec![svar("a")])),
            Ok(prim(PrimOp::Subtract, kernel::Expr::Int(0), var("a")))
        );
        assert_eq!(
            desugar_body(sugar::Expr::Arith(
                ArithOp::Subtract,
                vec![svar("a"), svar("b"), svar("c")]
            )),
            Ok(prim(
                PrimOp::Subtract,
                var("a"),
                prim(PrimOp::Subtract, var("b"), var("c"))
            ))
        );
    }

    #[test]
    fn test_not_and_or() {
        assert_eq!(
            desugar_body(sugar::Expr::Not(Box::new(svar("a")))),
            Ok(if_(
                prim(PrimOp::EqualTo, var("a"), kernel::Expr::Bool(true)),
                kernel::Expr::Bool(false),
                kernel::Expr::Bool(true),
            ))
        );
        assert_eq!(
            desugar_body(sugar::Expr::And(vec![])),
            Ok(kernel::Expr::Bool(true))
        );
        assert_eq!(
            desugar_body(sugar::Expr::Or(vec![])),
            Ok(kernel::Expr::Bool(false))
        );
        assert_eq!(
            desugar_body(sugar::Expr::And(vec![svar("a"), svar("b")])),
            Ok(if_(var("a"), var("b"), kernel::Expr::Bool(false)))
        );
        assert_eq!(
            desugar_body(sugar::Expr::Or(vec![svar("a"), svar("b")])),
            Ok(if_(var("a"), kernel::Expr::Bool(true), var("b")))
        );
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(
            desugar_body(sugar::Expr::Compare(Comparison::LessEqual, vec![svar("a"), svar("b")])),
            Ok(prim(PrimOp::GreaterThanOrEqualTo, var("b"), var("a")))
        );
        assert_eq!(
            desugar_body(sugar::Expr::Compare(Comparison::Greater, vec![svar("a"), svar("b")])),
            Ok(prim(PrimOp::LessThan, var("b"), var("a")))
        );
        assert_eq!(
            desugar_body(sugar::Expr::Compare(Comparison::Less, vec![svar("a")])),
            Ok(kernel::Expr::Bool(true))
        );
        assert_eq!(
            desugar_body(sugar::Expr::Compare(Comparison::Equal, vec![])),
            Ok(kernel::Expr::Bool(true))
        );
        assert_eq!(
            desugar_body(sugar::Expr::Compare(
                Comparison::Less,
                vec![svar("a"), svar("b"), svar("c")]
            )),
            Ok(if_(
                prim(PrimOp::LessThan, var("a"), var("b")),
                prim(PrimOp::LessThan, var("b"), var("c")),
                kernel::Expr::Bool(false),
            ))
        );
    }

    #[test]
    fn test_swapped_comparison_keeps_evaluation_order() {
        let effect = sugar::Expr::Begin(vec![
            sugar::Expr::Assign("b".to_owned(), Box::new(sugar::Expr::Int(1))),
            svar("a"),
        ]);
        assert_eq!(
            desugar_body(sugar::Expr::Compare(Comparison::Greater, vec![effect, svar("b")])),
            Ok(let_(
                "cmp.0".to_owned(),
                kernel::Expr::Do(
                    Box::new(kernel::Expr::Assign(
                        "b".to_owned(),
                        Box::new(kernel::Expr::Int(1))
                    )),
                    Box::new(var("a")),
                ),
                prim(PrimOp::LessThan, var("b"), var("cmp.0")),
            ))
        );
    }

    #[test]
    fn test_let_star_and_cond() {
        assert_eq!(
            desugar_body(sugar::Expr::LetStar(
                vec![
                    ("x".to_owned(), sugar::Expr::Int(1)),
                    ("y".to_owned(), svar("x")),
                ],
                Box::new(svar("y")),
            )),
            Ok(let_(
                "x".to_owned(),
                kernel::Expr::Int(1),
                let_("y".to_owned(), var("x"), var("y"))
            ))
        );
        assert_eq!(
            desugar_body(sugar::Expr::Cond(
                vec![(svar("a"), sugar::Expr::Int(1)), (svar("b"), sugar::Expr::Int(2))],
                Box::new(sugar::Expr::Int(3)),
            )),
            Ok(if_(
                var("a"),
                kernel::Expr::Int(1),
                if_(var("b"), kernel::Expr::Int(2), kernel::Expr::Int(3))
            ))
        );
    }

    #[test]
    fn test_letrec() {
        // (letrec (f (lambda (n) (f n))) (f 1))
        let value = sugar::Expr::Lambda(
            vec!["n".to_owned()],
            Box::new(sugar::Expr::Apply(Box::new(svar("f")), vec![svar("n")])),
        );
        let body = sugar::Expr::Apply(Box::new(svar("f")), vec![sugar::Expr::Int(1)]);

        assert_eq!(
            desugar_body(sugar::Expr::LetRec(
                "f".to_owned(),
                Box::new(value),
                Box::new(body)
            )),
            Ok(let_(
                "f".to_owned(),
                kernel::Expr::Unit,
                kernel::Expr::Do(
                    Box::new(kernel::Expr::Assign(
                        "f".to_owned(),
                        Box::new(kernel::Expr::Lambda(
                            vec!["n".to_owned()],
                            Box::new(kernel::Expr::Apply(Box::new(var("f")), vec![var("n")])),
                        )),
                    )),
                    Box::new(kernel::Expr::Apply(
                        Box::new(var("f")),
                        vec![kernel::Expr::Int(1)]
                    )),
                ),
            ))
        );
    }

    #[test]
    fn test_match() {
        // (match a (0 b) ((tuple x _) x))
        let expr = sugar::Expr::Match(
            Box::new(svar("a")),
            vec![
                (Pattern::Int(0), svar("b")),
                (
                    Pattern::Tuple(vec![Pattern::Var("x".to_owned()), Pattern::Any]),
                    svar("x"),
                ),
            ],
        );
        assert_eq!(
            desugar_body(expr),
            Ok(let_(
                "match.0".to_owned(),
                var("a"),
                if_(
                    prim(PrimOp::EqualTo, var("match.0"), kernel::Expr::Int(0)),
                    var("b"),
                    let_("x".to_owned(), get(var("match.0"), 0), var("x")),
                ),
            ))
        );

        let refutable = sugar::Expr::Match(
            Box::new(svar("a")),
            vec![(Pattern::Int(0), svar("b"))],
        );
        assert_eq!(desugar_body(refutable), Err(Error::NonExhaustiveMatch));
    }

    #[test]
    fn test_defines() {
        let program = sugar::Program {
            params: vec![],
            defines: vec![
                sugar::Define {
                    name: "k".to_owned(),
                    value: sugar::Expr::Int(2),
                },
            ],
            body: svar("k"),
        };
        let kernel = desugar(program, &mut FreshNames::new(), Hidden).unwrap();
        assert_eq!(
            kernel.body,
            let_("k".to_owned(), kernel::Expr::Int(2), var("k"))
        );
    }

    #[test]
    fn test_idempotent_on_kernel() {
        let kernel = kernel::Program {
            params: vec!["x".to_owned()],
            body: let_(
                "y".to_owned(),
                prim(PrimOp::Subtract, var("x"), kernel::Expr::Int(1)),
                kernel::Expr::Do(
                    Box::new(kernel::Expr::While(
                        Box::new(prim(PrimOp::GreaterThanOrEqualTo, var("y"), kernel::Expr::Int(0))),
                        Box::new(kernel::Expr::Assign(
                            "y".to_owned(),
                            Box::new(prim(PrimOp::Subtract, var("y"), kernel::Expr::Int(1))),
                        )),
                    )),
                    Box::new(kernel::Expr::Apply(
                        Box::new(kernel::Expr::Lambda(
                            vec!["z".to_owned()],
                            Box::new(kernel::Expr::Get(
                                Box::new(kernel::Expr::Tuple(vec![var("z"), kernel::Expr::Unit])),
                                0,
                            )),
                        )),
                        vec![var("y")],
                    )),
                ),
            ),
        };
        let again = desugar(kernel_as_sugar(&kernel), &mut FreshNames::new(), Hidden).unwrap();
        assert_eq!(again, kernel);
    }
}
