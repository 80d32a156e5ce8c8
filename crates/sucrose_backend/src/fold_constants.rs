use thiserror::Error;

use sucrose_common::data::cell_ast::{Expr, Program};
use sucrose_common::data::prim::{Const, PrimError, PrimOp};
use sucrose_common::util::progress_logger::{ProgressLogger, ProgressSession};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    #[error("This program divides by a literal zero.")]
    DivisionByZero,
}

fn literal(expr: &Expr) -> Option<Const> {
    match expr {
        Expr::Int(val) => Some(Const::Int(*val)),
        Expr::Bool(val) => Some(Const::Bool(*val)),
        Expr::Unit => Some(Const::Unit),
        _ => None,
    }
}

fn from_literal(val: Const) -> Expr {
    match val {
        Const::Int(val) => Expr::Int(val),
        Const::Bool(val) => Expr::Bool(val),
        Const::Unit => Expr::Unit,
    }
}

// Expressions that can be dropped without losing an effect or an error.
fn is_pure(expr: &Expr) -> bool {
    expr.is_atomic() || matches!(expr, Expr::Lambda(_, _))
}

fn fold_prim(op: PrimOp, lhs: Expr, rhs: Expr) -> Result<Expr, Error> {
    use Const::Int;
    use PrimOp::*;

    let (lhs_lit, rhs_lit) = (literal(&lhs), literal(&rhs));

    if let (Some(lhs_val), Some(rhs_val)) = (lhs_lit, rhs_lit) {
        match op.eval(lhs_val, rhs_val) {
            Ok(result) => return Ok(from_literal(result)),
            Err(PrimError::DivideByZero) => return Err(Error::DivisionByZero),
            // Left for the program to fail on at run time.
            Err(PrimError::TypeMismatch { .. }) => {}
        }
    }

    Ok(match (op, lhs_lit, rhs_lit) {
        (Div, _, Some(Int(0))) => return Err(Error::DivisionByZero),

        (Add | Subtract, _, Some(Int(0))) | (Multiply | Div, _, Some(Int(1))) => lhs,
        (Add, Some(Int(0)), _) | (Multiply, Some(Int(1)), _) => rhs,

        (Multiply, _, Some(Int(0))) if is_pure(&lhs) => Expr::Int(0),
        (Multiply | Div, Some(Int(0)), _) if is_pure(&rhs) => Expr::Int(0),

        _ => Expr::Prim(op, Box::new(lhs), Box::new(rhs)),
    })
}

fn fold_boxed(expr: Box<Expr>) -> Result<Box<Expr>, Error> {
    Ok(Box::new(fold_expr(*expr)?))
}

fn fold_expr(expr: Expr) -> Result<Expr, Error> {
    stacker::maybe_grow(32 * 1024, 1024 * 1024, || fold_expr_inner(expr))
}

fn fold_expr_inner(expr: Expr) -> Result<Expr, Error> {
    Ok(match expr {
        Expr::Int(_) | Expr::Bool(_) | Expr::Unit | Expr::Var(_) => expr,

        Expr::Prim(op, lhs, rhs) => fold_prim(op, fold_expr(*lhs)?, fold_expr(*rhs)?)?,

        Expr::Let(name, value, body) => Expr::Let(name, fold_boxed(value)?, fold_boxed(body)?),

        Expr::If(cond, then_, else_) => {
            let cond = fold_expr(*cond)?;
            // Both arms are folded so that a literal division by zero is rejected wherever it
            // appears.
            let then_ = fold_expr(*then_)?;
            let else_ = fold_expr(*else_)?;
            match cond {
                Expr::Bool(true) => then_,
                Expr::Bool(false) => else_,
                cond => Expr::If(Box::new(cond), Box::new(then_), Box::new(else_)),
            }
        }

        Expr::While(cond, body) => {
            let cond = fold_expr(*cond)?;
            let body = fold_expr(*body)?;
            match cond {
                Expr::Bool(false) => Expr::Unit,
                cond => Expr::While(Box::new(cond), Box::new(body)),
            }
        }

        Expr::Do(effect, value) => Expr::Do(fold_boxed(effect)?, fold_boxed(value)?),

        Expr::Tuple(items) => Expr::Tuple(
            items
                .into_iter()
                .map(fold_expr)
                .collect::<Result<_, _>>()?,
        ),
        Expr::Get(tuple, idx) => Expr::Get(fold_boxed(tuple)?, idx),
        Expr::Set(tuple, idx, value) => Expr::Set(fold_boxed(tuple)?, idx, fold_boxed(value)?),

        Expr::Lambda(params, body) => Expr::Lambda(params, fold_boxed(body)?),
        Expr::Apply(func, args) => Expr::Apply(
            fold_boxed(func)?,
            args.into_iter()
                .map(fold_expr)
                .collect::<Result<_, _>>()?,
        ),
    })
}

pub fn fold_constants(program: Program, progress: impl ProgressLogger) -> Result<Program, Error> {
    let progress = progress.start_session(None);
    let body = fold_expr(program.body)?;
    progress.finish();

    Ok(Program {
        params: program.params,
        body,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use sucrose_common::util::progress_logger::Hidden;

    fn var(name: &str) -> Expr {
        Expr::Var(name.to_owned())
    }

    fn prim(op: PrimOp, lhs: Expr, rhs: Expr) -> Expr {
        Expr::Prim(op, Box::new(lhs), Box::new(rhs))
    }

    fn fold(body: Expr) -> Result<Expr, Error> {
        fold_constants(
            Program {
                params: vec!["x".to_owned()],
                body,
            },
            Hidden,
        )
        .map(|program| program.body)
    }

    #[test]
    fn test_literal_arithmetic() {
        assert_eq!(
            fold(prim(PrimOp::Div, Expr::Int(6), Expr::Int(2))),
            Ok(Expr::Int(3))
        );
        assert_eq!(
            fold(prim(PrimOp::Div, Expr::Int(5), Expr::Int(0))),
            Err(Error::DivisionByZero)
        );
        assert_eq!(
            fold(prim(
                PrimOp::LessThan,
                prim(PrimOp::Add, Expr::Int(1), Expr::Int(2)),
                Expr::Int(4)
            )),
            Ok(Expr::Bool(true))
        );
    }

    #[test]
    fn test_identities() {
        assert_eq!(fold(prim(PrimOp::Add, var("x"), Expr::Int(0))), Ok(var("x")));
        assert_eq!(fold(prim(PrimOp::Add, Expr::Int(0), var("x"))), Ok(var("x")));
        assert_eq!(fold(prim(PrimOp::Multiply, var("x"), Expr::Int(1))), Ok(var("x")));
        assert_eq!(fold(prim(PrimOp::Subtract, var("x"), Expr::Int(0))), Ok(var("x")));
        assert_eq!(fold(prim(PrimOp::Div, var("x"), Expr::Int(1))), Ok(var("x")));
        assert_eq!(
            fold(prim(PrimOp::Multiply, Expr::Int(0), var("x"))),
            Ok(Expr::Int(0))
        );
        assert_eq!(fold(prim(PrimOp::Div, Expr::Int(0), var("x"))), Ok(Expr::Int(0)));
        // Subtraction from zero is not an identity.
        assert_eq!(
            fold(prim(PrimOp::Subtract, Expr::Int(0), var("x"))),
            Ok(prim(PrimOp::Subtract, Expr::Int(0), var("x")))
        );
    }

    #[test]
    fn test_annihilator_keeps_effects() {
        let effect = Expr::Apply(Box::new(var("x")), vec![]);
        assert_eq!(
            fold(prim(PrimOp::Multiply, effect.clone(), Expr::Int(0))),
            Ok(prim(PrimOp::Multiply, effect, Expr::Int(0)))
        );
    }

    #[test]
    fn test_division_by_literal_zero_anywhere() {
        assert_eq!(
            fold(prim(PrimOp::Div, var("x"), Expr::Int(0))),
            Err(Error::DivisionByZero)
        );
        assert_eq!(
            fold(Expr::If(
                Box::new(Expr::Bool(true)),
                Box::new(Expr::Int(1)),
                Box::new(prim(PrimOp::Div, var("x"), prim(PrimOp::Subtract, Expr::Int(2), Expr::Int(2)))),
            )),
            Err(Error::DivisionByZero)
        );
    }

    #[test]
    fn test_if_on_literal() {
        assert_eq!(
            fold(Expr::If(
                Box::new(prim(PrimOp::EqualTo, Expr::Int(1), Expr::Int(2))),
                Box::new(var("x")),
                Box::new(prim(PrimOp::Multiply, Expr::Int(3), Expr::Int(4))),
            )),
            Ok(Expr::Int(12))
        );
    }

    #[test]
    fn test_type_mismatch_is_left_alone() {
        let expr = prim(PrimOp::Add, Expr::Bool(true), Expr::Int(1));
        assert_eq!(fold(expr.clone()), Ok(expr));
    }
}
