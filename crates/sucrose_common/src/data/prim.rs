use std::fmt;
use thiserror::Error;

/// The binary primitives every dialect from the kernel onward shares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PrimOp {
    Add,
    Subtract,
    Multiply,
    Div,
    LessThan,
    EqualTo,
    GreaterThanOrEqualTo,
}

impl PrimOp {
    pub fn name(self) -> &'static str {
        match self {
            PrimOp::Add => "+",
            PrimOp::Subtract => "-",
            PrimOp::Multiply => "*",
            PrimOp::Div => "/",
            PrimOp::LessThan => "<",
            PrimOp::EqualTo => "=",
            PrimOp::GreaterThanOrEqualTo => ">=",
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            PrimOp::LessThan | PrimOp::EqualTo | PrimOp::GreaterThanOrEqualTo
        )
    }

    pub fn eval(self, lhs: Const, rhs: Const) -> Result<Const, PrimError> {
        use Const::*;
        match (self, lhs, rhs) {
            (PrimOp::Add, Int(l), Int(r)) => Ok(Int(l.wrapping_add(r))),
            (PrimOp::Subtract, Int(l), Int(r)) => Ok(Int(l.wrapping_sub(r))),
            (PrimOp::Multiply, Int(l), Int(r)) => Ok(Int(l.wrapping_mul(r))),
            (PrimOp::Div, Int(_), Int(0)) => Err(PrimError::DivideByZero),
            (PrimOp::Div, Int(l), Int(r)) => Ok(Int(l.wrapping_div(r))),
            (PrimOp::LessThan, Int(l), Int(r)) => Ok(Bool(l < r)),
            (PrimOp::GreaterThanOrEqualTo, Int(l), Int(r)) => Ok(Bool(l >= r)),
            (PrimOp::EqualTo, Int(l), Int(r)) => Ok(Bool(l == r)),
            (PrimOp::EqualTo, Bool(l), Bool(r)) => Ok(Bool(l == r)),
            (PrimOp::EqualTo, Unit, Unit) => Ok(Bool(true)),
            (op, lhs, rhs) => Err(PrimError::TypeMismatch { op, lhs, rhs }),
        }
    }
}

impl fmt::Display for PrimOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A scalar literal, as it appears in a program or as a program argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Const {
    Int(i64),
    Bool(bool),
    Unit,
}

impl fmt::Display for Const {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Const::Int(val) => write!(f, "{}", val),
            Const::Bool(true) => write!(f, "true"),
            Const::Bool(false) => write!(f, "false"),
            Const::Unit => write!(f, "unit"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PrimError {
    #[error("division by zero")]
    DivideByZero,
    #[error("primitive `{op}` cannot be applied to `{lhs}` and `{rhs}`")]
    TypeMismatch { op: PrimOp, lhs: Const, rhs: Const },
}
