//! Reference evaluators, one per executable dialect. They exist so that every pass can be checked
//! against the dialect it consumes: a program must evaluate to the same value before and after.

pub mod store;

pub mod cell;
pub mod hoisted;
pub mod kernel;
pub mod maltose;
pub mod monadic;

use thiserror::Error;

use crate::interpreter::store::{Addr, Store, Value};
use sucrose_common::data::prim::{Const, PrimError, PrimOp};

// Stack growth parameters for the direct-style evaluators.
const STACK_RED_ZONE_BYTES: usize = 64 * 1024;
const STACK_GROW_BYTES: usize = 2 * 1024 * 1024;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    #[error("the program takes {expected} arguments, but {actual} were given")]
    ArgumentCount { expected: usize, actual: usize },
    #[error("the variable `{0}` is not bound")]
    UnboundVariable(String),
    #[error("expected a value of type {expected}, found a value of type {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("primitive `{op}` cannot be applied to a {lhs} and a {rhs}")]
    PrimTypeMismatch {
        op: PrimOp,
        lhs: &'static str,
        rhs: &'static str,
    },
    #[error("attempted to call a value of type {0}")]
    NotAFunction(&'static str),
    #[error("the function takes {expected} arguments, but {actual} were given")]
    Arity { expected: usize, actual: usize },
    #[error("no tuple is allocated at address {0}")]
    InvalidAddress(Addr),
    #[error("index {index} is out of bounds for a tuple of size {size}")]
    OutOfBounds { index: usize, size: usize },
    #[error("division by zero")]
    DivideByZero,
    #[error("no function is labelled `{0}`")]
    UnknownGlobal(String),
}

/// The outcome of running a program: its final value and the store it left behind.
#[derive(Clone, Debug)]
pub struct Evaluation<F> {
    pub value: Value<F>,
    pub store: Store<F>,
}

impl<F: Clone> Evaluation<F> {
    /// The final value, if it is printable as a literal.
    pub fn result(&self) -> Option<Const> {
        self.value.to_const()
    }
}

pub(crate) fn check_arg_count(params: &[String], args: &[Const]) -> Result<(), Error> {
    if params.len() != args.len() {
        return Err(Error::ArgumentCount {
            expected: params.len(),
            actual: args.len(),
        });
    }
    Ok(())
}

pub(crate) fn check_arity<T>(params: &[String], args: &[T]) -> Result<(), Error> {
    if params.len() != args.len() {
        return Err(Error::Arity {
            expected: params.len(),
            actual: args.len(),
        });
    }
    Ok(())
}

pub(crate) fn eval_prim<F>(op: PrimOp, lhs: &Value<F>, rhs: &Value<F>) -> Result<Value<F>, Error> {
    let mismatch = || Error::PrimTypeMismatch {
        op,
        lhs: lhs.kind(),
        rhs: rhs.kind(),
    };
    let (lhs_const, rhs_const) = match (lhs.to_const(), rhs.to_const()) {
        (Some(lhs), Some(rhs)) => (lhs, rhs),
        _ => return Err(mismatch()),
    };
    match op.eval(lhs_const, rhs_const) {
        Ok(result) => Ok(Value::from_const(result)),
        Err(PrimError::DivideByZero) => Err(Error::DivideByZero),
        Err(PrimError::TypeMismatch { .. }) => Err(mismatch()),
    }
}

pub(crate) fn alloc_tuple<F: Clone>(store: &mut Store<F>, items: Vec<Value<F>>) -> Value<F> {
    Value::Pointer(store.alloc(items))
}

pub(crate) fn get<F: Clone>(store: &Store<F>, tuple: &Value<F>, idx: usize) -> Result<Value<F>, Error> {
    store.load(tuple.as_pointer()?, idx)
}

pub(crate) fn set<F: Clone>(
    store: &mut Store<F>,
    tuple: &Value<F>,
    idx: usize,
    value: Value<F>,
) -> Result<Value<F>, Error> {
    store.store(tuple.as_pointer()?, idx, value)?;
    Ok(Value::Unit)
}
