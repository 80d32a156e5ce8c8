pub mod sexp;

pub mod cell;
pub mod hoisted;
pub mod kernel;
pub mod maltose;
pub mod monadic;
