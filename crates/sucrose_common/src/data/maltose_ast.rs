// Continuation-passing style. Statements never produce a value: every path ends in `Halt` or in an
// `Apply`, which is a jump to a continuation, a return through one, or a call that carries its
// return continuation as the last argument.
//
// Close-lambdas maps this dialect to itself; afterwards every `Lambda` takes its closure
// environment as its first parameter and mentions no variable bound outside of it.

use crate::data::prim::PrimOp;

pub use crate::data::monadic_ast::Atom;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Expr {
    Copy(Atom),
    Prim(PrimOp, Atom, Atom),
    Tuple(Vec<Atom>),
    Get(Atom, usize),
    Set(Atom, usize, Atom),
    Lambda(Vec<String>, Box<Stmt>),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Stmt {
    Let(String, Expr, Box<Stmt>),
    If(Atom, Box<Stmt>, Box<Stmt>),
    Apply(Atom, Vec<Atom>),
    Halt(Atom),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Program {
    pub params: Vec<String>,
    pub body: Stmt,
}
