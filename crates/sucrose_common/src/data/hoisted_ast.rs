use crate::data::prim::PrimOp;
use std::collections::BTreeMap;

pub use crate::data::monadic_ast::Atom;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Expr {
    Copy(Atom),
    Prim(PrimOp, Atom, Atom),
    Tuple(Vec<Atom>),
    Get(Atom, usize),
    Set(Atom, usize, Atom),
    Global(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Stmt {
    Let(String, Expr, Box<Stmt>),
    If(Atom, Box<Stmt>, Box<Stmt>),
    Apply(Atom, Vec<Atom>),
    Halt(Atom),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Function {
    pub params: Vec<String>,
    pub body: Stmt,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Program {
    pub params: Vec<String>,
    pub body: Stmt,
    // Keyed by global label
    pub functions: BTreeMap<String, Function>,
}
