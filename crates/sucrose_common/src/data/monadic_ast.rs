// Administrative normal form: every operand of a primitive, tuple operation or application is an
// atom. Compound values reach operand positions only through `Let`.

use crate::data::prim::PrimOp;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Atom {
    Int(i64),
    Bool(bool),
    Unit,
    Var(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Expr {
    Atom(Atom),
    Prim(PrimOp, Atom, Atom),
    Let(String, Box<Expr>, Box<Expr>),
    If(Atom, Box<Expr>, Box<Expr>),

    // The condition is re-evaluated on every iteration, so it keeps its own bindings.
    While(Box<Expr>, Box<Expr>),
    Do(Box<Expr>, Box<Expr>), // (effect, value)

    Tuple(Vec<Atom>),
    Get(Atom, usize),
    Set(Atom, usize, Atom),

    Lambda(Vec<String>, Box<Expr>),
    Apply(Atom, Vec<Atom>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Program {
    pub params: Vec<String>,
    pub body: Expr,
}
