use crate::data::prim::PrimOp;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Expr {
    Int(i64),
    Bool(bool),
    Unit,
    Var(String),

    Prim(PrimOp, Box<Expr>, Box<Expr>),
    Let(String, Box<Expr>, Box<Expr>),
    If(Box<Expr>, Box<Expr>, Box<Expr>),

    Assign(String, Box<Expr>),
    While(Box<Expr>, Box<Expr>),
    Do(Box<Expr>, Box<Expr>), // (effect, value)

    Tuple(Vec<Expr>),
    Get(Box<Expr>, usize),
    Set(Box<Expr>, usize, Box<Expr>),

    Lambda(Vec<String>, Box<Expr>),
    Apply(Box<Expr>, Vec<Expr>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Program {
    pub params: Vec<String>,
    pub body: Expr,
}
