// The surface dialect, as produced by the parser.

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ArithOp {
    Add,
    Subtract,
    Multiply,
    Div,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Comparison {
    Less,
    LessEqual,
    Equal,
    Greater,
    GreaterEqual,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Pattern {
    Any,
    Var(String),
    Int(i64),
    Bool(bool),
    Tuple(Vec<Pattern>),
}

impl Pattern {
    /// Whether this pattern matches every value of the shape it expects.
    pub fn is_irrefutable(&self) -> bool {
        match self {
            Pattern::Any | Pattern::Var(_) => true,
            Pattern::Int(_) | Pattern::Bool(_) => false,
            Pattern::Tuple(items) => items.iter().all(Pattern::is_irrefutable),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Expr {
    Int(i64),
    Bool(bool),
    Unit,
    Var(String),

    Arith(ArithOp, Vec<Expr>),
    Compare(Comparison, Vec<Expr>),
    Not(Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),

    Let(String, Box<Expr>, Box<Expr>),
    LetStar(Vec<(String, Expr)>, Box<Expr>),
    LetRec(String, Box<Expr>, Box<Expr>),

    If(Box<Expr>, Box<Expr>, Box<Expr>),
    Cond(Vec<(Expr, Expr)>, Box<Expr>), // (clauses, default)
    Match(Box<Expr>, Vec<(Pattern, Expr)>),

    Assign(String, Box<Expr>),
    While(Box<Expr>, Box<Expr>),
    Begin(Vec<Expr>),

    Tuple(Vec<Expr>),
    Get(Box<Expr>, usize),
    Set(Box<Expr>, usize, Box<Expr>),

    Lambda(Vec<String>, Box<Expr>),
    Apply(Box<Expr>, Vec<Expr>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Define {
    pub name: String,
    pub value: Expr,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Program {
    pub params: Vec<String>,
    pub defines: Vec<Define>,
    pub body: Expr,
}
