use crate::data::cell_ast::{Expr, Program};
use crate::pretty_print::sexp::{self, SExp};
use std::io::{self, Write};

pub fn expr_sexp(expr: &Expr) -> SExp {
    match expr {
        Expr::Int(val) => SExp::atom(val),
        Expr::Bool(val) => SExp::atom(val),
        Expr::Unit => SExp::atom("unit"),
        Expr::Var(name) => SExp::atom(name),

        Expr::Prim(op, lhs, rhs) => SExp::form(op.name(), [expr_sexp(lhs), expr_sexp(rhs)]),
        Expr::Let(name, val, body) => SExp::form(
            "let",
            [
                SExp::list([SExp::atom(name), expr_sexp(val)]),
                expr_sexp(body),
            ],
        ),
        Expr::If(cond, then_, else_) => {
            SExp::form("if", [expr_sexp(cond), expr_sexp(then_), expr_sexp(else_)])
        }

        Expr::While(cond, body) => SExp::form("while", [expr_sexp(cond), expr_sexp(body)]),
        Expr::Do(effect, val) => SExp::form("begin", [expr_sexp(effect), expr_sexp(val)]),

        Expr::Tuple(items) => SExp::form("tuple", items.iter().map(expr_sexp)),
        Expr::Get(tuple, idx) => SExp::form("tuple-ref", [expr_sexp(tuple), SExp::atom(idx)]),
        Expr::Set(tuple, idx, val) => SExp::form(
            "tuple-set!",
            [expr_sexp(tuple), SExp::atom(idx), expr_sexp(val)],
        ),

        Expr::Lambda(params, body) => {
            SExp::form("lambda", [SExp::names(params), expr_sexp(body)])
        }
        Expr::Apply(func, args) => {
            SExp::list(std::iter::once(expr_sexp(func)).chain(args.iter().map(expr_sexp)))
        }
    }
}

pub fn write_program(w: &mut dyn Write, program: &Program) -> io::Result<()> {
    let sexp = SExp::form(
        "program",
        [SExp::names(&program.params), expr_sexp(&program.body)],
    );
    sexp::write(w, &sexp)
}
