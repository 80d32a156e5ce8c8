use crate::data::monadic_ast::{Atom, Expr, Program};
use crate::pretty_print::sexp::{self, SExp};
use std::io::{self, Write};

pub fn atom_sexp(atom: &Atom) -> SExp {
    match atom {
        Atom::Int(val) => SExp::atom(val),
        Atom::Bool(val) => SExp::atom(val),
        Atom::Unit => SExp::atom("unit"),
        Atom::Var(name) => SExp::atom(name),
    }
}

pub fn apply_sexp(func: &Atom, args: &[Atom]) -> SExp {
    SExp::list(std::iter::once(atom_sexp(func)).chain(args.iter().map(atom_sexp)))
}

fn expr_sexp(expr: &Expr) -> SExp {
    match expr {
        Expr::Atom(atom) => atom_sexp(atom),
        Expr::Prim(op, lhs, rhs) => SExp::form(op.name(), [atom_sexp(lhs), atom_sexp(rhs)]),
        Expr::Let(name, val, body) => SExp::form(
            "let",
            [
                SExp::list([SExp::atom(name), expr_sexp(val)]),
                expr_sexp(body),
            ],
        ),
        Expr::If(cond, then_, else_) => {
            SExp::form("if", [atom_sexp(cond), expr_sexp(then_), expr_sexp(else_)])
        }
        Expr::While(cond, body) => SExp::form("while", [expr_sexp(cond), expr_sexp(body)]),
        Expr::Do(effect, val) => SExp::form("begin", [expr_sexp(effect), expr_sexp(val)]),
        Expr::Tuple(items) => SExp::form("tuple", items.iter().map(atom_sexp)),
        Expr::Get(tuple, idx) => SExp::form("tuple-ref", [atom_sexp(tuple), SExp::atom(idx)]),
        Expr::Set(tuple, idx, val) => SExp::form(
            "tuple-set!",
            [atom_sexp(tuple), SExp::atom(idx), atom_sexp(val)],
        ),
        Expr::Lambda(params, body) => {
            SExp::form("lambda", [SExp::names(params), expr_sexp(body)])
        }
        Expr::Apply(func, args) => apply_sexp(func, args),
    }
}

pub fn write_program(w: &mut dyn Write, program: &Program) -> io::Result<()> {
    let sexp = SExp::form(
        "program",
        [SExp::names(&program.params), expr_sexp(&program.body)],
    );
    sexp::write(w, &sexp)
}
