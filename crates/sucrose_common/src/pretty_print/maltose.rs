use crate::data::maltose_ast::{Expr, Program, Stmt};
use crate::pretty_print::monadic::{apply_sexp, atom_sexp};
use crate::pretty_print::sexp::{self, SExp};
use std::io::{self, Write};

fn expr_sexp(expr: &Expr) -> SExp {
    match expr {
        Expr::Copy(atom) => atom_sexp(atom),
        Expr::Prim(op, lhs, rhs) => SExp::form(op.name(), [atom_sexp(lhs), atom_sexp(rhs)]),
        Expr::Tuple(items) => SExp::form("tuple", items.iter().map(atom_sexp)),
        Expr::Get(tuple, idx) => SExp::form("tuple-ref", [atom_sexp(tuple), SExp::atom(idx)]),
        Expr::Set(tuple, idx, val) => SExp::form(
            "tuple-set!",
            [atom_sexp(tuple), SExp::atom(idx), atom_sexp(val)],
        ),
        Expr::Lambda(params, body) => {
            SExp::form("lambda", [SExp::names(params), stmt_sexp(body)])
        }
    }
}

pub fn stmt_sexp(stmt: &Stmt) -> SExp {
    match stmt {
        Stmt::Let(name, val, rest) => SExp::form(
            "let",
            [
                SExp::list([SExp::atom(name), expr_sexp(val)]),
                stmt_sexp(rest),
            ],
        ),
        Stmt::If(cond, then_, else_) => {
            SExp::form("if", [atom_sexp(cond), stmt_sexp(then_), stmt_sexp(else_)])
        }
        Stmt::Apply(func, args) => apply_sexp(func, args),
        Stmt::Halt(atom) => SExp::form("halt", [atom_sexp(atom)]),
    }
}

pub fn write_program(w: &mut dyn Write, program: &Program) -> io::Result<()> {
    let sexp = SExp::form(
        "program",
        [SExp::names(&program.params), stmt_sexp(&program.body)],
    );
    sexp::write(w, &sexp)
}
