use std::collections::BTreeSet;

use sucrose_common::data::maltose_ast::{Atom, Expr, Program, Stmt};
use sucrose_common::util::fresh::FreshNames;
use sucrose_common::util::progress_logger::{ProgressLogger, ProgressSession};

fn atom_vars<'a>(atoms: impl IntoIterator<Item = &'a Atom>, vars: &mut BTreeSet<String>) {
    for atom in atoms {
        if let Atom::Var(name) = atom {
            vars.insert(name.clone());
        }
    }
}

pub fn expr_free_vars(expr: &Expr) -> BTreeSet<String> {
    let mut vars = BTreeSet::new();
    match expr {
        Expr::Copy(atom) | Expr::Get(atom, _) => atom_vars([atom], &mut vars),
        Expr::Prim(_, lhs, rhs) | Expr::Set(lhs, _, rhs) => atom_vars([lhs, rhs], &mut vars),
        Expr::Tuple(items) => atom_vars(items, &mut vars),
        Expr::Lambda(params, body) => {
            vars = free_vars(body);
            for param in params {
                vars.remove(param);
            }
        }
    }
    vars
}

/// The variables a statement mentions without binding them.
pub fn free_vars(stmt: &Stmt) -> BTreeSet<String> {
    stacker::maybe_grow(32 * 1024, 1024 * 1024, || match stmt {
        Stmt::Let(name, value, rest) => {
            let mut vars = free_vars(rest);
            vars.remove(name);
            vars.extend(expr_free_vars(value));
            vars
        }
        Stmt::If(cond, then_, else_) => {
            let mut vars = free_vars(then_);
            vars.extend(free_vars(else_));
            atom_vars([cond], &mut vars);
            vars
        }
        Stmt::Apply(func, args) => {
            let mut vars = BTreeSet::new();
            atom_vars(std::iter::once(func).chain(args), &mut vars);
            vars
        }
        Stmt::Halt(result) => {
            let mut vars = BTreeSet::new();
            atom_vars([result], &mut vars);
            vars
        }
    })
}

fn close_stmt(stmt: Stmt, fresh: &mut FreshNames) -> Stmt {
    stacker::maybe_grow(32 * 1024, 1024 * 1024, || close_stmt_inner(stmt, fresh))
}

fn close_stmt_inner(stmt: Stmt, fresh: &mut FreshNames) -> Stmt {
    match stmt {
        // A lambda becomes a closed code block taking its environment first, and the name it was
        // bound to now holds the closure `(code, captured...)`.
        Stmt::Let(name, Expr::Lambda(params, body), rest) => {
            let body = close_stmt(*body, fresh);

            let mut captured = free_vars(&body);
            for param in &params {
                captured.remove(param);
            }
            // Sorted, and in the same order in the environment and in the projections.
            let captured = captured.into_iter().collect::<Vec<_>>();

            let env = fresh.fresh("env.");
            let code = fresh.fresh("code.");

            let body = captured
                .iter()
                .enumerate()
                .rev()
                .fold(body, |body, (i, var)| {
                    Stmt::Let(
                        var.clone(),
                        Expr::Get(Atom::Var(env.clone()), i + 1),
                        Box::new(body),
                    )
                });
            let code_params = std::iter::once(env).chain(params).collect();

            let closure = std::iter::once(Atom::Var(code.clone()))
                .chain(captured.into_iter().map(Atom::Var))
                .collect();

            Stmt::Let(
                code.clone(),
                Expr::Lambda(code_params, Box::new(body)),
                Box::new(Stmt::Let(
                    name,
                    Expr::Tuple(closure),
                    Box::new(close_stmt(*rest, fresh)),
                )),
            )
        }

        Stmt::Let(name, value, rest) => Stmt::Let(name, value, Box::new(close_stmt(*rest, fresh))),

        Stmt::If(cond, then_, else_) => Stmt::If(
            cond,
            Box::new(close_stmt(*then_, fresh)),
            Box::new(close_stmt(*else_, fresh)),
        ),

        // Every function value is now a closure, so a call fetches the code out of it and passes
        // the closure itself along as the environment.
        Stmt::Apply(func, args) => {
            let code = fresh.fresh("code.");
            let args = std::iter::once(func.clone()).chain(args).collect();
            Stmt::Let(
                code.clone(),
                Expr::Get(func, 0),
                Box::new(Stmt::Apply(Atom::Var(code), args)),
            )
        }

        Stmt::Halt(result) => Stmt::Halt(result),
    }
}

pub fn close_lambdas(program: Program, fresh: &mut FreshNames, progress: impl ProgressLogger) -> Program {
    let progress = progress.start_session(None);
    let body = close_stmt(program.body, fresh);
    progress.finish();

    Program {
        params: program.params,
        body,
    }
}
