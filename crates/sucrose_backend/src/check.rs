//! Post-conditions of closure conversion and hoisting. A failure here is a bug in the compiler,
//! never in the program being compiled.

use std::collections::BTreeSet;
use thiserror::Error;

use crate::close_lambdas::expr_free_vars;
use sucrose_common::data::hoisted_ast as hoisted;
use sucrose_common::data::maltose_ast as maltose;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    #[error("a lambda taking ({}) still mentions `{var}` from an enclosing scope", params.join(" "))]
    LambdaNotClosed { params: Vec<String>, var: String },
    #[error("the program refers to `{0}`, which is not in its function table")]
    UnknownGlobal(String),
}

fn check_no_capture(params: &[String], free: BTreeSet<String>) -> Result<(), Error> {
    match free.into_iter().next() {
        Some(var) => Err(Error::LambdaNotClosed {
            params: params.to_vec(),
            var,
        }),
        None => Ok(()),
    }
}

fn check_closed_stmt(stmt: &maltose::Stmt) -> Result<(), Error> {
    stacker::maybe_grow(32 * 1024, 1024 * 1024, || match stmt {
        maltose::Stmt::Let(_, value, rest) => {
            if let maltose::Expr::Lambda(params, body) = value {
                check_no_capture(params, expr_free_vars(value))?;
                check_closed_stmt(body)?;
            }
            check_closed_stmt(rest)
        }
        maltose::Stmt::If(_, then_, else_) => {
            check_closed_stmt(then_)?;
            check_closed_stmt(else_)
        }
        maltose::Stmt::Apply(_, _) | maltose::Stmt::Halt(_) => Ok(()),
    })
}

/// Checks that no lambda in `program` mentions a variable bound outside of it.
pub fn check_closed(program: &maltose::Program) -> Result<(), Error> {
    check_closed_stmt(&program.body)
}

fn add_atoms<'a>(atoms: impl IntoIterator<Item = &'a hoisted::Atom>, vars: &mut BTreeSet<String>) {
    for atom in atoms {
        if let hoisted::Atom::Var(name) = atom {
            vars.insert(name.clone());
        }
    }
}

// Collects the free variables of a hoisted statement and every global label it mentions.
fn hoisted_stmt_uses<'a>(
    stmt: &'a hoisted::Stmt,
    vars: &mut BTreeSet<String>,
    labels: &mut Vec<&'a str>,
) {
    stacker::maybe_grow(32 * 1024, 1024 * 1024, || match stmt {
        hoisted::Stmt::Let(name, value, rest) => {
            let mut rest_vars = BTreeSet::new();
            hoisted_stmt_uses(rest, &mut rest_vars, labels);
            rest_vars.remove(name);
            vars.extend(rest_vars);

            match value {
                hoisted::Expr::Global(label) => labels.push(label),
                hoisted::Expr::Copy(atom) | hoisted::Expr::Get(atom, _) => add_atoms([atom], vars),
                hoisted::Expr::Prim(_, lhs, rhs) | hoisted::Expr::Set(lhs, _, rhs) => {
                    add_atoms([lhs, rhs], vars)
                }
                hoisted::Expr::Tuple(items) => add_atoms(items, vars),
            }
        }
        hoisted::Stmt::If(cond, then_, else_) => {
            add_atoms([cond], vars);
            hoisted_stmt_uses(then_, vars, labels);
            hoisted_stmt_uses(else_, vars, labels);
        }
        hoisted::Stmt::Apply(func, args) => add_atoms(std::iter::once(func).chain(args), vars),
        hoisted::Stmt::Halt(result) => add_atoms([result], vars),
    })
}

/// Checks that every global label refers to a function in the table, and that every function
/// body only mentions its own parameters.
pub fn check_hoisted(program: &hoisted::Program) -> Result<(), Error> {
    let bodies = std::iter::once((None, &program.body)).chain(
        program
            .functions
            .values()
            .map(|function| (Some(&function.params), &function.body)),
    );

    for (params, body) in bodies {
        let mut vars = BTreeSet::new();
        let mut labels = Vec::new();
        hoisted_stmt_uses(body, &mut vars, &mut labels);

        if let Some(label) = labels
            .into_iter()
            .find(|label| !program.functions.contains_key(*label))
        {
            return Err(Error::UnknownGlobal(label.to_owned()));
        }

        if let Some(params) = params {
            for param in params {
                vars.remove(param);
            }
            check_no_capture(params, vars)?;
        }
    }

    Ok(())
}
