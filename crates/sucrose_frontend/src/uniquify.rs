use im_rc::HashMap;
use thiserror::Error;

use sucrose_common::data::cell_ast::{Expr, Program};
use sucrose_common::util::fresh::FreshNames;
use sucrose_common::util::progress_logger::{ProgressLogger, ProgressSession};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    #[error("The variable `{0}` is not in scope.")]
    UnboundVariable(String),
}

// Maps each source name to the unique name of its innermost binder. Persistent, so a scope's
// bindings disappear as soon as the scope's copy of the map is dropped.
type Env = HashMap<String, String>;

struct Context<'a> {
    fresh: &'a mut FreshNames,
}

impl<'a> Context<'a> {
    fn bind_all(&mut self, env: &Env, names: Vec<String>) -> (Env, Vec<String>) {
        let mut inner = env.clone();
        let renamed = names
            .into_iter()
            .map(|name| {
                let unique = self.fresh.fresh_from(&name);
                inner.insert(name, unique.clone());
                unique
            })
            .collect();
        (inner, renamed)
    }

    fn uniquify_all(&mut self, env: &Env, exprs: Vec<Expr>) -> Result<Vec<Expr>, Error> {
        exprs
            .into_iter()
            .map(|expr| self.uniquify_expr(env, expr))
            .collect()
    }

    fn uniquify_boxed(&mut self, env: &Env, expr: Box<Expr>) -> Result<Box<Expr>, Error> {
        Ok(Box::new(self.uniquify_expr(env, *expr)?))
    }

    fn uniquify_expr(&mut self, env: &Env, expr: Expr) -> Result<Expr, Error> {
        stacker::maybe_grow(32 * 1024, 1024 * 1024, || self.uniquify_expr_inner(env, expr))
    }

    fn uniquify_expr_inner(&mut self, env: &Env, expr: Expr) -> Result<Expr, Error> {
        Ok(match expr {
            Expr::Int(_) | Expr::Bool(_) | Expr::Unit => expr,
            Expr::Var(name) => match env.get(&name) {
                Some(unique) => Expr::Var(unique.clone()),
                None => return Err(Error::UnboundVariable(name)),
            },

            Expr::Let(name, value, body) => {
                let value = self.uniquify_boxed(env, value)?;
                let unique = self.fresh.fresh_from(&name);
                let body = self.uniquify_boxed(&env.update(name, unique.clone()), body)?;
                Expr::Let(unique, value, body)
            }
            Expr::Lambda(params, body) => {
                let (inner, params) = self.bind_all(env, params);
                Expr::Lambda(params, self.uniquify_boxed(&inner, body)?)
            }

            Expr::Prim(op, lhs, rhs) => Expr::Prim(
                op,
                self.uniquify_boxed(env, lhs)?,
                self.uniquify_boxed(env, rhs)?,
            ),
            Expr::If(cond, then_, else_) => Expr::If(
                self.uniquify_boxed(env, cond)?,
                self.uniquify_boxed(env, then_)?,
                self.uniquify_boxed(env, else_)?,
            ),
            Expr::While(cond, body) => Expr::While(
                self.uniquify_boxed(env, cond)?,
                self.uniquify_boxed(env, body)?,
            ),
            Expr::Do(effect, value) => Expr::Do(
                self.uniquify_boxed(env, effect)?,
                self.uniquify_boxed(env, value)?,
            ),
            Expr::Tuple(items) => Expr::Tuple(self.uniquify_all(env, items)?),
            Expr::Get(tuple, idx) => Expr::Get(self.uniquify_boxed(env, tuple)?, idx),
            Expr::Set(tuple, idx, value) => Expr::Set(
                self.uniquify_boxed(env, tuple)?,
                idx,
                self.uniquify_boxed(env, value)?,
            ),
            Expr::Apply(func, args) => Expr::Apply(
                self.uniquify_boxed(env, func)?,
                self.uniquify_all(env, args)?,
            ),
        })
    }
}

pub fn uniquify(
    program: Program,
    fresh: &mut FreshNames,
    progress: impl ProgressLogger,
) -> Result<Program, Error> {
    let progress = progress.start_session(None);

    let mut ctx = Context { fresh };
    let (env, params) = ctx.bind_all(&Env::new(), program.params);
    let body = ctx.uniquify_expr(&env, program.body)?;

    progress.finish();

    Ok(Program { params, body })
}
