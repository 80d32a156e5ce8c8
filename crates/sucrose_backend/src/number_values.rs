use im_rc::HashMap;
use thiserror::Error;

use sucrose_common::data::cell_ast::{Expr, Program};
use sucrose_common::data::prim::PrimOp;
use sucrose_common::util::fresh::FreshNames;
use sucrose_common::util::progress_logger::{ProgressLogger, ProgressSession};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    #[error("Value numbering does not support a program whose body is a bare boolean literal.")]
    BareBoolean,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum Operand {
    Int(i64),
    Bool(bool),
    Unit,
    Var(String),
}

fn operand(expr: &Expr) -> Option<Operand> {
    match expr {
        Expr::Int(val) => Some(Operand::Int(*val)),
        Expr::Bool(val) => Some(Operand::Bool(*val)),
        Expr::Unit => Some(Operand::Unit),
        Expr::Var(name) => Some(Operand::Var(name.clone())),
        _ => None,
    }
}

type Key = (PrimOp, Operand, Operand);

// Only primitives over atoms are shared. Their operands are immutable once bound, so equal keys
// always denote equal values. Division is left alone because it can fail.
fn key(expr: &Expr) -> Option<Key> {
    match expr {
        Expr::Prim(op, lhs, rhs) if *op != PrimOp::Div => Some((*op, operand(lhs)?, operand(rhs)?)),
        _ => None,
    }
}

// Maps each known key to the variable holding its value. Persistent, so that a nested scope sees
// every binding of the scopes enclosing it and none of its siblings'.
type Table = HashMap<Key, String>;

/// A region whose new bindings are all emitted at its top, where every variable the region may
/// mention is already bound.
struct Scope {
    table: Table,
    bindings: Vec<(String, Expr)>,
}

struct Context<'a> {
    fresh: &'a mut FreshNames,
}

impl<'a> Context<'a> {
    fn number_scope(&mut self, table: &Table, expr: Expr) -> Expr {
        let mut scope = Scope {
            table: table.clone(),
            bindings: Vec::new(),
        };
        let body = self.number_value(&mut scope, expr);
        scope
            .bindings
            .into_iter()
            .rev()
            .fold(body, |body, (name, value)| {
                Expr::Let(name, Box::new(value), Box::new(body))
            })
    }

    fn number_boxed_scope(&mut self, table: &Table, expr: Box<Expr>) -> Box<Expr> {
        Box::new(self.number_scope(table, *expr))
    }

    // The value of `expr` is not given a name of its own, but is replaced if it already has one.
    fn number_value(&mut self, scope: &mut Scope, expr: Expr) -> Expr {
        let expr = self.number_children(scope, expr);
        match key(&expr).and_then(|key| scope.table.get(&key)) {
            Some(name) => Expr::Var(name.clone()),
            None => expr,
        }
    }

    fn number_operand(&mut self, scope: &mut Scope, expr: Expr) -> Expr {
        let expr = self.number_children(scope, expr);
        let key = match key(&expr) {
            Some(key) => key,
            None => return expr,
        };

        let name = match scope.table.get(&key) {
            Some(name) => name.clone(),
            None => {
                let name = self.fresh.fresh("v");
                scope.bindings.push((name.clone(), expr));
                scope.table.insert(key, name.clone());
                name
            }
        };
        Expr::Var(name)
    }

    fn number_boxed_operand(&mut self, scope: &mut Scope, expr: Box<Expr>) -> Box<Expr> {
        Box::new(self.number_operand(scope, *expr))
    }

    fn number_children(&mut self, scope: &mut Scope, expr: Expr) -> Expr {
        stacker::maybe_grow(32 * 1024, 1024 * 1024, || {
            self.number_children_inner(scope, expr)
        })
    }

    fn number_children_inner(&mut self, scope: &mut Scope, expr: Expr) -> Expr {
        match expr {
            Expr::Int(_) | Expr::Bool(_) | Expr::Unit | Expr::Var(_) => expr,

            Expr::Prim(op, lhs, rhs) => Expr::Prim(
                op,
                self.number_boxed_operand(scope, lhs),
                self.number_boxed_operand(scope, rhs),
            ),

            Expr::Let(name, value, body) => {
                let value = self.number_value(scope, *value);
                let mut table = scope.table.clone();
                if let Some(key) = key(&value) {
                    table.insert(key, name.clone());
                }
                let body = self.number_scope(&table, *body);
                Expr::Let(name, Box::new(value), Box::new(body))
            }

            Expr::If(cond, then_, else_) => Expr::If(
                self.number_boxed_operand(scope, cond),
                self.number_boxed_scope(&scope.table, then_),
                self.number_boxed_scope(&scope.table, else_),
            ),

            Expr::While(cond, body) => Expr::While(
                self.number_boxed_scope(&scope.table, cond),
                self.number_boxed_scope(&scope.table, body),
            ),

            Expr::Do(effect, value) => Expr::Do(
                self.number_boxed_operand(scope, effect),
                self.number_boxed_operand(scope, value),
            ),

            Expr::Tuple(items) => Expr::Tuple(
                items
                    .into_iter()
                    .map(|item| self.number_operand(scope, item))
                    .collect(),
            ),
            Expr::Get(tuple, idx) => Expr::Get(self.number_boxed_operand(scope, tuple), idx),
            Expr::Set(tuple, idx, value) => Expr::Set(
                self.number_boxed_operand(scope, tuple),
                idx,
                self.number_boxed_operand(scope, value),
            ),

            Expr::Lambda(params, body) => {
                Expr::Lambda(params, self.number_boxed_scope(&scope.table, body))
            }
            Expr::Apply(func, args) => Expr::Apply(
                self.number_boxed_operand(scope, func),
                args.into_iter()
                    .map(|arg| self.number_operand(scope, arg))
                    .collect(),
            ),
        }
    }
}

/// Shares structurally identical primitive computations. Expects uniquified input, so that a
/// variable name identifies a single binding.
pub fn number_values(
    program: Program,
    fresh: &mut FreshNames,
    progress: impl ProgressLogger,
) -> Result<Program, Error> {
    if let Expr::Bool(_) = program.body {
        return Err(Error::BareBoolean);
    }

    let progress = progress.start_session(None);

    let mut ctx = Context { fresh };
    let body = ctx.number_scope(&Table::new(), program.body);

    progress.finish();

    Ok(Program {
        params: program.params,
        body,
    })
}
