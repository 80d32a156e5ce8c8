use std::collections::BTreeMap;

use sucrose_common::data::hoisted_ast as hoisted;
use sucrose_common::data::maltose_ast as maltose;
use sucrose_common::util::fresh::FreshNames;
use sucrose_common::util::progress_logger::{ProgressLogger, ProgressSession};

struct Context<'a> {
    fresh: &'a mut FreshNames,
    functions: BTreeMap<String, hoisted::Function>,
}

impl<'a> Context<'a> {
    fn hoist_expr(&mut self, expr: maltose::Expr) -> hoisted::Expr {
        match expr {
            maltose::Expr::Copy(atom) => hoisted::Expr::Copy(atom),
            maltose::Expr::Prim(op, lhs, rhs) => hoisted::Expr::Prim(op, lhs, rhs),
            maltose::Expr::Tuple(items) => hoisted::Expr::Tuple(items),
            maltose::Expr::Get(tuple, idx) => hoisted::Expr::Get(tuple, idx),
            maltose::Expr::Set(tuple, idx, value) => hoisted::Expr::Set(tuple, idx, value),
            maltose::Expr::Lambda(params, body) => {
                let label = self.fresh.fresh("lambda.");
                let body = self.hoist_stmt(*body);
                self.functions
                    .insert(label.clone(), hoisted::Function { params, body });
                hoisted::Expr::Global(label)
            }
        }
    }

    fn hoist_stmt(&mut self, stmt: maltose::Stmt) -> hoisted::Stmt {
        stacker::maybe_grow(32 * 1024, 1024 * 1024, || match stmt {
            maltose::Stmt::Let(name, value, rest) => {
                let value = self.hoist_expr(value);
                hoisted::Stmt::Let(name, value, Box::new(self.hoist_stmt(*rest)))
            }
            maltose::Stmt::If(cond, then_, else_) => hoisted::Stmt::If(
                cond,
                Box::new(self.hoist_stmt(*then_)),
                Box::new(self.hoist_stmt(*else_)),
            ),
            maltose::Stmt::Apply(func, args) => hoisted::Stmt::Apply(func, args),
            maltose::Stmt::Halt(result) => hoisted::Stmt::Halt(result),
        })
    }
}

/// Moves every lambda into the program's function table. Only sound for closed lambdas.
pub fn hoist(
    program: maltose::Program,
    fresh: &mut FreshNames,
    progress: impl ProgressLogger,
) -> hoisted::Program {
    let progress = progress.start_session(None);

    let mut ctx = Context {
        fresh,
        functions: BTreeMap::new(),
    };
    let body = ctx.hoist_stmt(program.body);

    progress.finish();

    hoisted::Program {
        params: program.params,
        body,
        functions: ctx.functions,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use sucrose_common::data::maltose_ast::Atom;
    use sucrose_common::util::progress_logger::Hidden;

    fn var(name: &str) -> Atom {
        Atom::Var(name.to_owned())
    }

    #[test]
    fn test_nested_lambdas_are_flattened() {
        // (let (f (lambda (e k) (let (g (lambda (e r) (r 1))) (k g)))) (halt f))
        let inner = maltose::Expr::Lambda(
            vec!["e2".to_owned(), "r".to_owned()],
            Box::new(maltose::Stmt::Apply(var("r"), vec![Atom::Int(1)])),
        );
        let outer = maltose::Expr::Lambda(
            vec!["e1".to_owned(), "k".to_owned()],
            Box::new(maltose::Stmt::Let(
                "g".to_owned(),
                inner,
                Box::new(maltose::Stmt::Apply(var("k"), vec![var("g")])),
            )),
        );
        let program = maltose::Program {
            params: vec![],
            body: maltose::Stmt::Let(
                "f".to_owned(),
                outer,
                Box::new(maltose::Stmt::Halt(var("f"))),
            ),
        };

        let hoisted = hoist(program, &mut FreshNames::new(), Hidden);
        assert_eq!(
            hoisted.body,
            hoisted::Stmt::Let(
                "f".to_owned(),
                hoisted::Expr::Global("lambda.0".to_owned()),
                Box::new(hoisted::Stmt::Halt(var("f"))),
            )
        );

        let mut functions = BTreeMap::new();
        functions.insert(
            "lambda.0".to_owned(),
            hoisted::Function {
                params: vec!["e1".to_owned(), "k".to_owned()],
                body: hoisted::Stmt::Let(
                    "g".to_owned(),
                    hoisted::Expr::Global("lambda.1".to_owned()),
                    Box::new(hoisted::Stmt::Apply(var("k"), vec![var("g")])),
                ),
            },
        );
        functions.insert(
            "lambda.1".to_owned(),
            hoisted::Function {
                params: vec!["e2".to_owned(), "r".to_owned()],
                body: hoisted::Stmt::Apply(var("r"), vec![Atom::Int(1)]),
            },
        );
        assert_eq!(hoisted.functions, functions);
    }
}
