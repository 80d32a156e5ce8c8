use im_rc::HashMap;
use std::fmt;

use crate::interpreter::store::{Store, Value};
use crate::interpreter::{
    alloc_tuple, check_arg_count, check_arity, eval_prim, get, set, Error, Evaluation,
    STACK_GROW_BYTES, STACK_RED_ZONE_BYTES,
};
use sucrose_common::data::cell_ast::{Expr, Program};
use sucrose_common::data::prim::Const;

type Env<'a> = HashMap<&'a str, Value<Closure<'a>>>;

#[derive(Clone)]
pub struct Closure<'a> {
    params: &'a [String],
    body: &'a Expr,
    env: Env<'a>,
}

impl fmt::Debug for Closure<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<closure ({})>", self.params.join(" "))
    }
}

type Val<'a> = Value<Closure<'a>>;

struct Interpreter<'a> {
    store: Store<Closure<'a>>,
}

impl<'a> Interpreter<'a> {
    fn eval(&mut self, env: &Env<'a>, expr: &'a Expr) -> Result<Val<'a>, Error> {
        stacker::maybe_grow(STACK_RED_ZONE_BYTES, STACK_GROW_BYTES, || {
            self.eval_inner(env, expr)
        })
    }

    fn eval_all(&mut self, env: &Env<'a>, exprs: &'a [Expr]) -> Result<Vec<Val<'a>>, Error> {
        exprs.iter().map(|expr| self.eval(env, expr)).collect()
    }

    fn eval_inner(&mut self, env: &Env<'a>, expr: &'a Expr) -> Result<Val<'a>, Error> {
        Ok(match expr {
            Expr::Int(val) => Value::Int(*val),
            Expr::Bool(val) => Value::Bool(*val),
            Expr::Unit => Value::Unit,
            Expr::Var(name) => env
                .get(name.as_str())
                .cloned()
                .ok_or_else(|| Error::UnboundVariable(name.clone()))?,

            Expr::Prim(op, lhs, rhs) => {
                let lhs = self.eval(env, lhs)?;
                let rhs = self.eval(env, rhs)?;
                eval_prim(*op, &lhs, &rhs)?
            }

            Expr::Let(name, value, body) => {
                let value = self.eval(env, value)?;
                self.eval(&env.update(name.as_str(), value), body)?
            }

            Expr::If(cond, then_, else_) => {
                if self.eval(env, cond)?.as_bool()? {
                    self.eval(env, then_)?
                } else {
                    self.eval(env, else_)?
                }
            }

            Expr::While(cond, body) => {
                while self.eval(env, cond)?.as_bool()? {
                    self.eval(env, body)?;
                }
                Value::Unit
            }

            Expr::Do(effect, value) => {
                self.eval(env, effect)?;
                self.eval(env, value)?
            }

            Expr::Tuple(items) => {
                let items = self.eval_all(env, items)?;
                alloc_tuple(&mut self.store, items)
            }

            Expr::Get(tuple, idx) => {
                let tuple = self.eval(env, tuple)?;
                get(&self.store, &tuple, *idx)?
            }

            Expr::Set(tuple, idx, value) => {
                let tuple = self.eval(env, tuple)?;
                let value = self.eval(env, value)?;
                set(&mut self.store, &tuple, *idx, value)?
            }

            Expr::Lambda(params, body) => Value::Function(Closure {
                params,
                body,
                env: env.clone(),
            }),

            Expr::Apply(func, args) => {
                let func = self.eval(env, func)?;
                let args = self.eval_all(env, args)?;
                let closure = match func {
                    Value::Function(closure) => closure,
                    other => return Err(Error::NotAFunction(other.kind())),
                };
                check_arity(closure.params, &args)?;

                let mut inner = closure.env;
                for (param, arg) in closure.params.iter().zip(args) {
                    inner.insert(param.as_str(), arg);
                }
                self.eval(&inner, closure.body)?
            }
        })
    }
}

pub fn interpret<'a>(
    program: &'a Program,
    args: &[Const],
) -> Result<Evaluation<Closure<'a>>, Error> {
    check_arg_count(&program.params, args)?;

    let env = program
        .params
        .iter()
        .zip(args)
        .map(|(param, arg)| (param.as_str(), Value::from_const(*arg)))
        .collect::<Env>();

    let mut interpreter = Interpreter {
        store: Store::new(),
    };
    let value = interpreter.eval(&env, &program.body)?;

    Ok(Evaluation {
        value,
        store: interpreter.store,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use sucrose_common::data::prim::PrimOp;

    fn var(name: &str) -> Expr {
        Expr::Var(name.to_owned())
    }

    #[test]
    fn test_cells_live_in_the_store() {
        // (program (x) (let (x (tuple x)) (begin (tuple-set! x 0 (+ (tuple-ref x 0) 1)) (tuple-ref x 0))))
        let read = || Expr::Get(Box::new(var("x")), 0);
        let program = Program {
            params: vec!["x".to_owned()],
            body: Expr::Let(
                "x".to_owned(),
                Box::new(Expr::Tuple(vec![var("x")])),
                Box::new(Expr::Do(
                    Box::new(Expr::Set(
                        Box::new(var("x")),
                        0,
                        Box::new(Expr::Prim(
                            PrimOp::Add,
                            Box::new(read()),
                            Box::new(Expr::Int(1)),
                        )),
                    )),
                    Box::new(read()),
                )),
            ),
        };

        let evaluation = interpret(&program, &[Const::Int(41)]).unwrap();
        assert_eq!(evaluation.result(), Some(Const::Int(42)));

        let blocks = evaluation.store.blocks().collect::<Vec<_>>();
        assert_eq!(blocks.len(), 1);
        let contents = evaluation.store.block(blocks[0].0).unwrap();
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0].to_const(), Some(Const::Int(42)));
    }

    #[test]
    fn test_unbound_variable() {
        let program = Program {
            params: vec![],
            body: var("y"),
        };
        assert_eq!(
            interpret(&program, &[]).unwrap_err(),
            Error::UnboundVariable("y".to_owned())
        );
    }
}
