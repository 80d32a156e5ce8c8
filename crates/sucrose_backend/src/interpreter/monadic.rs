use im_rc::HashMap;
use std::fmt;

use crate::interpreter::store::{Store, Value};
use crate::interpreter::{
    alloc_tuple, check_arg_count, check_arity, eval_prim, get, set, Error, Evaluation,
    STACK_GROW_BYTES, STACK_RED_ZONE_BYTES,
};
use sucrose_common::data::monadic_ast::{Atom, Expr, Program};
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

fn atom<'a>(env: &Env<'a>, atom: &Atom) -> Result<Val<'a>, Error> {
    Ok(match atom {
        Atom::Int(val) => Value::Int(*val),
        Atom::Bool(val) => Value::Bool(*val),
        Atom::Unit => Value::Unit,
        Atom::Var(name) => env
            .get(name.as_str())
            .cloned()
            .ok_or_else(|| Error::UnboundVariable(name.clone()))?,
    })
}

fn atoms<'a>(env: &Env<'a>, atoms: &[Atom]) -> Result<Vec<Val<'a>>, Error> {
    atoms.iter().map(|arg| atom(env, arg)).collect()
}

struct Interpreter<'a> {
    store: Store<Closure<'a>>,
}

impl<'a> Interpreter<'a> {
    fn eval(&mut self, env: &Env<'a>, expr: &'a Expr) -> Result<Val<'a>, Error> {
        stacker::maybe_grow(STACK_RED_ZONE_BYTES, STACK_GROW_BYTES, || {
            self.eval_inner(env, expr)
        })
    }

    fn eval_inner(&mut self, env: &Env<'a>, expr: &'a Expr) -> Result<Val<'a>, Error> {
        Ok(match expr {
            Expr::Atom(arg) => atom(env, arg)?,
            Expr::Prim(op, lhs, rhs) => eval_prim(*op, &atom(env, lhs)?, &atom(env, rhs)?)?,

            Expr::Let(name, value, body) => {
                let value = self.eval(env, value)?;
                self.eval(&env.update(name.as_str(), value), body)?
            }

            Expr::If(cond, then_, else_) => {
                if atom(env, cond)?.as_bool()? {
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
                let items = atoms(env, items)?;
                alloc_tuple(&mut self.store, items)
            }
            Expr::Get(tuple, idx) => get(&self.store, &atom(env, tuple)?, *idx)?,
            Expr::Set(tuple, idx, value) => {
                let tuple = atom(env, tuple)?;
                set(&mut self.store, &tuple, *idx, atom(env, value)?)?
            }

            Expr::Lambda(params, body) => Value::Function(Closure {
                params,
                body,
                env: env.clone(),
            }),

            Expr::Apply(func, args) => {
                let closure = match atom(env, func)? {
                    Value::Function(closure) => closure,
                    other => return Err(Error::NotAFunction(other.kind())),
                };
                let args = atoms(env, args)?;
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

    fn var(name: &str) -> Atom {
        Atom::Var(name.to_owned())
    }

    #[test]
    fn test_while_reevaluates_condition() {
        // (let (c (tuple 0)) (begin (while (< (tuple-ref c 0) 3) (tuple-set! c 0 (+ (tuple-ref c 0) 1))) (tuple-ref c 0)))
        let cond = Expr::Let(
            "a".to_owned(),
            Box::new(Expr::Get(var("c"), 0)),
            Box::new(Expr::Prim(PrimOp::LessThan, var("a"), Atom::Int(3))),
        );
        let body = Expr::Let(
            "b".to_owned(),
            Box::new(Expr::Get(var("c"), 0)),
            Box::new(Expr::Let(
                "b1".to_owned(),
                Box::new(Expr::Prim(PrimOp::Add, var("b"), Atom::Int(1))),
                Box::new(Expr::Set(var("c"), 0, var("b1"))),
            )),
        );
        let program = Program {
            params: vec![],
            body: Expr::Let(
                "c".to_owned(),
                Box::new(Expr::Tuple(vec![Atom::Int(0)])),
                Box::new(Expr::Do(
                    Box::new(Expr::While(Box::new(cond), Box::new(body))),
                    Box::new(Expr::Get(var("c"), 0)),
                )),
            ),
        };

        let evaluation = interpret(&program, &[]).unwrap();
        assert_eq!(evaluation.result(), Some(Const::Int(3)));
    }
}
