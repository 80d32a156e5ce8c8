use im_rc::HashMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::interpreter::store::{Store, Value};
use crate::interpreter::{
    alloc_tuple, check_arg_count, check_arity, eval_prim, get, set, Error, Evaluation,
    STACK_GROW_BYTES, STACK_RED_ZONE_BYTES,
};
use sucrose_common::data::kernel_ast::{Expr, Program};
use sucrose_common::data::prim::Const;

// Kernel variables are assignable, so every binding gets its own mutable slot which closures
// share with the scope that created them.
type Slot<'a> = Rc<RefCell<Value<Closure<'a>>>>;
type Env<'a> = HashMap<&'a str, Slot<'a>>;

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

fn slot(value: Val<'_>) -> Slot<'_> {
    Rc::new(RefCell::new(value))
}

struct Interpreter<'a> {
    store: Store<Closure<'a>>,
}

impl<'a> Interpreter<'a> {
    fn lookup(&self, env: &Env<'a>, name: &str) -> Result<Slot<'a>, Error> {
        env.get(name)
            .cloned()
            .ok_or_else(|| Error::UnboundVariable(name.to_owned()))
    }

    fn eval(&mut self, env: &Env<'a>, expr: &'a Expr) -> Result<Val<'a>, Error> {
        stacker::maybe_grow(STACK_RED_ZONE_BYTES, STACK_GROW_BYTES, || {
            self.eval_inner(env, expr)
        })
    }

    fn eval_inner(&mut self, env: &Env<'a>, expr: &'a Expr) -> Result<Val<'a>, Error> {
        Ok(match expr {
            Expr::Int(val) => Value::Int(*val),
            Expr::Bool(val) => Value::Bool(*val),
            Expr::Unit => Value::Unit,
            Expr::Var(name) => {
                let slot = self.lookup(env, name)?;
                let value = slot.borrow().clone();
                value
            }

            Expr::Prim(op, lhs, rhs) => {
                let lhs = self.eval(env, lhs)?;
                let rhs = self.eval(env, rhs)?;
                eval_prim(*op, &lhs, &rhs)?
            }

            Expr::Let(name, value, body) => {
                let value = self.eval(env, value)?;
                self.eval(&env.update(name.as_str(), slot(value)), body)?
            }

            Expr::If(cond, then_, else_) => {
                if self.eval(env, cond)?.as_bool()? {
                    self.eval(env, then_)?
                } else {
                    self.eval(env, else_)?
                }
            }

            Expr::Assign(name, value) => {
                let value = self.eval(env, value)?;
                *self.lookup(env, name)?.borrow_mut() = value;
                Value::Unit
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
                let items = items
                    .iter()
                    .map(|item| self.eval(env, item))
                    .collect::<Result<Vec<_>, _>>()?;
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
                let args = args
                    .iter()
                    .map(|arg| self.eval(env, arg))
                    .collect::<Result<Vec<_>, _>>()?;
                self.apply(func, args)?
            }
        })
    }

    fn apply(&mut self, func: Val<'a>, args: Vec<Val<'a>>) -> Result<Val<'a>, Error> {
        let closure = match func {
            Value::Function(closure) => closure,
            other => return Err(Error::NotAFunction(other.kind())),
        };
        check_arity(closure.params, &args)?;

        let mut env = closure.env;
        for (param, arg) in closure.params.iter().zip(args) {
            env.insert(param.as_str(), slot(arg));
        }
        self.eval(&env, closure.body)
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
        .map(|(param, arg)| (param.as_str(), slot(Value::from_const(*arg))))
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
