use im_rc::HashMap;
use std::fmt;

use crate::interpreter::store::{Store, Value};
use crate::interpreter::{
    alloc_tuple, check_arg_count, check_arity, eval_prim, get, set, Error, Evaluation,
};
use sucrose_common::data::maltose_ast::{Atom, Expr, Program, Stmt};
use sucrose_common::data::prim::Const;

type Env<'a> = HashMap<&'a str, Value<Closure<'a>>>;

#[derive(Clone)]
pub struct Closure<'a> {
    params: &'a [String],
    body: &'a Stmt,
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

fn eval_expr<'a>(
    store: &mut Store<Closure<'a>>,
    env: &Env<'a>,
    expr: &'a Expr,
) -> Result<Val<'a>, Error> {
    Ok(match expr {
        Expr::Copy(arg) => atom(env, arg)?,
        Expr::Prim(op, lhs, rhs) => eval_prim(*op, &atom(env, lhs)?, &atom(env, rhs)?)?,
        Expr::Tuple(items) => {
            let items = items
                .iter()
                .map(|item| atom(env, item))
                .collect::<Result<Vec<_>, _>>()?;
            alloc_tuple(store, items)
        }
        Expr::Get(tuple, idx) => get(store, &atom(env, tuple)?, *idx)?,
        Expr::Set(tuple, idx, value) => {
            let tuple = atom(env, tuple)?;
            set(store, &tuple, *idx, atom(env, value)?)?
        }
        Expr::Lambda(params, body) => Value::Function(Closure {
            params,
            body,
            env: env.clone(),
        }),
    })
}

/// Runs a CPS program. No statement returns to its caller, so evaluation is a single loop that
/// jumps from one statement to the next and never grows the Rust stack.
pub fn interpret<'a>(
    program: &'a Program,
    args: &[Const],
) -> Result<Evaluation<Closure<'a>>, Error> {
    check_arg_count(&program.params, args)?;

    let mut env = program
        .params
        .iter()
        .zip(args)
        .map(|(param, arg)| (param.as_str(), Value::from_const(*arg)))
        .collect::<Env>();
    let mut store = Store::new();
    let mut stmt = &program.body;

    loop {
        match stmt {
            Stmt::Let(name, value, rest) => {
                let value = eval_expr(&mut store, &env, value)?;
                env.insert(name.as_str(), value);
                stmt = rest;
            }

            Stmt::If(cond, then_, else_) => {
                stmt = if atom(&env, cond)?.as_bool()? {
                    then_.as_ref()
                } else {
                    else_.as_ref()
                };
            }

            Stmt::Apply(func, args) => {
                let closure = match atom(&env, func)? {
                    Value::Function(closure) => closure,
                    other => return Err(Error::NotAFunction(other.kind())),
                };
                let args = args
                    .iter()
                    .map(|arg| atom(&env, arg))
                    .collect::<Result<Vec<_>, _>>()?;
                check_arity(closure.params, &args)?;

                env = closure.env;
                for (param, arg) in closure.params.iter().zip(args) {
                    env.insert(param.as_str(), arg);
                }
                stmt = closure.body;
            }

            Stmt::Halt(result) => {
                let value = atom(&env, result)?;
                return Ok(Evaluation { value, store });
            }
        }
    }
}
