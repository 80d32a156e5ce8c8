use rustc_hash::FxHashMap;

use crate::interpreter::store::{Store, Value};
use crate::interpreter::{
    alloc_tuple, check_arg_count, check_arity, eval_prim, get, set, Error, Evaluation,
};
use sucrose_common::data::hoisted_ast::{Atom, Expr, Program, Stmt};
use sucrose_common::data::prim::Const;

/// Functions are global, so a function value is just its label.
pub type Label<'a> = &'a str;

type Val<'a> = Value<Label<'a>>;

// Hoisted functions are closed, so a call starts from an empty environment.
type Env<'a> = FxHashMap<&'a str, Val<'a>>;

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
    program: &'a Program,
    store: &mut Store<Label<'a>>,
    env: &Env<'a>,
    expr: &Expr,
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
        Expr::Global(label) => match program.functions.get_key_value(label) {
            Some((label, _)) => Value::Function(label.as_str()),
            None => return Err(Error::UnknownGlobal(label.clone())),
        },
    })
}

pub fn interpret<'a>(
    program: &'a Program,
    args: &[Const],
) -> Result<Evaluation<Label<'a>>, Error> {
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
                let value = eval_expr(program, &mut store, &env, value)?;
                env.insert(name.as_str(), value);
                stmt = rest.as_ref();
            }

            Stmt::If(cond, then_, else_) => {
                stmt = if atom(&env, cond)?.as_bool()? {
                    then_.as_ref()
                } else {
                    else_.as_ref()
                };
            }

            Stmt::Apply(func, args) => {
                let label = match atom(&env, func)? {
                    Value::Function(label) => label,
                    other => return Err(Error::NotAFunction(other.kind())),
                };
                let function = program
                    .functions
                    .get(label)
                    .ok_or_else(|| Error::UnknownGlobal(label.to_owned()))?;
                let args = args
                    .iter()
                    .map(|arg| atom(&env, arg))
                    .collect::<Result<Vec<_>, _>>()?;
                check_arity(&function.params, &args)?;

                env = function
                    .params
                    .iter()
                    .map(String::as_str)
                    .zip(args)
                    .collect();
                stmt = &function.body;
            }

            Stmt::Halt(result) => {
                let value = atom(&env, result)?;
                return Ok(Evaluation { value, store });
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::BTreeMap;
    use sucrose_common::data::hoisted_ast::Function;
    use sucrose_common::data::prim::PrimOp;

    fn var(name: &str) -> Atom {
        Atom::Var(name.to_owned())
    }

    #[test]
    fn test_call_global() {
        let mut functions = BTreeMap::new();
        functions.insert(
            "fn.0".to_owned(),
            Function {
                params: vec!["x".to_owned(), "k".to_owned()],
                body: Stmt::Let(
                    "y".to_owned(),
                    Expr::Prim(PrimOp::Multiply, var("x"), Atom::Int(2)),
                    Box::new(Stmt::Apply(var("k"), vec![var("y")])),
                ),
            },
        );
        functions.insert(
            "fn.1".to_owned(),
            Function {
                params: vec!["r".to_owned()],
                body: Stmt::Halt(var("r")),
            },
        );
        let program = Program {
            params: vec!["a".to_owned()],
            body: Stmt::Let(
                "double".to_owned(),
                Expr::Global("fn.0".to_owned()),
                Box::new(Stmt::Let(
                    "done".to_owned(),
                    Expr::Global("fn.1".to_owned()),
                    Box::new(Stmt::Apply(var("double"), vec![var("a"), var("done")])),
                )),
            ),
            functions,
        };

        let evaluation = interpret(&program, &[Const::Int(21)]).unwrap();
        assert_eq!(evaluation.result(), Some(Const::Int(42)));
    }

    #[test]
    fn test_unknown_global() {
        let program = Program {
            params: vec![],
            body: Stmt::Let(
                "f".to_owned(),
                Expr::Global("fn.7".to_owned()),
                Box::new(Stmt::Halt(Atom::Unit)),
            ),
            functions: BTreeMap::new(),
        };
        assert_eq!(
            interpret(&program, &[]).unwrap_err(),
            Error::UnknownGlobal("fn.7".to_owned())
        );
    }
}
