use sucrose_common::data::maltose_ast::{Expr, Program, Stmt};
use sucrose_common::data::monadic_ast as monadic;
use sucrose_common::data::monadic_ast::Atom;
use sucrose_common::data::prim::PrimOp;
use sucrose_common::util::fresh::FreshNames;
use sucrose_common::util::progress_logger::{ProgressLogger, ProgressSession};

/// What to do with the value of the expression being explicated.
enum Cont {
    /// Pass it to the continuation bound to this atom.
    Jump(Atom),
    /// Build the statement that consumes it.
    Build(Box<dyn FnOnce(&mut FreshNames, Atom) -> Stmt>),
}

impl Cont {
    fn build(consume: impl FnOnce(&mut FreshNames, Atom) -> Stmt + 'static) -> Self {
        Cont::Build(Box::new(consume))
    }

    fn halt() -> Self {
        Cont::build(|_, result| Stmt::Halt(result))
    }

    fn apply(self, fresh: &mut FreshNames, value: Atom) -> Stmt {
        match self {
            Cont::Jump(k) => Stmt::Apply(k, vec![value]),
            Cont::Build(consume) => consume(fresh, value),
        }
    }

    /// Makes the continuation available as an atom to `body`, binding it to a one-parameter
    /// lambda first unless it already is one.
    fn reify(self, fresh: &mut FreshNames, body: impl FnOnce(&mut FreshNames, Atom) -> Stmt) -> Stmt {
        match self {
            Cont::Jump(k) => body(fresh, k),
            Cont::Build(consume) => {
                let k = fresh.fresh("k.");
                let param = fresh.fresh("p.");
                let k_body = consume(fresh, Atom::Var(param.clone()));
                Stmt::Let(
                    k.clone(),
                    Expr::Lambda(vec![param], Box::new(k_body)),
                    Box::new(body(fresh, Atom::Var(k))),
                )
            }
        }
    }
}

// Whether evaluating `expr` only for its effects can be skipped.
fn is_pure(expr: &monadic::Expr) -> bool {
    match expr {
        monadic::Expr::Atom(_) | monadic::Expr::Get(_, _) | monadic::Expr::Lambda(_, _) => true,
        monadic::Expr::Prim(op, _, _) => *op != PrimOp::Div,
        _ => false,
    }
}

// Expressions which are already valid right-hand sides of a `Let` statement.
fn simple_expr(expr: monadic::Expr) -> Result<Expr, monadic::Expr> {
    match expr {
        monadic::Expr::Atom(atom) => Ok(Expr::Copy(atom)),
        monadic::Expr::Prim(op, lhs, rhs) => Ok(Expr::Prim(op, lhs, rhs)),
        monadic::Expr::Tuple(items) => Ok(Expr::Tuple(items)),
        monadic::Expr::Get(tuple, idx) => Ok(Expr::Get(tuple, idx)),
        monadic::Expr::Set(tuple, idx, value) => Ok(Expr::Set(tuple, idx, value)),
        other => Err(other),
    }
}

fn explicate_lambda(params: Vec<String>, body: monadic::Expr, fresh: &mut FreshNames) -> Expr {
    let ret = fresh.fresh("ret.");
    let body = explicate_expr(body, Cont::Jump(Atom::Var(ret.clone())), fresh);
    let mut params = params;
    params.push(ret);
    Expr::Lambda(params, Box::new(body))
}

fn explicate_expr(expr: monadic::Expr, cont: Cont, fresh: &mut FreshNames) -> Stmt {
    stacker::maybe_grow(32 * 1024, 1024 * 1024, || {
        explicate_expr_inner(expr, cont, fresh)
    })
}

fn explicate_expr_inner(expr: monadic::Expr, cont: Cont, fresh: &mut FreshNames) -> Stmt {
    use monadic::Expr as E;

    let expr = match simple_expr(expr) {
        Ok(Expr::Copy(atom)) => return cont.apply(fresh, atom),
        Ok(simple) => {
            let tmp = fresh.fresh("tmp.");
            let rest = cont.apply(fresh, Atom::Var(tmp.clone()));
            return Stmt::Let(tmp, simple, Box::new(rest));
        }
        Err(complex) => complex,
    };

    match expr {
        E::Let(name, value, body) => match simple_expr(*value) {
            Ok(simple) => Stmt::Let(name, simple, Box::new(explicate_expr(*body, cont, fresh))),
            Err(E::Lambda(params, lambda_body)) => {
                let lambda = explicate_lambda(params, *lambda_body, fresh);
                Stmt::Let(name, lambda, Box::new(explicate_expr(*body, cont, fresh)))
            }
            Err(complex) => explicate_expr(
                complex,
                Cont::build(move |fresh, value| {
                    let rest = explicate_expr(*body, cont, fresh);
                    Stmt::Let(name, Expr::Copy(value), Box::new(rest))
                }),
                fresh,
            ),
        },

        E::If(cond, then_, else_) => cont.reify(fresh, |fresh, k| {
            let then_ = explicate_expr(*then_, Cont::Jump(k.clone()), fresh);
            let else_ = explicate_expr(*else_, Cont::Jump(k), fresh);
            Stmt::If(cond, Box::new(then_), Box::new(else_))
        }),

        E::Lambda(params, body) => {
            let name = fresh.fresh("fn.");
            let lambda = explicate_lambda(params, *body, fresh);
            let rest = cont.apply(fresh, Atom::Var(name.clone()));
            Stmt::Let(name, lambda, Box::new(rest))
        }

        E::Apply(func, mut args) => cont.reify(fresh, |_, k| {
            args.push(k);
            Stmt::Apply(func, args)
        }),

        E::Do(effect, value) => {
            if is_pure(&effect) {
                explicate_expr(*value, cont, fresh)
            } else {
                explicate_expr(
                    *effect,
                    Cont::build(move |fresh, _| explicate_expr(*value, cont, fresh)),
                    fresh,
                )
            }
        }

        E::While(cond, body) => cont.reify(fresh, |fresh, k| explicate_while(*cond, *body, k, fresh)),

        E::Atom(_) | E::Prim(_, _, _) | E::Tuple(_) | E::Get(_, _) | E::Set(_, _, _) => {
            unreachable!("simple expressions are explicated above")
        }
    }
}

// The loop is a function of its exit continuation which calls itself through a cell after every
// iteration of the body.
fn explicate_while(
    cond: monadic::Expr,
    body: monadic::Expr,
    k: Atom,
    fresh: &mut FreshNames,
) -> Stmt {
    let cell = fresh.fresh("cell.");
    let loop_fn = fresh.fresh("loop.");
    let exit = fresh.fresh("ret.");
    let ignored = fresh.fresh("tmp.");

    let loop_cell = cell.clone();
    let loop_exit = exit.clone();
    let test = Cont::build(move |fresh, cond| {
        let again_exit = loop_exit.clone();
        let again = Cont::build(move |fresh, _| {
            let again = fresh.fresh("tmp.");
            Stmt::Let(
                again.clone(),
                Expr::Get(Atom::Var(loop_cell), 0),
                Box::new(Stmt::Apply(Atom::Var(again), vec![Atom::Var(again_exit)])),
            )
        });
        let then_ = explicate_expr(body, again, fresh);
        let else_ = Stmt::Apply(Atom::Var(loop_exit), vec![Atom::Unit]);
        Stmt::If(cond, Box::new(then_), Box::new(else_))
    });
    let loop_body = explicate_expr(cond, test, fresh);

    Stmt::Let(
        cell.clone(),
        Expr::Tuple(vec![Atom::Unit]),
        Box::new(Stmt::Let(
            loop_fn.clone(),
            Expr::Lambda(vec![exit], Box::new(loop_body)),
            Box::new(Stmt::Let(
                ignored,
                Expr::Set(Atom::Var(cell), 0, Atom::Var(loop_fn.clone())),
                Box::new(Stmt::Apply(Atom::Var(loop_fn), vec![k])),
            )),
        )),
    )
}

pub fn explicate_control(
    program: monadic::Program,
    fresh: &mut FreshNames,
    progress: impl ProgressLogger,
) -> Program {
    let progress = progress.start_session(None);
    let body = explicate_expr(program.body, Cont::halt(), fresh);
    progress.finish();

    Program {
        params: program.params,
        body,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use sucrose_common::util::progress_logger::Hidden;

    fn var(name: &str) -> Atom {
        Atom::Var(name.to_owned())
    }

    fn explicate(body: monadic::Expr) -> Stmt {
        let program = monadic::Program {
            params: vec!["x".to_owned()],
            body,
        };
        explicate_control(program, &mut FreshNames::new(), Hidden).body
    }

    #[test]
    fn test_prim_is_bound() {
        assert_eq!(
            explicate(monadic::Expr::Prim(PrimOp::Add, var("x"), Atom::Int(1))),
            Stmt::Let(
                "tmp.0".to_owned(),
                Expr::Prim(PrimOp::Add, var("x"), Atom::Int(1)),
                Box::new(Stmt::Halt(var("tmp.0"))),
            )
        );
    }

    #[test]
    fn test_if_shares_its_continuation() {
        // (let (y (if x 1 2)) y)
        let body = monadic::Expr::Let(
            "y".to_owned(),
            Box::new(monadic::Expr::If(
                var("x"),
                Box::new(monadic::Expr::Atom(Atom::Int(1))),
                Box::new(monadic::Expr::Atom(Atom::Int(2))),
            )),
            Box::new(monadic::Expr::Atom(var("y"))),
        );
        assert_eq!(
            explicate(body),
            Stmt::Let(
                "k.0".to_owned(),
                Expr::Lambda(
                    vec!["p.0".to_owned()],
                    Box::new(Stmt::Let(
                        "y".to_owned(),
                        Expr::Copy(var("p.0")),
                        Box::new(Stmt::Halt(var("y"))),
                    )),
                ),
                Box::new(Stmt::If(
                    var("x"),
                    Box::new(Stmt::Apply(var("k.0"), vec![Atom::Int(1)])),
                    Box::new(Stmt::Apply(var("k.0"), vec![Atom::Int(2)])),
                )),
            )
        );
    }

    #[test]
    fn test_zero_argument_call_gets_a_continuation() {
        // (let (f (lambda () 7)) (f))
        let body = monadic::Expr::Let(
            "f".to_owned(),
            Box::new(monadic::Expr::Lambda(
                vec![],
                Box::new(monadic::Expr::Atom(Atom::Int(7))),
            )),
            Box::new(monadic::Expr::Apply(var("f"), vec![])),
        );
        assert_eq!(
            explicate(body),
            Stmt::Let(
                "f".to_owned(),
                Expr::Lambda(
                    vec!["ret.0".to_owned()],
                    Box::new(Stmt::Apply(var("ret.0"), vec![Atom::Int(7)])),
                ),
                Box::new(Stmt::Let(
                    "k.0".to_owned(),
                    Expr::Lambda(vec!["p.0".to_owned()], Box::new(Stmt::Halt(var("p.0")))),
                    Box::new(Stmt::Apply(var("f"), vec![var("k.0")])),
                )),
            )
        );
    }

    #[test]
    fn test_tail_call_reuses_return_continuation() {
        // (lambda (g) (g 1))
        let body = monadic::Expr::Lambda(
            vec!["g".to_owned()],
            Box::new(monadic::Expr::Apply(var("g"), vec![Atom::Int(1)])),
        );
        assert_eq!(
            explicate(body),
            Stmt::Let(
                "fn.0".to_owned(),
                Expr::Lambda(
                    vec!["g".to_owned(), "ret.0".to_owned()],
                    Box::new(Stmt::Apply(var("g"), vec![Atom::Int(1), var("ret.0")])),
                ),
                Box::new(Stmt::Halt(var("fn.0"))),
            )
        );
    }

    #[test]
    fn test_pure_effects_are_dropped() {
        let body = monadic::Expr::Do(
            Box::new(monadic::Expr::Prim(PrimOp::Add, var("x"), Atom::Int(1))),
            Box::new(monadic::Expr::Atom(var("x"))),
        );
        assert_eq!(explicate(body), Stmt::Halt(var("x")));

        let body = monadic::Expr::Do(
            Box::new(monadic::Expr::Set(var("x"), 0, Atom::Int(1))),
            Box::new(monadic::Expr::Atom(var("x"))),
        );
        assert_eq!(
            explicate(body),
            Stmt::Let(
                "tmp.0".to_owned(),
                Expr::Set(var("x"), 0, Atom::Int(1)),
                Box::new(Stmt::Halt(var("x"))),
            )
        );
    }

    #[test]
    fn test_while_loop_runs_to_completion() {
        use crate::interpreter;
        use sucrose_common::data::prim::Const;

        // (let (c (tuple 0)) (begin (while (< (tuple-ref c 0) x) (tuple-set! c 0 (+ (tuple-ref c 0) 1))) (tuple-ref c 0)))
        let cond = monadic::Expr::Let(
            "a".to_owned(),
            Box::new(monadic::Expr::Get(var("c"), 0)),
            Box::new(monadic::Expr::Prim(PrimOp::LessThan, var("a"), var("x"))),
        );
        let body = monadic::Expr::Let(
            "b".to_owned(),
            Box::new(monadic::Expr::Get(var("c"), 0)),
            Box::new(monadic::Expr::Let(
                "b1".to_owned(),
                Box::new(monadic::Expr::Prim(PrimOp::Add, var("b"), Atom::Int(1))),
                Box::new(monadic::Expr::Set(var("c"), 0, var("b1"))),
            )),
        );
        let program = monadic::Program {
            params: vec!["x".to_owned()],
            body: monadic::Expr::Let(
                "c".to_owned(),
                Box::new(monadic::Expr::Tuple(vec![Atom::Int(0)])),
                Box::new(monadic::Expr::Do(
                    Box::new(monadic::Expr::While(Box::new(cond), Box::new(body))),
                    Box::new(monadic::Expr::Get(var("c"), 0)),
                )),
            ),
        };

        let cps = explicate_control(program.clone(), &mut FreshNames::new(), Hidden);
        let args = [Const::Int(10)];
        let expected = interpreter::monadic::interpret(&program, &args).unwrap();
        let actual = interpreter::maltose::interpret(&cps, &args).unwrap();
        assert_eq!(expected.result(), Some(Const::Int(10)));
        assert_eq!(actual.result(), expected.result());
    }
}
