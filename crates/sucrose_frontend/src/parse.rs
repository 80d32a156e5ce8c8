use std::collections::BTreeSet;
use std::iter::Peekable;
use thiserror::Error;

use crate::lex::{self, Lexer, Token};
use sucrose_common::data::sugar_ast::{ArithOp, Comparison, Define, Expr, Pattern, Program};
use sucrose_common::report_error::Locate;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("{0}")]
    Lex(lex::Error),
    #[error("The file ended before every '(' was closed.")]
    UnexpectedEof,
    #[error("This ')' does not close any '('.")]
    UnexpectedCloseParen,
    #[error("A program consists of exactly one (program ...) form, but more input follows it.")]
    TrailingInput,
    #[error("Expected a name here.")]
    ExpectedName,
    #[error("`{0}` is a reserved word and cannot be used as a name.")]
    ReservedName(String),
    #[error("The name `{0}` is bound more than once in the same parameter list.")]
    DuplicateName(String),
    #[error("Malformed `{form}` form. Expected {usage}")]
    BadForm { form: String, usage: &'static str },
    #[error("Expected a non-negative tuple index.")]
    BadIndex,
    #[error("An application needs at least a function: `()` is not an expression.")]
    EmptyApplication,
    #[error("Unrecognized pattern.")]
    BadPattern,
}

pub type Error = Locate<ErrorKind>;

#[derive(Clone, Debug)]
enum DatumKind {
    Int(i64),
    Symbol(String),
    List(Vec<Datum>),
}

#[derive(Clone, Debug)]
struct Datum {
    kind: DatumKind,
    lo: usize,
    hi: usize,
}

impl Datum {
    fn error(&self, kind: ErrorKind) -> Error {
        Locate {
            path: None,
            span: Some((self.lo, self.hi)),
            error: kind,
        }
    }

    fn bad_form(&self, form: &str, usage: &'static str) -> Error {
        self.error(ErrorKind::BadForm {
            form: form.to_owned(),
            usage,
        })
    }

    fn as_symbol(&self) -> Option<&str> {
        match &self.kind {
            DatumKind::Symbol(name) => Some(name),
            _ => None,
        }
    }

    fn as_list(&self) -> Option<&[Datum]> {
        match &self.kind {
            DatumKind::List(items) => Some(items),
            _ => None,
        }
    }
}

const RESERVED: &[&str] = &[
    "program", "define", "let", "let*", "letrec", "if", "cond", "else", "set!", "while", "begin",
    "tuple", "tuple-ref", "tuple-set!", "lambda", "match", "true", "false", "unit", "not", "and",
    "or", "+", "-", "*", "/", "<", "<=", "=", ">", ">=", "_",
];

fn located(lo: usize, hi: usize, kind: ErrorKind) -> Error {
    Locate {
        path: None,
        span: Some((lo, hi)),
        error: kind,
    }
}

fn read_datum(tokens: &mut Peekable<Lexer>, eof: usize) -> Result<Datum, Error> {
    let (lo, tok, hi) = match tokens.next() {
        None => return Err(located(eof, eof, ErrorKind::UnexpectedEof)),
        Some(Err(err)) => {
            let (lo, hi) = match err {
                lex::Error::UnrecognizedToken(pos) => (pos, pos + 1),
                lex::Error::IntOutOfRange(lo, hi) => (lo, hi),
            };
            return Err(located(lo, hi, ErrorKind::Lex(err)));
        }
        Some(Ok(tok)) => tok,
    };

    let kind = match tok {
        Token::IntLit(val) => DatumKind::Int(val),
        Token::Symbol(name) => DatumKind::Symbol(name),
        Token::RParen => return Err(located(lo, hi, ErrorKind::UnexpectedCloseParen)),
        Token::LParen => {
            let mut items = Vec::new();
            loop {
                if let Some(Ok((_, Token::RParen, close_hi))) = tokens.peek() {
                    let close_hi = *close_hi;
                    tokens.next();
                    return Ok(Datum {
                        kind: DatumKind::List(items),
                        lo,
                        hi: close_hi,
                    });
                }
                items.push(read_datum(tokens, eof)?);
            }
        }
    };

    Ok(Datum { kind, lo, hi })
}

fn parse_name(datum: &Datum) -> Result<String, Error> {
    match datum.as_symbol() {
        Some(name) if RESERVED.contains(&name) => {
            Err(datum.error(ErrorKind::ReservedName(name.to_owned())))
        }
        Some(name) => Ok(name.to_owned()),
        None => Err(datum.error(ErrorKind::ExpectedName)),
    }
}

fn parse_params(datum: &Datum) -> Result<Vec<String>, Error> {
    let items = datum.as_list().ok_or_else(|| datum.error(ErrorKind::ExpectedName))?;
    let mut seen = BTreeSet::new();
    items
        .iter()
        .map(|item| {
            let name = parse_name(item)?;
            if !seen.insert(name.clone()) {
                return Err(item.error(ErrorKind::DuplicateName(name)));
            }
            Ok(name)
        })
        .collect()
}

// `(name value)`
fn parse_binding(datum: &Datum, form: &str, usage: &'static str) -> Result<(String, Expr), Error> {
    match datum.as_list() {
        Some([name, value]) => Ok((parse_name(name)?, parse_expr(value)?)),
        _ => Err(datum.bad_form(form, usage)),
    }
}

fn parse_body(items: &[Datum]) -> Result<Expr, Error> {
    let mut exprs = items.iter().map(parse_expr).collect::<Result<Vec<_>, _>>()?;
    if exprs.len() == 1 {
        Ok(exprs.remove(0))
    } else {
        Ok(Expr::Begin(exprs))
    }
}

fn parse_index(datum: &Datum) -> Result<usize, Error> {
    match datum.kind {
        DatumKind::Int(val) => usize::try_from(val).map_err(|_| datum.error(ErrorKind::BadIndex)),
        _ => Err(datum.error(ErrorKind::BadIndex)),
    }
}

fn parse_pattern(datum: &Datum) -> Result<Pattern, Error> {
    match &datum.kind {
        DatumKind::Int(val) => Ok(Pattern::Int(*val)),
        DatumKind::Symbol(name) => match name.as_str() {
            "_" => Ok(Pattern::Any),
            "true" => Ok(Pattern::Bool(true)),
            "false" => Ok(Pattern::Bool(false)),
            _ => Ok(Pattern::Var(parse_name(datum)?)),
        },
        DatumKind::List(items) => match items.split_first() {
            Some((head, rest)) if head.as_symbol() == Some("tuple") => Ok(Pattern::Tuple(
                rest.iter().map(parse_pattern).collect::<Result<_, _>>()?,
            )),
            _ => Err(datum.error(ErrorKind::BadPattern)),
        },
    }
}

fn arith_op(name: &str) -> Option<ArithOp> {
    match name {
        "+" => Some(ArithOp::Add),
        "-" => Some(ArithOp::Subtract),
        "*" => Some(ArithOp::Multiply),
        "/" => Some(ArithOp::Div),
        _ => None,
    }
}

fn comparison(name: &str) -> Option<Comparison> {
    match name {
        "<" => Some(Comparison::Less),
        "<=" => Some(Comparison::LessEqual),
        "=" => Some(Comparison::Equal),
        ">" => Some(Comparison::Greater),
        ">=" => Some(Comparison::GreaterEqual),
        _ => None,
    }
}

fn parse_exprs(items: &[Datum]) -> Result<Vec<Expr>, Error> {
    items.iter().map(parse_expr).collect()
}

fn parse_expr(datum: &Datum) -> Result<Expr, Error> {
    stacker::maybe_grow(32 * 1024, 1024 * 1024, || parse_expr_inner(datum))
}

fn parse_expr_inner(datum: &Datum) -> Result<Expr, Error> {
    let items = match &datum.kind {
        DatumKind::Int(val) => return Ok(Expr::Int(*val)),
        DatumKind::Symbol(name) => {
            return match name.as_str() {
                "true" => Ok(Expr::Bool(true)),
                "false" => Ok(Expr::Bool(false)),
                "unit" => Ok(Expr::Unit),
                _ => Ok(Expr::Var(parse_name(datum)?)),
            }
        }
        DatumKind::List(items) => items,
    };

    let (head, args) = items
        .split_first()
        .ok_or_else(|| datum.error(ErrorKind::EmptyApplication))?;

    let form = match head.as_symbol() {
        Some(form) if RESERVED.contains(&form) => form,
        _ => {
            return Ok(Expr::Apply(Box::new(parse_expr(head)?), parse_exprs(args)?));
        }
    };

    if let Some(op) = arith_op(form) {
        if args.is_empty() && matches!(op, ArithOp::Subtract | ArithOp::Div) {
            return Err(datum.bad_form(form, "at least one operand."));
        }
        return Ok(Expr::Arith(op, parse_exprs(args)?));
    }

    if let Some(cmp) = comparison(form) {
        return Ok(Expr::Compare(cmp, parse_exprs(args)?));
    }

    match (form, args) {
        ("not", [arg]) => Ok(Expr::Not(Box::new(parse_expr(arg)?))),
        ("and", _) => Ok(Expr::And(parse_exprs(args)?)),
        ("or", _) => Ok(Expr::Or(parse_exprs(args)?)),

        ("let", [binding, body @ ..]) if !body.is_empty() => {
            let (name, value) = parse_binding(binding, form, LET_USAGE)?;
            Ok(Expr::Let(name, Box::new(value), Box::new(parse_body(body)?)))
        }
        ("let*", [bindings, body @ ..]) if !body.is_empty() => {
            let bindings = bindings
                .as_list()
                .ok_or_else(|| datum.bad_form(form, LET_STAR_USAGE))?
                .iter()
                .map(|binding| parse_binding(binding, form, LET_STAR_USAGE))
                .collect::<Result<_, _>>()?;
            Ok(Expr::LetStar(bindings, Box::new(parse_body(body)?)))
        }
        ("letrec", [binding, body @ ..]) if !body.is_empty() => {
            let (name, value) = parse_binding(binding, form, LETREC_USAGE)?;
            Ok(Expr::LetRec(name, Box::new(value), Box::new(parse_body(body)?)))
        }

        ("if", [cond, then_, else_]) => Ok(Expr::If(
            Box::new(parse_expr(cond)?),
            Box::new(parse_expr(then_)?),
            Box::new(parse_expr(else_)?),
        )),
        ("cond", clauses) => parse_cond(datum, clauses),
        ("match", [scrutinee, arms @ ..]) => {
            let arms = arms
                .iter()
                .map(|arm| match arm.as_list() {
                    Some([pattern, body @ ..]) if !body.is_empty() => {
                        Ok((parse_pattern(pattern)?, parse_body(body)?))
                    }
                    _ => Err(arm.bad_form("match", MATCH_USAGE)),
                })
                .collect::<Result<_, _>>()?;
            Ok(Expr::Match(Box::new(parse_expr(scrutinee)?), arms))
        }

        ("set!", [name, value]) => Ok(Expr::Assign(
            parse_name(name)?,
            Box::new(parse_expr(value)?),
        )),
        ("while", [cond, body @ ..]) if !body.is_empty() => Ok(Expr::While(
            Box::new(parse_expr(cond)?),
            Box::new(parse_body(body)?),
        )),
        ("begin", _) => Ok(Expr::Begin(parse_exprs(args)?)),

        ("tuple", _) => Ok(Expr::Tuple(parse_exprs(args)?)),
        ("tuple-ref", [tuple, idx]) => Ok(Expr::Get(
            Box::new(parse_expr(tuple)?),
            parse_index(idx)?,
        )),
        ("tuple-set!", [tuple, idx, value]) => Ok(Expr::Set(
            Box::new(parse_expr(tuple)?),
            parse_index(idx)?,
            Box::new(parse_expr(value)?),
        )),

        ("lambda", [params, body @ ..]) if !body.is_empty() => Ok(Expr::Lambda(
            parse_params(params)?,
            Box::new(parse_body(body)?),
        )),

        _ => Err(datum.bad_form(form, usage(form))),
    }
}

const LET_USAGE: &str = "(let (name value) body...)";
const LET_STAR_USAGE: &str = "(let* ((name value)...) body...)";
const LETREC_USAGE: &str = "(letrec (name value) body...)";
const MATCH_USAGE: &str = "(match scrutinee (pattern body...)...)";

fn usage(form: &str) -> &'static str {
    match form {
        "not" => "(not expr)",
        "let" => LET_USAGE,
        "let*" => LET_STAR_USAGE,
        "letrec" => LETREC_USAGE,
        "if" => "(if cond then else)",
        "match" => MATCH_USAGE,
        "set!" => "(set! name value)",
        "while" => "(while cond body...)",
        "tuple-ref" => "(tuple-ref tuple index)",
        "tuple-set!" => "(tuple-set! tuple index value)",
        "lambda" => "(lambda (params...) body...)",
        "define" => "(define name value) at the top of a program",
        "program" => "(program (params...) (define name value)... body...) at the top level",
        _ => "an expression, but found a keyword",
    }
}

fn parse_cond(datum: &Datum, clauses: &[Datum]) -> Result<Expr, Error> {
    const COND_USAGE: &str = "(cond (test body...)... (else body...))";

    let mut arms = Vec::new();
    let mut default = Expr::Unit;
    for (i, clause) in clauses.iter().enumerate() {
        match clause.as_list() {
            Some([test, body @ ..]) if !body.is_empty() => {
                if test.as_symbol() == Some("else") {
                    if i + 1 != clauses.len() {
                        return Err(clause.bad_form("cond", COND_USAGE));
                    }
                    default = parse_body(body)?;
                } else {
                    arms.push((parse_expr(test)?, parse_body(body)?));
                }
            }
            _ => return Err(datum.bad_form("cond", COND_USAGE)),
        }
    }
    Ok(Expr::Cond(arms, Box::new(default)))
}

fn parse_define(datum: &Datum) -> Result<Option<Define>, Error> {
    const DEFINE_USAGE: &str = "(define name value) or (define (name params...) body...)";

    let items = match datum.as_list() {
        Some(items) if items.first().and_then(Datum::as_symbol) == Some("define") => items,
        _ => return Ok(None),
    };

    match &items[1..] {
        [name, value] if name.as_symbol().is_some() => Ok(Some(Define {
            name: parse_name(name)?,
            value: parse_expr(value)?,
        })),
        // Function shorthand
        [signature, body @ ..] if !body.is_empty() => match signature.as_list() {
            Some([name, params @ ..]) => {
                let params_datum = Datum {
                    kind: DatumKind::List(params.to_vec()),
                    lo: signature.lo,
                    hi: signature.hi,
                };
                Ok(Some(Define {
                    name: parse_name(name)?,
                    value: Expr::Lambda(
                        parse_params(&params_datum)?,
                        Box::new(parse_body(body)?),
                    ),
                }))
            }
            _ => Err(datum.bad_form("define", DEFINE_USAGE)),
        },
        _ => Err(datum.bad_form("define", DEFINE_USAGE)),
    }
}

pub fn parse_program(src: &str) -> Result<Program, Error> {
    const PROGRAM_USAGE: &str = "(program (params...) (define name value)... body...)";

    let mut tokens = Lexer::new(src).peekable();
    let datum = read_datum(&mut tokens, src.len())?;
    if let Some(extra) = tokens.next() {
        let (lo, hi) = match extra {
            Ok((lo, _, hi)) => (lo, hi),
            Err(_) => (src.len(), src.len()),
        };
        return Err(located(lo, hi, ErrorKind::TrailingInput));
    }

    let (params, rest) = match datum.as_list() {
        Some([head, params, rest @ ..]) if head.as_symbol() == Some("program") => (params, rest),
        _ => return Err(datum.bad_form("program", PROGRAM_USAGE)),
    };

    let params = parse_params(params)?;

    let mut defines = Vec::new();
    let mut body_start = 0;
    for item in rest {
        match parse_define(item)? {
            Some(define) => {
                defines.push(define);
                body_start += 1;
            }
            None => break,
        }
    }

    let body = &rest[body_start..];
    if body.is_empty() {
        return Err(datum.bad_form("program", PROGRAM_USAGE));
    }

    Ok(Program {
        params,
        defines,
        body: parse_body(body)?,
    })
}
