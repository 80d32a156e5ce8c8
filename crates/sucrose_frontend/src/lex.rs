use std::fmt;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum Error {
    #[error("Unrecognized token at position {0}")]
    UnrecognizedToken(usize),
    #[error("Integer literal at position {0} does not fit in 64 bits")]
    IntOutOfRange(usize, usize),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    LParen,
    RParen,
    IntLit(i64),
    Symbol(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::IntLit(val) => write!(f, "{}", val),
            Token::Symbol(name) => write!(f, "{}", name),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Lexer { src, pos: 0 }
    }
}

fn char_at(src: &str, pos: usize) -> Option<char> {
    src[pos..].chars().next()
}

fn next_pos(pos: usize, src: &str) -> usize {
    pos + char_at(src, pos).map_or(0, char::len_utf8)
}

fn consume_comment(mut pos: usize, src: &str) -> Option<usize> {
    if char_at(src, pos)? != ';' {
        return None;
    }

    while let Some(c) = char_at(src, pos) {
        pos = next_pos(pos, src);
        if c == '\n' {
            break;
        }
    }

    Some(pos)
}

fn consume_whitespace(mut pos: usize, src: &str) -> Option<usize> {
    if !char_at(src, pos)?.is_whitespace() {
        return None;
    }

    while let Some(c) = char_at(src, pos) {
        if !c.is_whitespace() {
            break;
        }
        pos = next_pos(pos, src);
    }

    Some(pos)
}

fn skip_invisibles(mut pos: usize, src: &str) -> usize {
    loop {
        match (consume_comment(pos, src), consume_whitespace(pos, src)) {
            (None, None) => return pos,
            (Some(after_comment), _) => pos = after_comment,
            (_, Some(after_whitespace)) => pos = after_whitespace,
        }
    }
}

// No '.': the compiler reserves it for the names it generates.
fn is_symbol_char(c: char) -> bool {
    c.is_alphanumeric() || "+-*/<>=!?_".contains(c)
}

fn consume_atom(mut pos: usize, src: &str) -> Option<usize> {
    if !is_symbol_char(char_at(src, pos)?) {
        return None;
    }

    while let Some(c) = char_at(src, pos) {
        if !is_symbol_char(c) {
            break;
        }
        pos = next_pos(pos, src);
    }

    Some(pos)
}

fn is_int_literal(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<(usize, Token, usize), Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.pos = skip_invisibles(self.pos, self.src);

        let start = self.pos;
        match char_at(self.src, start)? {
            '(' => {
                self.pos += 1;
                return Some(Ok((start, Token::LParen, self.pos)));
            }
            ')' => {
                self.pos += 1;
                return Some(Ok((start, Token::RParen, self.pos)));
            }
            _ => {}
        }

        let Some(end) = consume_atom(start, self.src) else {
            return Some(Err(Error::UnrecognizedToken(start)));
        };
        let text = &self.src[start..end];

        if is_int_literal(text) {
            self.pos = end;
            return Some(match text.parse() {
                Ok(val) => Ok((start, Token::IntLit(val), end)),
                Err(_) => Err(Error::IntOutOfRange(start, end)),
            });
        }

        // Names may not start with a digit, so `12abc` is rejected instead of splitting.
        if text.starts_with(|c: char| c.is_ascii_digit()) {
            return Some(Err(Error::UnrecognizedToken(start)));
        }

        self.pos = end;
        Some(Ok((start, Token::Symbol(text.to_owned()), end)))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn tokens(src: &str) -> Result<Vec<Token>, Error> {
        Lexer::new(src)
            .map(|result| result.map(|(_, tok, _)| tok))
            .collect()
    }

    #[test]
    fn test_lex_program() {
        let toks = tokens("(program (x) ; the counter\n  (+ x -12))").unwrap();
        assert_eq!(
            toks,
            vec![
                Token::LParen,
                Token::Symbol("program".to_owned()),
                Token::LParen,
                Token::Symbol("x".to_owned()),
                Token::RParen,
                Token::LParen,
                Token::Symbol("+".to_owned()),
                Token::Symbol("x".to_owned()),
                Token::IntLit(-12),
                Token::RParen,
                Token::RParen,
            ]
        );
    }

    #[test]
    fn test_lex_operators_are_symbols() {
        let toks = tokens("- <= set! tuple-set!").unwrap();
        assert_eq!(
            toks,
            vec![
                Token::Symbol("-".to_owned()),
                Token::Symbol("<=".to_owned()),
                Token::Symbol("set!".to_owned()),
                Token::Symbol("tuple-set!".to_owned()),
            ]
        );
    }

    #[test]
    fn test_lex_errors() {
        assert_eq!(tokens("x.0"), Err(Error::UnrecognizedToken(1)));
        assert_eq!(tokens("(a %b)"), Err(Error::UnrecognizedToken(3)));
        assert_eq!(tokens("12abc"), Err(Error::UnrecognizedToken(0)));
        assert_eq!(
            tokens("99999999999999999999"),
            Err(Error::IntOutOfRange(0, 20))
        );
    }
}
