use std::io::{self, Write};

const TAB_SIZE: usize = 2;
const LINE_WIDTH: usize = 80;

/// Every dialect prints as an s-expression. Printers build one of these and hand it to `write`,
/// which decides where lines break.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SExp {
    Atom(String),
    List(Vec<SExp>),
}

impl SExp {
    pub fn atom(text: impl ToString) -> Self {
        SExp::Atom(text.to_string())
    }

    pub fn list(items: impl IntoIterator<Item = SExp>) -> Self {
        SExp::List(items.into_iter().collect())
    }

    /// `(head items...)`
    pub fn form(head: &str, items: impl IntoIterator<Item = SExp>) -> Self {
        SExp::List(std::iter::once(SExp::atom(head)).chain(items).collect())
    }

    pub fn names<'a>(names: impl IntoIterator<Item = &'a String>) -> Self {
        SExp::list(names.into_iter().map(SExp::atom))
    }

    fn flat_width(&self) -> usize {
        match self {
            SExp::Atom(text) => text.len(),
            SExp::List(items) => {
                2 + items.iter().map(SExp::flat_width).sum::<usize>()
                    + items.len().saturating_sub(1)
            }
        }
    }
}

struct Context<'a> {
    writer: &'a mut dyn Write,
    indentation: usize,
}

impl<'a> Context<'a> {
    fn writeln(&mut self) -> io::Result<()> {
        writeln!(self.writer)?;
        write!(self.writer, "{}", " ".repeat(self.indentation))
    }

    fn write_flat(&mut self, sexp: &SExp) -> io::Result<()> {
        match sexp {
            SExp::Atom(text) => write!(self.writer, "{}", text),
            SExp::List(items) => {
                write!(self.writer, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i != 0 {
                        write!(self.writer, " ")?;
                    }
                    self.write_flat(item)?;
                }
                write!(self.writer, ")")
            }
        }
    }

    // Lists that don't fit on the rest of the line keep their head and first argument on the
    // opening line and put every later item on its own indented line.
    fn write_sexp(&mut self, sexp: &SExp, column: usize) -> io::Result<()> {
        let items = match sexp {
            SExp::List(items) if column + sexp.flat_width() > LINE_WIDTH && items.len() > 2 => {
                items
            }
            _ => return self.write_flat(sexp),
        };

        write!(self.writer, "(")?;
        self.write_flat(&items[0])?;
        write!(self.writer, " ")?;
        let first_arg_column = column + 2 + items[0].flat_width();
        self.write_sexp(&items[1], first_arg_column)?;

        self.indentation += TAB_SIZE;
        let indentation = self.indentation;
        for item in &items[2..] {
            self.writeln()?;
            self.write_sexp(item, indentation)?;
        }
        self.indentation -= TAB_SIZE;
        write!(self.writer, ")")
    }
}

pub fn write(w: &mut dyn Write, sexp: &SExp) -> io::Result<()> {
    let mut context = Context {
        writer: w,
        indentation: 0,
    };
    context.write_sexp(sexp, 0)?;
    writeln!(context.writer)
}

pub fn to_string(sexp: &SExp) -> String {
    let mut out = Vec::new();
    // Writing into a `Vec` can't fail.
    let _ = write(&mut out, sexp);
    String::from_utf8_lossy(&out).into_owned()
}
