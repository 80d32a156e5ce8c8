use ansi_term::Color;
use std::io;
use std::path::{Path, PathBuf};
use textwrap::{Options, WordSplitter};

use crate::file_cache::FileCache;

/// An error that knows how to describe itself to the person running the compiler.
pub trait Reportable {
    fn report(&self, dest: &mut impl io::Write, files: &FileCache) -> io::Result<()>;

    fn exit_status(&self) -> i32;
}

/// Line and column (both zero-based) of a byte offset, and the text of that line.
fn locate_offset(content: &str, offset: usize) -> (usize, usize, &str) {
    let offset = offset.min(content.len());
    let line_start = content[..offset].rfind('\n').map_or(0, |idx| idx + 1);
    let line_end = content[offset..]
        .find('\n')
        .map_or(content.len(), |idx| offset + idx);
    let line_num = content[..line_start].matches('\n').count();
    let line = content[line_start..line_end].trim_end_matches('\r');
    (line_num, offset - line_start, line)
}

fn write_snippet(dest: &mut impl io::Write, content: &str, lo: usize, hi: usize) -> io::Result<()> {
    let gutter_style = Color::Blue.bold();
    let marker_style = Color::Red.bold();

    let (line_num, col, line) = locate_offset(content, lo);
    let gutter_width = (line_num + 1).to_string().len();
    // Spans that run past the end of their first line are underlined up to the line break.
    let marker_len = hi.saturating_sub(lo).clamp(1, (line.len() - col.min(line.len())).max(1));

    let empty_gutter = format!(" {:>width$} |", "", width = gutter_width);
    writeln!(dest, "{}", gutter_style.paint(empty_gutter.clone()))?;
    writeln!(
        dest,
        "{} {}",
        gutter_style.paint(format!(" {:>width$} |", line_num + 1, width = gutter_width)),
        line
    )?;
    writeln!(
        dest,
        "{} {}{}",
        gutter_style.paint(empty_gutter.clone()),
        " ".repeat(col),
        marker_style.paint("^".repeat(marker_len))
    )
}

#[derive(Clone, Copy, Debug)]
pub struct Report<'a> {
    pub path: Option<&'a Path>,
    pub span: Option<(usize, usize)>,
    pub title: &'a str,
    pub message: Option<&'a str>,
}

const TITLE_WIDTH: usize = 60;
const MESSAGE_WIDTH: usize = 60;

pub fn report_error(dest: &mut impl io::Write, files: &FileCache, report: Report) -> io::Result<()> {
    let title_style = Color::Blue.bold();
    let path_style = Color::Yellow.normal();

    let heading = format!("---- {} ", report.title);
    let padding = "-".repeat(TITLE_WIDTH.saturating_sub(heading.len()));
    writeln!(dest, "\n{}", title_style.paint(heading + &padding))?;

    if let Some(path) = report.path {
        match (report.span, files.read_cached(path)) {
            (Some((lo, hi)), Some(content)) => {
                let (line_num, col, _) = locate_offset(content, lo);
                writeln!(
                    dest,
                    "{}",
                    path_style.paint(format!("{}:{}:{}", path.display(), line_num + 1, col + 1))
                )?;
                writeln!(dest)?;
                write_snippet(dest, content, lo, hi)?;
            }
            _ => writeln!(dest, "{}", path_style.paint(path.display().to_string()))?,
        }
    }

    if let Some(message) = report.message {
        writeln!(dest)?;
        let options = Options::new(MESSAGE_WIDTH).word_splitter(WordSplitter::NoHyphenation);
        for paragraph in message.lines() {
            let wrapped = textwrap::wrap(paragraph, &options);
            if wrapped.is_empty() {
                writeln!(dest)?;
            }
            for line in wrapped {
                writeln!(dest, "{}", line)?;
            }
        }
    }

    writeln!(dest)
}

/// An error together with the file and byte span it was found at, when known.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Locate<E> {
    pub path: Option<PathBuf>,
    pub span: Option<(usize, usize)>,
    pub error: E,
}

impl<E> From<E> for Locate<E> {
    fn from(error: E) -> Self {
        Locate {
            path: None,
            span: None,
            error,
        }
    }
}

// Curried for use with `map_err`. The innermost location wins.

pub fn locate_path<'a, E>(
    path: &'a (impl AsRef<Path> + ?Sized),
) -> impl FnOnce(Locate<E>) -> Locate<E> + 'a {
    move |err| Locate {
        path: Some(err.path.unwrap_or_else(|| path.as_ref().to_owned())),
        ..err
    }
}

pub fn locate_span<E>(lo: usize, hi: usize) -> impl FnOnce(Locate<E>) -> Locate<E> {
    move |err| Locate {
        span: Some(err.span.unwrap_or((lo, hi))),
        ..err
    }
}

impl<E> Locate<E> {
    pub fn report_with<Title, Msg>(
        &self,
        dest: &mut impl io::Write,
        files: &FileCache,
        reporter: impl FnOnce(&E) -> (Title, Msg),
    ) -> io::Result<()>
    where
        Title: AsRef<str>,
        Msg: AsRef<str>,
    {
        let (title, message) = reporter(&self.error);
        report_error(
            dest,
            files,
            Report {
                path: self.path.as_deref(),
                span: self.span,
                title: title.as_ref(),
                message: Some(message.as_ref()),
            },
        )
    }
}
