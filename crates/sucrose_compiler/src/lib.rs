#[cfg(test)]
mod test;

pub mod cli;

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use sucrose_backend::compile_to_hoisted_ast;
use sucrose_backend::interpreter::{self, hoisted::Label, store::Value, Evaluation};
use sucrose_common::data::hoisted_ast;
use sucrose_common::data::prim::Const;
use sucrose_common::report_error::{report_error, Report, Reportable};
use sucrose_common::util::fresh::FreshNames;
use sucrose_common::{file_cache, pretty_print};
use sucrose_frontend::compile_to_cell_ast;

#[derive(Debug)]
enum ErrorKind {
    WriteOutputFailed(Option<PathBuf>, io::Error),
    RuntimeError(interpreter::Error),
    FrontendError(sucrose_frontend::error::Error),
    BackendError(sucrose_backend::error::Error),
}

// This type is separate from 'ErrorKind' because enums cannot have private variants, and we don't
// want to expose the internal compiler error types appearing in the variants of 'ErrorKind'.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error { kind }
    }
}

impl Error {
    /// Whether the error comes from a bug in the compiler rather than from the program.
    pub fn is_internal(&self) -> bool {
        match &self.kind {
            ErrorKind::BackendError(err) => err.is_internal(),
            _ => false,
        }
    }
}

impl Reportable for Error {
    fn report(&self, dest: &mut impl io::Write, files: &file_cache::FileCache) -> io::Result<()> {
        use ErrorKind::*;
        match &self.kind {
            WriteOutputFailed(Some(path), err) => {
                writeln!(dest, "Could not write output to {}: {}", path.display(), err)
            }
            WriteOutputFailed(None, err) => writeln!(dest, "Could not write output: {}", err),
            RuntimeError(err) => report_error(
                dest,
                files,
                Report {
                    path: None,
                    span: None,
                    title: "Runtime Error",
                    message: Some(&format!("The program failed while running: {}.", err)),
                },
            ),
            FrontendError(err) => err.report(dest, files),
            BackendError(err) => err.report(dest, files),
        }
    }

    fn exit_status(&self) -> i32 {
        1
    }
}

/// A compiled program, together with every dialect it went through.
#[derive(Clone, Debug)]
pub struct Compiled {
    pub frontend: sucrose_frontend::Lowered,
    pub backend: sucrose_backend::Lowered,
}

impl Compiled {
    pub fn program(&self) -> &hoisted_ast::Program {
        &self.backend.hoisted
    }
}

pub fn build(config: &cli::Config, files: &mut file_cache::FileCache) -> Result<Compiled, Error> {
    let mut fresh = FreshNames::new();

    let frontend = compile_to_cell_ast(
        &config.src_path,
        config.artifact_dir.as_ref(),
        files,
        config.progress,
        &mut fresh,
    )
    .map_err(ErrorKind::FrontendError)?;

    let backend = compile_to_hoisted_ast(
        frontend.cell.clone(),
        config.artifact_dir.as_ref(),
        config.progress,
        &config.pass_options,
        &mut fresh,
    )
    .map_err(ErrorKind::BackendError)?;

    Ok(Compiled { frontend, backend })
}

pub fn run<'a>(
    program: &'a hoisted_ast::Program,
    args: &[Const],
) -> Result<Evaluation<Label<'a>>, Error> {
    Ok(interpreter::hoisted::interpret(program, args).map_err(ErrorKind::RuntimeError)?)
}

/// How a program's result is shown to the user.
pub fn display_value<F>(value: &Value<F>) -> String {
    match value.to_const() {
        Some(val) => val.to_string(),
        None => match value {
            Value::Pointer(addr) => format!("<tuple at {}>", addr),
            _ => format!("<{}>", value.kind()),
        },
    }
}

fn write_output(config: &cli::Config, compiled: &Compiled) -> io::Result<()> {
    match &config.output {
        cli::Output::Stdout => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            pretty_print::hoisted::write_program(&mut out, compiled.program())?;
            out.flush()
        }
        cli::Output::File(path) => {
            let mut out = io::BufWriter::new(fs::File::create(path)?);
            pretty_print::hoisted::write_program(&mut out, compiled.program())?;
            out.flush()
        }
    }
}

pub fn handle_config(config: cli::Config, files: &mut file_cache::FileCache) -> Result<(), Error> {
    let compiled = build(&config, files)?;

    let output_path = match &config.output {
        cli::Output::File(path) => Some(path.clone()),
        cli::Output::Stdout => None,
    };
    write_output(&config, &compiled)
        .map_err(|err| ErrorKind::WriteOutputFailed(output_path, err))?;

    if let Some(args) = &config.run_args {
        let evaluation = run(compiled.program(), args)?;
        writeln!(io::stdout().lock(), "{}", display_value(&evaluation.value))
            .map_err(|err| ErrorKind::WriteOutputFailed(None, err))?;
    }

    Ok(())
}
