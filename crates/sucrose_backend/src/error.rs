use std::io;

use crate::{check, fold_constants, number_values};
use sucrose_common::file_cache;
use sucrose_common::report_error::{report_error, Report, Reportable};

#[derive(Debug)]
pub enum Error {
    WriteIrFailed(io::Error),
    FoldConstantsFailed(fold_constants::Error),
    NumberValuesFailed(number_values::Error),
    CheckFailed(check::Error),
}

impl Error {
    /// Whether the error comes from a bug in the compiler rather than from the program.
    pub fn is_internal(&self) -> bool {
        matches!(self, Error::CheckFailed(_))
    }
}

impl Reportable for Error {
    fn report(&self, dest: &mut impl io::Write, files: &file_cache::FileCache) -> io::Result<()> {
        use Error::*;

        let (title, message) = match self {
            WriteIrFailed(err) => {
                return writeln!(
                    dest,
                    "Could not write intermediate representation artifacts: {}",
                    err
                )
            }
            FoldConstantsFailed(err) => ("Division By Zero", err.to_string()),
            NumberValuesFailed(err) => ("Unsupported Program", err.to_string()),
            CheckFailed(err) => (
                "Internal Compiler Error",
                format!("{}\n\nThis is a bug in the compiler.", err),
            ),
        };

        report_error(
            dest,
            files,
            Report {
                path: None,
                span: None,
                title,
                message: Some(&message),
            },
        )
    }

    fn exit_status(&self) -> i32 {
        1
    }
}
