use std::io;
use std::path::{Path, PathBuf};

use crate::{desugar, parse, uniquify};
use sucrose_common::file_cache;
use sucrose_common::report_error::{locate_path, Locate, Reportable};

#[derive(Debug)]
pub enum Error {
    ReadFailed(PathBuf, io::Error),
    CreateArtifactsFailed(io::Error),
    WriteIrFailed(io::Error),
    ParseFailed(parse::Error),
    DesugarFailed(Locate<desugar::Error>),
    UniquifyFailed(Locate<uniquify::Error>),
}

impl Error {
    pub(crate) fn in_file(self, path: &Path) -> Self {
        use Error::*;
        match self {
            ParseFailed(err) => ParseFailed(locate_path(path)(err)),
            DesugarFailed(err) => DesugarFailed(locate_path(path)(err)),
            UniquifyFailed(err) => UniquifyFailed(locate_path(path)(err)),
            other => other,
        }
    }
}

impl Reportable for Error {
    fn report(&self, dest: &mut impl io::Write, files: &file_cache::FileCache) -> io::Result<()> {
        use Error::*;

        match self {
            ReadFailed(path, err) => {
                writeln!(dest, "Could not read source file {}: {}", path.display(), err)
            }
            CreateArtifactsFailed(err) => {
                writeln!(dest, "Could not create artifacts directory: {}", err)
            }
            WriteIrFailed(err) => writeln!(
                dest,
                "Could not write intermediate representation artifacts: {}",
                err
            ),
            ParseFailed(err) => err.report_with(dest, files, |err| ("Syntax Error", err.to_string())),
            DesugarFailed(err) => {
                err.report_with(dest, files, |err| ("Non-Exhaustive Match", err.to_string()))
            }
            UniquifyFailed(err) => {
                err.report_with(dest, files, |err| ("Unbound Variable", err.to_string()))
            }
        }
    }

    fn exit_status(&self) -> i32 {
        1
    }
}
