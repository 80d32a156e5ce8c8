use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Where `--emit-artifacts` dumps the program after each pass.
#[derive(Clone, Debug)]
pub struct ArtifactDir {
    pub dir_path: PathBuf,
    pub filename_prefix: PathBuf,
}

impl ArtifactDir {
    pub fn artifact_path(&self, extension: &(impl AsRef<OsStr> + ?Sized)) -> PathBuf {
        self.dir_path
            .join(self.filename_prefix.with_extension(extension))
    }
}

/// Dumps one stage of the pipeline into the artifact directory, if there is one.
pub fn write_artifact(
    artifact_dir: Option<&ArtifactDir>,
    extension: &str,
    write: impl FnOnce(&mut dyn io::Write) -> io::Result<()>,
) -> io::Result<()> {
    if let Some(artifact_dir) = artifact_dir {
        let mut out_file = io::BufWriter::new(fs::File::create(
            artifact_dir.artifact_path(extension),
        )?);
        write(&mut out_file)?;
        io::Write::flush(&mut out_file)?;
    }
    Ok(())
}

/// Switches for the optional passes that run between assignment conversion and
/// remove-complex-operands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassOptions {
    pub fold_constants: bool,
    pub number_values: bool,
}

impl PassOptions {
    pub fn all() -> Self {
        PassOptions {
            fold_constants: true,
            number_values: true,
        }
    }
}
