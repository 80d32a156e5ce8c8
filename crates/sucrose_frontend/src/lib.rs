pub mod convert_assignments;
pub mod desugar;
pub mod lex;
pub mod parse;
pub mod uniquify;

pub mod error;

use std::fs;
use std::path::Path;

use crate::error::Error;
use sucrose_common::data::{cell_ast, kernel_ast, sugar_ast};
use sucrose_common::report_error::Locate;
use sucrose_common::util::fresh::FreshNames;
use sucrose_common::{config as cfg, file_cache, pretty_print, progress_ui};

/// Both frontend dialects of one program, kept so that they can be compared against each other.
#[derive(Clone, Debug)]
pub struct Lowered {
    pub kernel: kernel_ast::Program,
    pub cell: cell_ast::Program,
}

pub fn lower_to_cell_ast(
    program: sugar_ast::Program,
    artifact_dir: Option<&cfg::ArtifactDir>,
    progress: progress_ui::ProgressMode,
    fresh: &mut FreshNames,
) -> Result<Lowered, Error> {
    let kernel = desugar::desugar(program, fresh, progress_ui::bar(progress, "desugar"))
        .map_err(|err| Error::DesugarFailed(Locate::from(err)))?;
    cfg::write_artifact(artifact_dir, "kernel.sug", |w| {
        pretty_print::kernel::write_program(w, &kernel)
    })
    .map_err(Error::WriteIrFailed)?;

    let converted = convert_assignments::convert_assignments(
        kernel.clone(),
        progress_ui::bar(progress, "convert_assignments"),
    );

    let cell = uniquify::uniquify(converted, fresh, progress_ui::bar(progress, "uniquify"))
        .map_err(|err| Error::UniquifyFailed(Locate::from(err)))?;
    cfg::write_artifact(artifact_dir, "cell.sug", |w| {
        pretty_print::cell::write_program(w, &cell)
    })
    .map_err(Error::WriteIrFailed)?;

    Ok(Lowered { kernel, cell })
}

pub fn compile_to_cell_ast(
    src_path: &Path,
    artifact_dir: Option<&cfg::ArtifactDir>,
    files: &mut file_cache::FileCache,
    progress: progress_ui::ProgressMode,
    fresh: &mut FreshNames,
) -> Result<Lowered, Error> {
    // Ensure clean artifacts directory, if applicable
    if let Some(artifact_dir) = artifact_dir {
        if artifact_dir.dir_path.exists() {
            fs::remove_dir_all(&artifact_dir.dir_path).map_err(Error::CreateArtifactsFailed)?;
        }
        fs::create_dir_all(&artifact_dir.dir_path).map_err(Error::CreateArtifactsFailed)?;
    }

    let src = files
        .read(src_path)
        .map_err(|err| Error::ReadFailed(src_path.to_owned(), err))?;

    let program = parse::parse_program(src).map_err(|err| Error::ParseFailed(err).in_file(src_path))?;

    lower_to_cell_ast(program, artifact_dir, progress, fresh).map_err(|err| err.in_file(src_path))
}
