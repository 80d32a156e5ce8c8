pub mod check;
pub mod close_lambdas;
pub mod explicate_control;
pub mod fold_constants;
pub mod hoist;
pub mod number_values;
pub mod remove_complex_operands;

pub mod error;
pub mod interpreter;

use crate::error::Error;
use sucrose_common::data::{cell_ast, hoisted_ast, maltose_ast, monadic_ast};
use sucrose_common::util::fresh::FreshNames;
use sucrose_common::{config as cfg, pretty_print, progress_ui};

/// Every dialect a program passes through between the cell dialect and the hoisted one.
#[derive(Clone, Debug)]
pub struct Lowered {
    /// The cell dialect after whichever optional passes were enabled.
    pub optimized: cell_ast::Program,
    pub monadic: monadic_ast::Program,
    pub cps: maltose_ast::Program,
    pub closed: maltose_ast::Program,
    pub hoisted: hoisted_ast::Program,
}

pub fn compile_to_hoisted_ast(
    cell: cell_ast::Program,
    artifact_dir: Option<&cfg::ArtifactDir>,
    progress: progress_ui::ProgressMode,
    pass_options: &cfg::PassOptions,
    fresh: &mut FreshNames,
) -> Result<Lowered, Error> {
    let mut optimized = cell;

    if pass_options.fold_constants {
        optimized = fold_constants::fold_constants(
            optimized,
            progress_ui::bar(progress, "fold_constants"),
        )
        .map_err(Error::FoldConstantsFailed)?;

        cfg::write_artifact(artifact_dir, "folded.sug", |w| {
            pretty_print::cell::write_program(w, &optimized)
        })
        .map_err(Error::WriteIrFailed)?;
    }

    if pass_options.number_values {
        optimized = number_values::number_values(
            optimized,
            fresh,
            progress_ui::bar(progress, "number_values"),
        )
        .map_err(Error::NumberValuesFailed)?;

        cfg::write_artifact(artifact_dir, "numbered.sug", |w| {
            pretty_print::cell::write_program(w, &optimized)
        })
        .map_err(Error::WriteIrFailed)?;
    }

    let monadic = remove_complex_operands::remove_complex_operands(
        optimized.clone(),
        fresh,
        progress_ui::bar(progress, "remove_complex_operands"),
    );
    cfg::write_artifact(artifact_dir, "monadic.sug", |w| {
        pretty_print::monadic::write_program(w, &monadic)
    })
    .map_err(Error::WriteIrFailed)?;

    let cps = explicate_control::explicate_control(
        monadic.clone(),
        fresh,
        progress_ui::bar(progress, "explicate_control"),
    );
    cfg::write_artifact(artifact_dir, "maltose.sug", |w| {
        pretty_print::maltose::write_program(w, &cps)
    })
    .map_err(Error::WriteIrFailed)?;

    let closed = close_lambdas::close_lambdas(
        cps.clone(),
        fresh,
        progress_ui::bar(progress, "close_lambdas"),
    );
    cfg::write_artifact(artifact_dir, "closed.sug", |w| {
        pretty_print::maltose::write_program(w, &closed)
    })
    .map_err(Error::WriteIrFailed)?;
    check::check_closed(&closed).map_err(Error::CheckFailed)?;

    let hoisted = hoist::hoist(closed.clone(), fresh, progress_ui::bar(progress, "hoist"));
    cfg::write_artifact(artifact_dir, "hoisted.sug", |w| {
        pretty_print::hoisted::write_program(w, &hoisted)
    })
    .map_err(Error::WriteIrFailed)?;
    check::check_hoisted(&hoisted).map_err(Error::CheckFailed)?;

    Ok(Lowered {
        optimized,
        monadic,
        cps,
        closed,
        hoisted,
    })
}
