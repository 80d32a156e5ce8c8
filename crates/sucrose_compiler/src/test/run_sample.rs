use crate::cli::{Config, Output};
use crate::Compiled;
use std::path::Path;
use sucrose_backend::interpreter::{self, Error, Evaluation};
use sucrose_common::config::PassOptions;
use sucrose_common::data::prim::Const;
use sucrose_common::file_cache::FileCache;
use sucrose_common::progress_ui::ProgressMode;

pub fn sample_config(path: impl AsRef<Path>, pass_options: PassOptions) -> Config {
    Config {
        src_path: path.as_ref().to_owned(),
        output: Output::Stdout,
        run_args: None,
        artifact_dir: None,
        progress: ProgressMode::Hidden,
        pass_options,
    }
}

fn outcome<F: Clone>(evaluation: Result<Evaluation<F>, Error>) -> Result<Const, Error> {
    evaluation.map(|evaluation| {
        evaluation
            .result()
            .expect("Program should evaluate to an integer, boolean or unit")
    })
}

/// Evaluates every dialect of a compiled program, in pipeline order.
pub fn evaluate_all(compiled: &Compiled, args: &[Const]) -> Vec<(&'static str, Result<Const, Error>)> {
    let frontend = &compiled.frontend;
    let backend = &compiled.backend;
    vec![
        ("kernel", outcome(interpreter::kernel::interpret(&frontend.kernel, args))),
        ("cell", outcome(interpreter::cell::interpret(&frontend.cell, args))),
        ("optimized", outcome(interpreter::cell::interpret(&backend.optimized, args))),
        ("monadic", outcome(interpreter::monadic::interpret(&backend.monadic, args))),
        ("cps", outcome(interpreter::maltose::interpret(&backend.cps, args))),
        ("closed", outcome(interpreter::maltose::interpret(&backend.closed, args))),
        ("hoisted", outcome(interpreter::hoisted::interpret(&backend.hoisted, args))),
    ]
}

pub fn run_sample(
    path: impl AsRef<Path>,
    pass_options: PassOptions,
    args: &[Const],
    expected: Result<Const, Error>,
) {
    let config = sample_config(path, pass_options);
    let compiled = crate::build(&config, &mut FileCache::new()).expect("Compilation failed");

    for (dialect, actual) in evaluate_all(&compiled, args) {
        assert_eq!(
            actual, expected,
            "Evaluating the {} dialect of {} with arguments {:?} did not match expectations",
            dialect,
            config.src_path.display(),
            args,
        );
    }
}

macro_rules! sample_passes {
    (
        $path:expr ;
        pass_options = $pass_options:expr ;
        $( args = [ $( $arg:expr ),* ] ; result = $result:expr ; )+
    ) => {
        $(
            crate::test::run_sample::run_sample(
                $path,
                $pass_options,
                &[ $( $arg ),* ],
                $result,
            );
        )+
    };
}

macro_rules! sample {
    (
        $name:ident $path:expr ;
        $( args = [ $( $arg:expr ),* ] ; result = $result:expr ; )+
    ) => {
        mod $name {
            #[allow(unused_imports)]
            use super::*;

            #[test]
            fn plain() {
                sample_passes! {
                    $path ;
                    pass_options = sucrose_common::config::PassOptions::default() ;
                    $( args = [ $( $arg ),* ] ; result = $result ; )+
                }
            }

            #[test]
            fn optimized() {
                sample_passes! {
                    $path ;
                    pass_options = sucrose_common::config::PassOptions::all() ;
                    $( args = [ $( $arg ),* ] ; result = $result ; )+
                }
            }
        }
    };
}
