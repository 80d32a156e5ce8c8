use clap::builder::styling;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::ffi::OsString;
use std::path::PathBuf;

use sucrose_common::config::{ArtifactDir, PassOptions};
use sucrose_common::data::prim::Const;
use sucrose_common::progress_ui::ProgressMode;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Output {
    Stdout,
    File(PathBuf),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub src_path: PathBuf,
    pub output: Output,
    /// Arguments to run the compiled program with, if it should be run.
    pub run_args: Option<Vec<Const>>,
    pub artifact_dir: Option<ArtifactDir>,
    pub progress: ProgressMode,
    pub pass_options: PassOptions,
}

/// Program arguments are integer, boolean or unit literals.
fn parse_const(arg: &str) -> Result<Const, String> {
    match arg {
        "true" => Ok(Const::Bool(true)),
        "false" => Ok(Const::Bool(false)),
        "unit" => Ok(Const::Unit),
        _ => arg
            .parse::<i64>()
            .map(Const::Int)
            .map_err(|_| format!("'{}' is not an integer, 'true', 'false' or 'unit'", arg)),
    }
}

fn command() -> Command {
    let styles = styling::Styles::styled()
        .header(styling::AnsiColor::Green.on_default() | styling::Effects::BOLD)
        .usage(styling::AnsiColor::Green.on_default() | styling::Effects::BOLD)
        .literal(styling::AnsiColor::Cyan.on_default() | styling::Effects::BOLD)
        .placeholder(styling::AnsiColor::Cyan.on_default());

    Command::new(std::env!("CARGO_PKG_NAME"))
        .version(std::env!("CARGO_PKG_VERSION"))
        .about(std::env!("CARGO_PKG_DESCRIPTION"))
        .styles(styles)
        .next_line_help(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("src-path")
                .help("Specify the source file for compilation.")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("output-path")
                .short('o')
                .long("output-path")
                .value_parser(clap::value_parser!(OsString))
                .help("Write the compiled program to this path instead of to standard output."),
        )
        .arg(
            Arg::new("run")
                .long("run")
                .num_args(0..)
                .allow_negative_numbers(true)
                .value_parser(parse_const)
                .value_name("ARGS")
                .help(
                    "Run the compiled program with these arguments after printing it, and print \
                    its result. The arguments must match the program's parameters in number.",
                ),
        )
        .arg(
            Arg::new("emit-artifacts")
                .long("emit-artifacts")
                .short('a')
                .action(ArgAction::SetTrue)
                .help(
                    "Dump the program after every pass. Artifacts will be placed in a directory \
                    whose name is derived from the output path, or from the source path when \
                    printing to standard output.",
                ),
        )
        .arg(
            Arg::new("fold-constants")
                .long("fold-constants")
                .action(ArgAction::SetTrue)
                .help("Fold constant arithmetic before lowering to administrative normal form."),
        )
        .arg(
            Arg::new("number-values")
                .long("number-values")
                .action(ArgAction::SetTrue)
                .help("Share structurally identical arithmetic before lowering."),
        )
        .arg(
            Arg::new("progress")
                .long("progress")
                .action(ArgAction::SetTrue)
                .help("Set whether or not to show progress"),
        )
}

impl Config {
    pub fn from_args() -> Self {
        Self::from_matches(&command().get_matches())
    }

    pub fn try_from_iter<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Ok(Self::from_matches(&command().try_get_matches_from(args)?))
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        // Required by the command definition.
        let src_path: PathBuf = matches
            .get_one::<String>("src-path")
            .map(PathBuf::from)
            .unwrap_or_default();

        let output = match matches.get_one::<OsString>("output-path") {
            Some(path) => Output::File(path.into()),
            None => Output::Stdout,
        };

        let run_args = matches
            .get_many::<Const>("run")
            .map(|args| args.copied().collect())
            .or_else(|| matches.contains_id("run").then(Vec::new));

        let artifact_dir = if matches.get_flag("emit-artifacts") {
            let base = match &output {
                Output::File(path) => path.clone(),
                Output::Stdout => PathBuf::from(src_path.file_stem().unwrap_or_default()),
            };
            let mut dir_path = base.clone().into_os_string();
            dir_path.push("-artifacts");
            Some(ArtifactDir {
                dir_path: dir_path.into(),
                filename_prefix: base.file_name().unwrap_or_default().into(),
            })
        } else {
            None
        };

        let progress = if matches.get_flag("progress") {
            ProgressMode::Visible
        } else {
            ProgressMode::Hidden
        };

        Config {
            src_path,
            output,
            run_args,
            artifact_dir,
            progress,
            pass_options: PassOptions {
                fold_constants: matches.get_flag("fold-constants"),
                number_values: matches.get_flag("number-values"),
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_from_iter(["sucrose", "prog.sug"]).unwrap();
        assert_eq!(config.src_path, PathBuf::from("prog.sug"));
        assert_eq!(config.output, Output::Stdout);
        assert_eq!(config.run_args, None);
        assert!(config.artifact_dir.is_none());
        assert_eq!(config.progress, ProgressMode::Hidden);
        assert_eq!(config.pass_options, PassOptions::default());
    }

    #[test]
    fn test_run_args() {
        let config =
            Config::try_from_iter(["sucrose", "prog.sug", "--run", "3", "-4", "true"]).unwrap();
        assert_eq!(
            config.run_args,
            Some(vec![Const::Int(3), Const::Int(-4), Const::Bool(true)])
        );

        let config = Config::try_from_iter(["sucrose", "prog.sug", "--run"]).unwrap();
        assert_eq!(config.run_args, Some(vec![]));

        assert!(Config::try_from_iter(["sucrose", "prog.sug", "--run", "x"]).is_err());
    }

    #[test]
    fn test_artifact_dir_follows_output() {
        let config = Config::try_from_iter([
            "sucrose",
            "src/prog.sug",
            "-o",
            "out/prog.hoisted",
            "--emit-artifacts",
            "--fold-constants",
        ])
        .unwrap();
        let artifact_dir = config.artifact_dir.unwrap();
        assert_eq!(
            artifact_dir.dir_path,
            PathBuf::from("out/prog.hoisted-artifacts")
        );
        assert_eq!(artifact_dir.filename_prefix, PathBuf::from("prog.hoisted"));
        assert!(config.pass_options.fold_constants);
        assert!(!config.pass_options.number_values);

        let config = Config::try_from_iter(["sucrose", "src/prog.sug", "-a"]).unwrap();
        assert_eq!(
            config.artifact_dir.unwrap().dir_path,
            PathBuf::from("prog-artifacts")
        );
    }
}
