use std::path::PathBuf;

use crate::runner::{DEFAULT_REPEATS, DEFAULT_SEED};

pub const DEFAULT_RECORD_FILE: &str = "output/result_rust.csv";
pub const DEFAULT_PEER_RECORD_FILE: &str = "output/result.csv";
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_LABEL: &str = "Rust";
pub const DEFAULT_BASELINE: &str = "Python";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOptions {
    pub output: PathBuf,
    pub label: String,
    pub repeats: usize,
    pub seed: u64,
    pub scratch_dir: PathBuf,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_RECORD_FILE),
            label: DEFAULT_LABEL.to_string(),
            repeats: DEFAULT_REPEATS,
            seed: DEFAULT_SEED,
            scratch_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportOptions {
    pub inputs: Vec<PathBuf>,
    pub output_dir: PathBuf,
    pub baseline: String,
    pub comparison: String,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            inputs: vec![
                PathBuf::from(DEFAULT_PEER_RECORD_FILE),
                PathBuf::from(DEFAULT_RECORD_FILE),
            ],
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            baseline: DEFAULT_BASELINE.to_string(),
            comparison: DEFAULT_LABEL.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Run(RunOptions),
    Report(ReportOptions),
    Help,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandLineConfig {
    pub command: Command,
}

impl CommandLineConfig {
    pub fn from_args(args: &[&str]) -> Result<Self, String> {
        let mut iter = args.iter().skip(1);
        let command = match iter.next().copied() {
            Some("--help" | "-h") => Command::Help,
            Some("run") => parse_run(&mut iter)?,
            Some("report") => parse_report(&mut iter)?,
            Some(other) => return Err(format!("unknown command {other}")),
            None => return Err("missing command (run or report)".to_string()),
        };
        Ok(Self { command })
    }

    pub fn help() -> &'static str {
        "Usage:\n  benchlab run [--output PATH] [--label NAME] [--repeats N] [--seed N] [--scratch-dir DIR]\n  benchlab report [--input PATH]... [--output-dir DIR] [--baseline LABEL] [--comparison LABEL]\n"
    }
}

/// Flag values are consumed before matching, so `--label -h` labels the run
/// `-h` rather than asking for help.
fn parse_run<'a>(iter: &mut impl Iterator<Item = &'a &'a str>) -> Result<Command, String> {
    let mut options = RunOptions::default();
    while let Some(arg) = iter.next() {
        match *arg {
            "--output" => options.output = PathBuf::from(value(iter, arg)?),
            "--label" => options.label = value(iter, arg)?.to_string(),
            "--repeats" => {
                let repeats: usize = parse_number(value(iter, arg)?, arg)?;
                if repeats == 0 {
                    return Err("--repeats must be positive".to_string());
                }
                options.repeats = repeats;
            }
            "--seed" => options.seed = parse_number(value(iter, arg)?, arg)?,
            "--scratch-dir" => options.scratch_dir = PathBuf::from(value(iter, arg)?),
            "--help" | "-h" => return Ok(Command::Help),
            other => return Err(format!("unknown flag {other}")),
        }
    }
    Ok(Command::Run(options))
}

fn parse_report<'a>(
    iter: &mut impl Iterator<Item = &'a &'a str>,
) -> Result<Command, String> {
    let mut options = ReportOptions::default();
    let mut inputs = Vec::new();
    while let Some(arg) = iter.next() {
        match *arg {
            "--input" => inputs.push(PathBuf::from(value(iter, arg)?)),
            "--output-dir" => options.output_dir = PathBuf::from(value(iter, arg)?),
            "--baseline" => options.baseline = value(iter, arg)?.to_string(),
            "--comparison" => options.comparison = value(iter, arg)?.to_string(),
            "--help" | "-h" => return Ok(Command::Help),
            other => return Err(format!("unknown flag {other}")),
        }
    }
    if !inputs.is_empty() {
        options.inputs = inputs;
    }
    Ok(Command::Report(options))
}

fn value<'a>(iter: &mut impl Iterator<Item = &'a &'a str>, flag: &str) -> Result<&'a str, String> {
    iter.next()
        .copied()
        .ok_or_else(|| format!("{flag} requires a value"))
}

fn parse_number<T: std::str::FromStr>(raw: &str, flag: &str) -> Result<T, String> {
    raw.parse()
        .map_err(|_| format!("{flag} expects a number, got {raw}"))
}
