use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, arg, value_parser};
use indicatif::{ProgressBar, ProgressStyle};

use capstat_core::models::Target;
use capstat_io::{InputEntry, read_inputs, read_targets};
use capstat_signal::AnalysisConfig;

/// `--targets` and `--inputs`, shared by every per-target analysis.
pub fn run_input_args() -> [Arg; 2] {
    [
        arg!(-t --targets <TARGETS>)
            .required(true)
            .help("BED file of capture targets: chrom start end name [strand]"),
        arg!(-f --inputs <INPUTS>)
            .required(true)
            .help("Inputs list: one `path/to/track.bdg target [condition]` per line"),
    ]
}

pub fn f64_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .required(false)
        .value_parser(value_parser!(f64))
        .help(help)
}

///
/// The analysis parameters for this run: defaults, then `--config`, then any numeric flag
/// given on the command line.
///
pub fn load_config(matches: &ArgMatches) -> Result<AnalysisConfig> {
    match matches.get_one::<String>("config") {
        Some(path) => AnalysisConfig::try_from(Path::new(path))
            .with_context(|| format!("Failed to load config file {}", path)),
        None => Ok(AnalysisConfig::default()),
    }
}

/// Overwrite `field` with the value of flag `name`, if it was given.
pub fn apply_f64(matches: &ArgMatches, name: &str, field: &mut f64) {
    if let Some(value) = matches.get_one::<f64>(name) {
        *field = *value;
    }
}

pub fn output_path(matches: &ArgMatches) -> PathBuf {
    // required by every subcommand that calls this
    PathBuf::from(matches.get_one::<String>("output").expect("--output is required"))
}

/// Targets keyed by name and the validated inputs list.
pub struct RunInputs {
    pub targets: BTreeMap<String, Target>,
    pub inputs: Vec<InputEntry>,
}

impl RunInputs {
    pub fn load(matches: &ArgMatches) -> Result<Self> {
        let targets_path = matches
            .get_one::<String>("targets")
            .expect("--targets is required");
        let inputs_path = matches
            .get_one::<String>("inputs")
            .expect("--inputs is required");

        let targets = read_targets(Path::new(targets_path))
            .with_context(|| format!("Failed to read targets from {}", targets_path))?;
        let inputs = read_inputs(Path::new(inputs_path), &targets)
            .with_context(|| format!("Failed to read inputs list {}", inputs_path))?;

        log::info!(
            "Loaded {} targets and {} input tracks",
            targets.len(),
            inputs.len()
        );

        Ok(RunInputs { targets, inputs })
    }

    /// Every input paired with its target. Targets are validated when the list is read.
    pub fn entries(&self) -> impl Iterator<Item = (&InputEntry, &Target)> {
        self.inputs
            .iter()
            .filter_map(|entry| self.targets.get(&entry.target).map(|t| (entry, t)))
    }
}

pub fn progress_bar(len: usize) -> ProgressBar {
    let bar = ProgressBar::new(len as u64);
    bar.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}",
        )
        .unwrap()
        .progress_chars("##-"),
    );
    bar
}
