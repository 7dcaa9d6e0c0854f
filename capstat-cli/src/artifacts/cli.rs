use clap::{Arg, ArgAction, Command, arg};

use crate::common::f64_arg;

pub const ARTIFACTS_CMD: &str = "artifacts";

/// Tracks used to detect artifacts, `<prefix><target>.bdg` inside each input directory.
pub const NORMALIZED_PREFIX: &str = "captured_normalizedpileup_";
/// Tracks that get rewritten with the artifacts zeroed.
pub const RAW_PREFIX: &str = "captured_rawpileup_";

pub fn create_artifacts_cli() -> Command {
    Command::new(ARTIFACTS_CMD)
        .about("Zero out bins where one replicate is far above the others.")
        .arg(
            arg!(--target <TARGET>)
                .required(true)
                .help("Name of the target whose pileups are compared"),
        )
        .arg(
            Arg::new("replicate")
                .short('r')
                .long("replicate")
                .num_args(2)
                .value_names(["INDIR", "OUTDIR"])
                .action(ArgAction::Append)
                .required(true)
                .help("Input directory of one replicate and the directory to write its cleaned raw pileup to. Give at least two."),
        )
        .arg(f64_arg(
            "factor",
            "How many times the mean of the other replicates a value must exceed (default 10)",
        ))
}
