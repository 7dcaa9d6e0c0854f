use clap::{Command, arg};

use crate::common::{f64_arg, run_input_args};

pub const DIRECTIONALITY_CMD: &str = "directionality";

pub fn create_directionality_cli() -> Command {
    Command::new(DIRECTIONALITY_CMD)
        .about("Score the upstream vs downstream bias of the signal around each target.")
        .args(run_input_args())
        .arg(
            arg!(-o --output <OUTPUT>)
                .required(true)
                .help("Output report (must not exist)"),
        )
        .arg(f64_arg(
            "min-dist",
            "Closest distance from the target midpoint to use, at least 1000 (default 3000)",
        ))
        .arg(f64_arg(
            "max-dist",
            "Furthest distance from the target midpoint to use, at most 10000000 (default 500000)",
        ))
}
