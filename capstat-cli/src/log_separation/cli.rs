use clap::{Command, arg};

use crate::common::{f64_arg, run_input_args};

pub const LOG_SEPARATION_CMD: &str = "log-separation";

pub fn create_log_separation_cli() -> Command {
    Command::new(LOG_SEPARATION_CMD)
        .about("Signal density against distance from the target, in log-spaced bins pooled over all targets.")
        .args(run_input_args())
        .arg(
            arg!(-o --output <OUTPUT>)
                .required(true)
                .help("Output report (must not exist)"),
        )
        .arg(f64_arg(
            "bin-width",
            "Bin width in natural-log space (default 0.25)",
        ))
}
