use clap::{Command, arg};

use crate::common::{f64_arg, run_input_args};

pub const LOCAL_LONG_CMD: &str = "local-long";

pub fn create_local_long_cli() -> Command {
    Command::new(LOCAL_LONG_CMD)
        .about("Ratio of local to long range signal around each target.")
        .args(run_input_args())
        .arg(
            arg!(-o --output <OUTPUT>)
                .required(true)
                .help("Output report (must not exist)"),
        )
        .arg(f64_arg(
            "min-dist",
            "Start of the local window, in bp from the target midpoint (default 1000)",
        ))
        .arg(f64_arg(
            "cutoff",
            "Boundary between the local and long range windows (default 100000)",
        ))
        .arg(f64_arg(
            "max-dist",
            "End of the long range window (default 10000000)",
        ))
}
