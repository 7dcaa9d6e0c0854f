use clap::{Arg, Command, arg, value_parser};

use crate::common::run_input_args;

pub const READ_STATS_CMD: &str = "read-stats";

pub fn create_read_stats_cli() -> Command {
    Command::new(READ_STATS_CMD)
        .about("Share of each chromosome's signal near its start, and boxplot statistics of the per-bin values, per target and condition.")
        .args(run_input_args())
        .arg(
            arg!(-o --output <PREFIX>)
                .required(true)
                .help("Prefix of the five output files (none of them may exist)"),
        )
        .arg(
            Arg::new("region-start")
                .long("region-start")
                .value_parser(value_parser!(u64))
                .help("Start of the analysed region (default 0)"),
        )
        .arg(
            Arg::new("region-end")
                .long("region-end")
                .value_parser(value_parser!(u64))
                .help("End of the analysed region (default 30000000)"),
        )
}
