mod artifacts;
mod common;
mod derivative;
mod directionality;
mod local_long;
mod log_separation;
mod read_stats;

use anyhow::Result;
use clap::{ArgAction, ArgMatches, Command, arg};

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const PKG_NAME: &str = "capstat";
    pub const BIN_NAME: &str = "capstat";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .author("Databio")
        .about("Summarise capture pileup signal around target loci: directionality, local vs long range ratios, distance decay, replicate artifacts and read distributions.")
        .subcommand_required(true)
        .arg(
            arg!(-c --config <CONFIG>)
                .global(true)
                .help("TOML file with analysis parameters; command line flags take precedence"),
        )
        .arg(
            arg!(-v --verbose)
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log debug messages"),
        )
        .subcommand(directionality::cli::create_directionality_cli())
        .subcommand(local_long::cli::create_local_long_cli())
        .subcommand(log_separation::cli::create_log_separation_cli())
        .subcommand(artifacts::cli::create_artifacts_cli())
        .subcommand(read_stats::cli::create_read_stats_cli())
        .subcommand(derivative::cli::create_derivative_cli())
}

fn init_logging(matches: &ArgMatches) {
    let default_filter = match matches.get_flag("verbose") {
        true => "debug",
        false => "info",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();
}

fn main() -> Result<()> {
    let app = build_parser();
    let matches = app.get_matches();

    init_logging(&matches);

    match matches.subcommand() {
        //
        // DIRECTIONALITY
        //
        Some((directionality::cli::DIRECTIONALITY_CMD, matches)) => {
            directionality::handlers::run_directionality(matches)?;
        }

        //
        // LOCAL VS LONG RANGE
        //
        Some((local_long::cli::LOCAL_LONG_CMD, matches)) => {
            local_long::handlers::run_local_long(matches)?;
        }

        //
        // LOG SEPARATION PROFILE
        //
        Some((log_separation::cli::LOG_SEPARATION_CMD, matches)) => {
            log_separation::handlers::run_log_separation(matches)?;
        }

        //
        // REPLICATE ARTIFACTS
        //
        Some((artifacts::cli::ARTIFACTS_CMD, matches)) => {
            artifacts::handlers::run_artifacts(matches)?;
        }

        //
        // READ STATS
        //
        Some((read_stats::cli::READ_STATS_CMD, matches)) => {
            read_stats::handlers::run_read_stats(matches)?;
        }

        //
        // DIRECTIONALITY DERIVATIVE
        //
        Some((derivative::cli::DERIVATIVE_CMD, matches)) => {
            derivative::handlers::run_derivative(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_parser_is_valid() {
        build_parser().debug_assert();
    }

    #[rstest]
    fn test_global_flags_reach_subcommands() {
        let matches = build_parser()
            .try_get_matches_from([
                "capstat",
                "directionality",
                "-t",
                "targets.bed",
                "-f",
                "inputs.txt",
                "-o",
                "out.tsv",
                "--max-dist",
                "1000000",
                "--config",
                "capstat.toml",
                "-v",
            ])
            .unwrap();

        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, directionality::cli::DIRECTIONALITY_CMD);
        assert_eq!(sub.get_one::<f64>("max-dist"), Some(&1_000_000.0));
        assert_eq!(
            sub.get_one::<String>("config").map(String::as_str),
            Some("capstat.toml")
        );
        assert!(matches.get_flag("verbose"));
    }

    #[rstest]
    fn test_artifacts_replicate_pairs() {
        let matches = build_parser()
            .try_get_matches_from([
                "capstat", "artifacts", "--target", "probeA", "-r", "in1", "out1", "-r", "in2",
                "out2",
            ])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();

        let pairs: Vec<Vec<&String>> = sub
            .get_occurrences::<String>("replicate")
            .unwrap()
            .map(Iterator::collect)
            .collect();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1][0], "in2");
        assert_eq!(pairs[1][1], "out2");
    }

    #[rstest]
    fn test_missing_required_args() {
        let result = build_parser().try_get_matches_from(["capstat", "local-long", "-t", "x.bed"]);
        assert!(result.is_err());
    }
}
