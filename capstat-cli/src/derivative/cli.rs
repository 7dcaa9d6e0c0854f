use clap::{Command, arg};

pub const DERIVATIVE_CMD: &str = "derivative";

pub fn create_derivative_cli() -> Command {
    Command::new(DERIVATIVE_CMD)
        .about("Slope of the directionality score between neighbouring targets on one chromosome.")
        .arg(
            arg!(-d --directionality <DIRECTIONALITY>)
                .required(true)
                .help("Report written by `capstat directionality`"),
        )
        .arg(
            arg!(-o --output <OUTPUT>)
                .required(true)
                .help("Output bedGraph (must not exist)"),
        )
}
