use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;
use log::info;

use capstat_io::{ReportWriter, ensure_absent, read_directionality_report};
use capstat_signal::derivative::directionality_derivative;

use crate::common::output_path;

pub fn run_derivative(matches: &ArgMatches) -> Result<()> {
    let input = matches
        .get_one::<String>("directionality")
        .expect("--directionality is required");
    let output = output_path(matches);
    ensure_absent(&[&output])?;

    let rows = read_directionality_report(Path::new(input))
        .with_context(|| format!("Failed to read directionality report {}", input))?;
    let derivative = directionality_derivative(rows)
        .with_context(|| format!("Cannot differentiate {}", input))?;

    let mut report = ReportWriter::create(&output)?;
    report.comment(&format!(
        "d(directionality)/dx between consecutive targets of {}",
        input
    ))?;
    report.columns(&["chrom", "start", "end", "derivative"])?;
    for point in &derivative {
        report.row(&point.as_string())?;
    }

    let n = report.finish()?;
    info!("Wrote {} points to {}", n, output.display());

    Ok(())
}
