use anyhow::{Context, Result};
use clap::ArgMatches;
use log::{info, warn};

use capstat_io::{ReportWriter, stream_into};
use capstat_signal::classifier::DirectionalWindow;
use capstat_signal::directionality::DirectionalityAccumulator;

use crate::common::{RunInputs, apply_f64, load_config, output_path, progress_bar};

pub fn run_directionality(matches: &ArgMatches) -> Result<()> {
    let mut config = load_config(matches)?;
    apply_f64(matches, "min-dist", &mut config.directionality.min_dist);
    apply_f64(matches, "max-dist", &mut config.directionality.max_dist);

    let window = DirectionalWindow::try_from(&config.directionality)
        .context("Invalid directionality window")?;
    let run = RunInputs::load(matches)?;

    let output = output_path(matches);
    let mut report = ReportWriter::create(&output)?;
    report.comment(&format!(
        "directionality = ln(downstream density) - ln(upstream density), min_dist={} max_dist={}",
        window.min_dist(),
        window.max_dist()
    ))?;
    report.columns(&["chrom", "start", "end", "name", "directionality", "error"])?;

    let bar = progress_bar(run.inputs.len());
    for (entry, target) in run.entries() {
        bar.set_message(target.name.clone());

        match stream_into(&entry.path, DirectionalityAccumulator::new(target, window)) {
            Ok(result) => report.row(&format!(
                "{}\t{}\t{}",
                target.as_string(),
                result.directionality,
                result.error
            ))?,
            Err(e) => warn!("Skipping target {}: {}", target.name, e),
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    let rows = report.finish()?;
    info!("Wrote {} targets to {}", rows, output.display());

    Ok(())
}
