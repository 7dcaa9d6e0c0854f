use anyhow::{Context, Result};
use clap::ArgMatches;
use log::{info, warn};

use capstat_io::{ReportWriter, stream_into};
use capstat_signal::classifier::RangeCutoffs;
use capstat_signal::local_long::LocalLongAccumulator;

use crate::common::{RunInputs, apply_f64, load_config, output_path, progress_bar};

pub fn run_local_long(matches: &ArgMatches) -> Result<()> {
    let mut config = load_config(matches)?;
    apply_f64(matches, "min-dist", &mut config.local_long.min_dist);
    apply_f64(matches, "cutoff", &mut config.local_long.cutoff);
    apply_f64(matches, "max-dist", &mut config.local_long.max_dist);

    let cutoffs =
        RangeCutoffs::try_from(&config.local_long).context("Invalid local/long range cutoffs")?;
    let run = RunInputs::load(matches)?;

    let output = output_path(matches);
    let mut report = ReportWriter::create(&output)?;
    report.comment(&format!(
        "local [{}, {}) and long range [{}, {}] signal, scaled by the observed extent of each window",
        cutoffs.min_dist(),
        cutoffs.cutoff(),
        cutoffs.cutoff(),
        cutoffs.max_dist()
    ))?;
    report.columns(&[
        "chrom",
        "start",
        "end",
        "name",
        "ratio",
        "scaled_local",
        "scaled_long",
        "local_sum",
        "long_sum",
        "local_scale",
        "long_scale",
    ])?;

    let bar = progress_bar(run.inputs.len());
    for (entry, target) in run.entries() {
        bar.set_message(target.name.clone());

        match stream_into(&entry.path, LocalLongAccumulator::new(target, cutoffs)) {
            Ok(result) => report.row(&format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                target.as_string(),
                result.ratio,
                result.scaled_local,
                result.scaled_long,
                result.local.sum,
                result.long_range.sum,
                result.local_scale,
                result.long_scale
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
