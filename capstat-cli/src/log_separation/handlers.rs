use anyhow::{Context, Result};
use clap::ArgMatches;
use log::{info, warn};

use capstat_io::{ReportWriter, stream_into};
use capstat_signal::classifier::LogBinning;
use capstat_signal::log_separation::LogSeparationProfile;

use crate::common::{RunInputs, apply_f64, load_config, output_path, progress_bar};

pub fn run_log_separation(matches: &ArgMatches) -> Result<()> {
    let mut config = load_config(matches)?;
    apply_f64(matches, "bin-width", &mut config.log_separation.bin_width);

    let binning =
        LogBinning::try_from(&config.log_separation).context("Invalid log bin width")?;
    let run = RunInputs::load(matches)?;

    let output = output_path(matches);
    let mut report = ReportWriter::create(&output)?;

    let mut profile = LogSeparationProfile::new(binning);
    let bar = progress_bar(run.inputs.len());
    for (entry, target) in run.entries() {
        bar.set_message(target.name.clone());

        match stream_into(&entry.path, profile.for_target(target)) {
            Ok(binned) => log::debug!("{}: {} intervals binned", target.name, binned),
            Err(e) => warn!("Skipping target {}: {}", target.name, e),
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    if profile.is_empty() {
        warn!("No interval fell into any distance bin");
    }

    report.comment(&format!(
        "signal density (x1000) per log-spaced distance bin, bin_width={}",
        binning.log_width()
    ))?;
    report.columns(&[
        "ln_separation",
        "ln_density",
        "relative_error",
        "separation",
        "density",
    ])?;
    for row in profile.rows() {
        report.row(&row.as_string())?;
    }

    let rows = report.finish()?;
    info!("Wrote {} bins to {}", rows, output.display());

    Ok(())
}
