use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use log::{info, warn};

use capstat_io::{ReportWriter, ensure_absent, stream_into};
use capstat_signal::distribution::{AnalysisRegion, ReadStats, RegionDistribution};

use crate::common::{RunInputs, load_config, progress_bar};

/// Bp to a compact Mb label, `30000000 -> "30"`, `2500000 -> "2.5"`.
fn mb_label(bp: u64) -> String {
    if bp % 1_000_000 == 0 {
        (bp / 1_000_000).to_string()
    } else {
        (bp as f64 / 1e6).to_string()
    }
}

pub fn run_read_stats(matches: &ArgMatches) -> Result<()> {
    let mut config = load_config(matches)?;
    if let Some(start) = matches.get_one::<u64>("region-start") {
        config.distribution.region_start = *start;
    }
    if let Some(end) = matches.get_one::<u64>("region-end") {
        config.distribution.region_end = *end;
    }
    let region = AnalysisRegion::try_from(&config.distribution).context("Invalid region")?;

    let prefix = matches
        .get_one::<String>("output")
        .expect("--output is required");
    let windows = region.windows();

    let proportion_paths: Vec<PathBuf> = windows
        .iter()
        .map(|(from, to)| {
            PathBuf::from(format!("{}prpn{}to{}M.dat", prefix, mb_label(*from), mb_label(*to)))
        })
        .collect();
    let boxplot_path = PathBuf::from(format!(
        "{}boxplotTo{}M.dat",
        prefix,
        mb_label(region.end())
    ));

    let mut all_outputs = proportion_paths.clone();
    all_outputs.push(boxplot_path.clone());
    ensure_absent(&all_outputs)?;

    let run = RunInputs::load(matches)?;
    for entry in &run.inputs {
        if entry.condition.is_none() {
            bail!(
                "Inputs line for {} has no condition column",
                entry.path.display()
            );
        }
    }

    let mut stats: BTreeMap<(String, String), ReadStats> = BTreeMap::new();
    let mut conditions = BTreeSet::new();
    let mut targets = BTreeSet::new();

    let bar = progress_bar(run.inputs.len());
    for (entry, target) in run.entries() {
        let condition = entry.condition.clone().unwrap_or_default();
        bar.set_message(format!("{} {}", condition, target.name));
        conditions.insert(condition.clone());
        targets.insert(target.name.clone());

        match stream_into(&entry.path, RegionDistribution::new(target, region)) {
            Ok(result) => {
                stats.insert((condition, target.name.clone()), result);
            }
            Err(e) => warn!("Skipping target {} ({}): {}", target.name, condition, e),
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    for condition in &conditions {
        let n = stats.keys().filter(|(c, _)| c == condition).count();
        info!("Condition {} with {} targets", condition, n);
    }

    for (w, path) in proportion_paths.iter().enumerate() {
        let (from, to) = windows[w];
        let mut report = ReportWriter::create(path)?;
        report.comment(&format!(
            "proportion of the chromosome's signal (and error) in [{}, {}) for all targets and conditions",
            from, to
        ))?;
        report.comment("Column 1: name of target")?;
        for (c, condition) in conditions.iter().enumerate() {
            report.comment(&format!(
                "Columns {} and {}: proportion and error for condition {}",
                2 * c + 2,
                2 * c + 3,
                condition
            ))?;
        }

        for target in &targets {
            let mut line = target.clone();
            for condition in &conditions {
                match stats.get(&(condition.clone(), target.clone())) {
                    Some(s) => line.push_str(&format!(
                        "\t{}\t{}",
                        s.windows[w].proportion, s.windows[w].error
                    )),
                    None => line.push_str("\t0\t0"),
                }
            }
            report.row(&line)?;
        }
        report.finish()?;
    }

    let mut report = ReportWriter::create(&boxplot_path)?;
    report.comment(
        "Groups of five columns give the values to draw box plots (lower whisker, Q1, median, Q3, upper whisker)",
    )?;
    report.comment("Column 1: name of target")?;
    for (c, condition) in conditions.iter().enumerate() {
        report.comment(&format!(
            "Columns {} to {}: boxplot values for condition {}",
            5 * c + 2,
            5 * c + 6,
            condition
        ))?;
    }
    for target in &targets {
        let mut line = target.clone();
        for condition in &conditions {
            match stats.get(&(condition.clone(), target.clone())) {
                Some(s) => {
                    for value in s.boxplot.as_array() {
                        line.push_str(&format!("\t{}", value));
                    }
                }
                None => line.push_str("\t0\t0\t0\t0\t0"),
            }
        }
        report.row(&line)?;
    }
    report.finish()?;

    info!(
        "Wrote {} targets x {} conditions to {}*.dat",
        targets.len(),
        conditions.len(),
        prefix
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    fn get_test_path(file_name: &str) -> PathBuf {
        std::env::current_dir()
            .unwrap()
            .join("../tests/data")
            .join(file_name)
    }

    #[rstest]
    fn test_read_stats_reports() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = format!("{}/run_", dir.path().display());
        let targets = get_test_path("targets.bed");
        let inputs = get_test_path("inputs.txt");

        let matches = crate::build_parser()
            .try_get_matches_from([
                "capstat",
                "read-stats",
                "-t",
                targets.to_str().unwrap(),
                "-f",
                inputs.to_str().unwrap(),
                "-o",
                prefix.as_str(),
            ])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        run_read_stats(sub).unwrap();

        for name in [
            "prpn0to30M.dat",
            "prpn0to10M.dat",
            "prpn10to20M.dat",
            "prpn20to30M.dat",
            "boxplotTo30M.dat",
        ] {
            assert!(dir.path().join(format!("run_{}", name)).exists(), "{}", name);
        }

        let full = std::fs::read_to_string(dir.path().join("run_prpn0to30M.dat")).unwrap();
        let rows: Vec<&str> = full.lines().filter(|l| !l.starts_with('#')).collect();
        assert_eq!(rows, vec!["probeA\t1\t0\t1\t0", "probeC\t1\t0\t0\t0"]);

        let boxplot = std::fs::read_to_string(dir.path().join("run_boxplotTo30M.dat")).unwrap();
        let probe_c = boxplot.lines().find(|l| l.starts_with("probeC")).unwrap();
        assert!(probe_c.ends_with("\t0\t0\t0\t0\t0"));

        // every output already exists now
        assert!(run_read_stats(sub).is_err());
    }

    #[rstest]
    fn test_inverted_region_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = format!("{}/run_", dir.path().display());
        let targets = get_test_path("targets.bed");
        let inputs = get_test_path("inputs.txt");

        let matches = crate::build_parser()
            .try_get_matches_from([
                "capstat",
                "read-stats",
                "-t",
                targets.to_str().unwrap(),
                "-f",
                inputs.to_str().unwrap(),
                "-o",
                prefix.as_str(),
                "--region-start",
                "30000000",
                "--region-end",
                "10",
            ])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();

        assert!(run_read_stats(sub).is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[rstest]
    #[case(0, "0")]
    #[case(10_000_000, "10")]
    #[case(30_000_000, "30")]
    #[case(2_500_000, "2.5")]
    fn test_mb_label(#[case] bp: u64, #[case] expected: &str) {
        assert_eq!(mb_label(bp), expected);
    }
}
