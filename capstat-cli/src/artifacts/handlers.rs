use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ArgMatches;
use log::info;

use capstat_io::{CapstatIoError, ensure_absent, output_dir, stage_rewrite, stream_into};
use capstat_signal::artifacts::{ArtifactDetector, ReplicateSet};

use super::cli::{NORMALIZED_PREFIX, RAW_PREFIX};
use crate::common::{apply_f64, load_config, progress_bar};

struct Replicate {
    name: String,
    normalized: PathBuf,
    raw: PathBuf,
    output: PathBuf,
}

pub fn run_artifacts(matches: &ArgMatches) -> Result<()> {
    let mut config = load_config(matches)?;
    apply_f64(matches, "factor", &mut config.artifacts.factor);
    let detector = ArtifactDetector::try_from(&config.artifacts).context("Invalid factor")?;

    let target = matches
        .get_one::<String>("target")
        .expect("--target is required");

    let replicates: Vec<Replicate> = matches
        .get_occurrences::<String>("replicate")
        .into_iter()
        .flatten()
        .map(|mut pair| {
            let indir = PathBuf::from(pair.next().expect("INDIR"));
            let outdir = PathBuf::from(pair.next().expect("OUTDIR"));
            Replicate {
                name: indir.display().to_string(),
                normalized: indir.join(format!("{}{}.bdg", NORMALIZED_PREFIX, target)),
                raw: indir.join(format!("{}{}.bdg", RAW_PREFIX, target)),
                output: outdir.join(format!("{}{}.bdg", RAW_PREFIX, target)),
            }
        })
        .collect();

    let mut set = ReplicateSet::new(replicates.iter().map(|r| r.name.clone()))
        .context("Invalid replicate list")?;

    let outputs: Vec<&PathBuf> = replicates.iter().map(|r| &r.output).collect();
    ensure_absent(&outputs)?;
    for replicate in &replicates {
        output_dir(&replicate.output)?;
        if !replicate.raw.is_file() {
            return Err(CapstatIoError::FileNotFound(replicate.raw.clone()).into());
        }
    }

    info!(
        "Looking for artifacts in target {} across {} replicates, factor {}",
        target,
        replicates.len(),
        detector.factor()
    );

    let bar = progress_bar(replicates.len());
    for (i, replicate) in replicates.iter().enumerate() {
        bar.set_message(replicate.name.clone());
        stream_into(&replicate.normalized, set.loader(i))
            .with_context(|| format!("Failed to load {}", replicate.normalized.display()))?;
        bar.inc(1);
    }
    bar.finish_and_clear();

    let calls = detector.detect(&set);
    info!(
        "Found {} artifacts in {} joined bins",
        calls.total(),
        set.n_rows()
    );

    // every track is rewritten before any output is moved into place
    let mut staged = Vec::with_capacity(replicates.len());
    for (i, replicate) in replicates.iter().enumerate() {
        let track = stage_rewrite(&replicate.raw, &replicate.output, &calls, i)
            .with_context(|| format!("Failed to rewrite {}", replicate.raw.display()))?;
        staged.push(track);
    }

    for (replicate, track) in replicates.iter().zip(staged) {
        let zeroed = track.commit()?;
        info!(
            "{}: zeroed {} bins, written to {}",
            replicate.name,
            zeroed,
            replicate.output.display()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::Path;

    use pretty_assertions::assert_eq;
    use rstest::*;

    fn get_test_path(file_name: &str) -> PathBuf {
        std::env::current_dir()
            .unwrap()
            .join("../tests/data")
            .join(file_name)
    }

    fn stage_replicate(root: &Path, name: &str, fixture: &str) -> PathBuf {
        let indir = root.join(name);
        std::fs::create_dir_all(&indir).unwrap();
        for prefix in [NORMALIZED_PREFIX, RAW_PREFIX] {
            std::fs::copy(
                get_test_path(fixture),
                indir.join(format!("{}probeA.bdg", prefix)),
            )
            .unwrap();
        }
        indir
    }

    fn artifacts_args(root: &Path, replicates: &[(&str, &str)]) -> Vec<String> {
        let mut args = vec![
            "capstat".to_string(),
            "artifacts".to_string(),
            "--target".to_string(),
            "probeA".to_string(),
        ];
        for (name, fixture) in replicates {
            let indir = stage_replicate(root, name, fixture);
            args.push("-r".to_string());
            args.push(indir.display().to_string());
            args.push(root.join(format!("{}_out", name)).display().to_string());
        }
        args
    }

    fn make_outdirs(root: &Path, names: &[&str]) {
        for name in names {
            std::fs::create_dir_all(root.join(format!("{}_out", name))).unwrap();
        }
    }

    fn raw_output(root: &Path, name: &str) -> PathBuf {
        root.join(format!("{}_out", name))
            .join(format!("{}probeA.bdg", RAW_PREFIX))
    }

    const REPLICATES: [(&str, &str); 3] =
        [("r1", "rep1.bdg"), ("r2", "rep2.bdg"), ("r3", "rep3.bdg")];

    #[rstest]
    fn test_artifacts_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let args = artifacts_args(dir.path(), &REPLICATES);
        make_outdirs(dir.path(), &["r1", "r2", "r3"]);

        let matches = crate::build_parser().try_get_matches_from(&args).unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        run_artifacts(sub).unwrap();

        let cleaned = std::fs::read_to_string(raw_output(dir.path(), "r2")).unwrap();
        assert!(cleaned.contains("chr1\t110000\t120000\t0\n"));
        assert!(!cleaned.contains("\t500"));

        let untouched = std::fs::read_to_string(raw_output(dir.path(), "r1")).unwrap();
        assert_eq!(
            untouched,
            std::fs::read_to_string(get_test_path("rep1.bdg")).unwrap()
        );

        // outputs exist now, nothing is overwritten
        assert!(run_artifacts(sub).is_err());
    }

    #[rstest]
    fn test_artifacts_requires_output_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let args = artifacts_args(dir.path(), &REPLICATES);
        make_outdirs(dir.path(), &["r1", "r3"]);

        let matches = crate::build_parser().try_get_matches_from(&args).unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        assert!(run_artifacts(sub).is_err());

        assert!(!dir.path().join("r2_out").exists());
        assert!(!raw_output(dir.path(), "r1").exists());
        assert!(!raw_output(dir.path(), "r3").exists());
    }

    #[rstest]
    fn test_missing_raw_track_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let args = artifacts_args(dir.path(), &REPLICATES);
        make_outdirs(dir.path(), &["r1", "r2", "r3"]);
        std::fs::remove_file(dir.path().join("r2").join(format!("{}probeA.bdg", RAW_PREFIX)))
            .unwrap();

        let matches = crate::build_parser().try_get_matches_from(&args).unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        assert!(run_artifacts(sub).is_err());

        for name in ["r1", "r2", "r3"] {
            assert!(!raw_output(dir.path(), name).exists(), "{}", name);
        }
    }

    #[rstest]
    fn test_malformed_raw_track_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let args = artifacts_args(dir.path(), &REPLICATES);
        make_outdirs(dir.path(), &["r1", "r2", "r3"]);
        std::fs::write(
            dir.path().join("r3").join(format!("{}probeA.bdg", RAW_PREFIX)),
            "chr1\t80000\t90000\t6\nchr1\t90000\tBAD\t2\n",
        )
        .unwrap();

        let matches = crate::build_parser().try_get_matches_from(&args).unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        assert!(run_artifacts(sub).is_err());

        for name in ["r1", "r2", "r3"] {
            assert!(!raw_output(dir.path(), name).exists(), "{}", name);
            let leftovers = std::fs::read_dir(dir.path().join(format!("{}_out", name)))
                .unwrap()
                .count();
            assert_eq!(leftovers, 0);
        }

        // a fixed track lets the same command run through
        std::fs::copy(
            get_test_path("rep3.bdg"),
            dir.path().join("r3").join(format!("{}probeA.bdg", RAW_PREFIX)),
        )
        .unwrap();
        run_artifacts(sub).unwrap();
        assert!(raw_output(dir.path(), "r3").exists());
    }

    #[rstest]
    fn test_artifacts_needs_two_replicates() {
        let dir = tempfile::tempdir().unwrap();
        let indir = stage_replicate(dir.path(), "r1", "rep1.bdg");
        let matches = crate::build_parser()
            .try_get_matches_from([
                "capstat".to_string(),
                "artifacts".to_string(),
                "--target".to_string(),
                "probeA".to_string(),
                "-r".to_string(),
                indir.display().to_string(),
                dir.path().join("out").display().to_string(),
            ])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        assert!(run_artifacts(sub).is_err());
    }
}
