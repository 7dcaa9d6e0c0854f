use std::io::{self, BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

use capstat_core::models::{GenomicInterval, SignalInterval};
use capstat_core::utils::{get_dynamic_reader, is_header_line};
use capstat_signal::artifacts::ArtifactCalls;
use tempfile::NamedTempFile;

use crate::error::{CapstatIoError, Result, open_error};

///
/// A rewritten track held in a temporary file next to its destination.
///
/// Nothing appears at the destination until [`commit`](StagedTrack::commit) succeeds, so a
/// failed rewrite never leaves a partial output behind.
///
pub struct StagedTrack {
    file: NamedTempFile,
    output: PathBuf,
    zeroed: usize,
}

impl StagedTrack {
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Number of bins that were set to zero.
    pub fn zeroed(&self) -> usize {
        self.zeroed
    }

    /// Move the staged file to its destination without replacing an existing file.
    pub fn commit(self) -> Result<usize> {
        let output = self.output;
        self.file.persist_noclobber(&output).map_err(|e| match e.error.kind() {
            io::ErrorKind::AlreadyExists => CapstatIoError::OutputExists(output.clone()),
            _ => CapstatIoError::Io(e.error),
        })?;
        Ok(self.zeroed)
    }
}

/// Directory `output` will be written to. It must already exist.
pub fn output_dir(output: &Path) -> Result<&Path> {
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !dir.is_dir() {
        return Err(CapstatIoError::OutputDirNotFound(dir.to_path_buf()));
    }
    Ok(dir)
}

///
/// Rewrite one replicate's raw track into a temporary file beside `output`, zeroing every
/// flagged bin.
///
/// Lines keep their original order. Flagged records become `chrom\tstart\tend\t0`; every
/// other line, headers included, is written byte for byte.
///
pub fn stage_rewrite(
    input: &Path,
    output: &Path,
    calls: &ArtifactCalls,
    replicate: usize,
) -> Result<StagedTrack> {
    if output.exists() {
        return Err(CapstatIoError::OutputExists(output.to_path_buf()));
    }
    let dir = output_dir(output)?;

    let reader = get_dynamic_reader(input).map_err(|e| open_error(input, e))?;
    let file = NamedTempFile::new_in(dir)?;

    let mut writer = BufWriter::new(file.as_file());
    let zeroed = rewrite_lines(reader, &mut writer, input, calls, replicate)?;
    writer.flush()?;
    drop(writer);

    Ok(StagedTrack {
        file,
        output: output.to_path_buf(),
        zeroed,
    })
}

/// Rewrite `input` to `output` and return the number of zeroed bins.
pub fn rewrite_track(
    input: &Path,
    output: &Path,
    calls: &ArtifactCalls,
    replicate: usize,
) -> Result<usize> {
    stage_rewrite(input, output, calls, replicate)?.commit()
}

fn rewrite_lines<R: BufRead, W: Write>(
    reader: R,
    writer: &mut W,
    input: &Path,
    calls: &ArtifactCalls,
    replicate: usize,
) -> Result<usize> {
    let mut zeroed = 0;

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if is_header_line(&line) {
            writeln!(writer, "{}", line)?;
            continue;
        }

        let interval: SignalInterval = line.parse().map_err(|source| CapstatIoError::Track {
            path: input.to_path_buf(),
            line: i + 1,
            source,
        })?;

        if calls.is_flagged(replicate, &interval) {
            writeln!(
                writer,
                "{}\t{}\t{}\t0",
                interval.chrom(),
                interval.start(),
                interval.end()
            )?;
            zeroed += 1;
        } else {
            writeln!(writer, "{}", line)?;
        }
    }

    Ok(zeroed)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use capstat_signal::accumulator::accumulate;
    use capstat_signal::artifacts::{ArtifactDetector, ReplicateSet};
    use pretty_assertions::assert_eq;
    use rstest::*;

    use crate::bedgraph::read_bedgraph;

    fn get_test_path(file_name: &str) -> std::path::PathBuf {
        std::env::current_dir()
            .unwrap()
            .join("../tests/data")
            .join(file_name)
    }

    #[fixture]
    fn calls() -> ArtifactCalls {
        let mut set = ReplicateSet::new(["rep1", "rep2", "rep3"]).unwrap();
        for (i, name) in ["rep1.bdg", "rep2.bdg", "rep3.bdg"].iter().enumerate() {
            let track = read_bedgraph(&get_test_path(name)).unwrap();
            accumulate(set.loader(i), track);
        }
        ArtifactDetector::new(10.0).unwrap().detect(&set)
    }

    #[rstest]
    fn test_fixture_spike_is_flagged(calls: ArtifactCalls) {
        assert_eq!(calls.count(0), 0);
        assert_eq!(calls.count(1), 1);
        assert_eq!(calls.count(2), 0);
    }

    #[rstest]
    fn test_rewrite_keeps_order_and_headers(calls: ArtifactCalls) {
        let raw = std::fs::read_to_string(get_test_path("rep2.bdg")).unwrap();
        let mut out = Vec::new();
        let zeroed = rewrite_lines(
            Cursor::new(raw.as_bytes()),
            &mut out,
            Path::new("rep2.bdg"),
            &calls,
            1,
        )
        .unwrap();

        let expected = raw.replace("chr1\t110000\t120000\t500", "chr1\t110000\t120000\t0");
        assert_eq!(zeroed, 1);
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[rstest]
    fn test_rewrite_track_refuses_existing_output(calls: ArtifactCalls) {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("rep1.clean.bdg");

        let zeroed = rewrite_track(&get_test_path("rep1.bdg"), &output, &calls, 0).unwrap();
        assert_eq!(zeroed, 0);
        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            std::fs::read_to_string(get_test_path("rep1.bdg")).unwrap()
        );

        let again = rewrite_track(&get_test_path("rep1.bdg"), &output, &calls, 0);
        assert!(matches!(again, Err(CapstatIoError::OutputExists(_))));
    }

    #[rstest]
    fn test_malformed_track_leaves_no_output(calls: ArtifactCalls) {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("raw.bdg");
        let output = dir.path().join("out.bdg");
        std::fs::write(&input, "chr1\t0\t10\t1\nchr1\t10\t20\t2\nchr1\t20\tBAD\t3\n").unwrap();

        let first = rewrite_track(&input, &output, &calls, 0);
        assert!(matches!(first, Err(CapstatIoError::Track { line: 3, .. })));
        assert!(!output.exists());
        // only the input is left in the directory
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);

        std::fs::write(&input, "chr1\t0\t10\t1\nchr1\t10\t20\t2\nchr1\t20\t30\t3\n").unwrap();
        assert_eq!(rewrite_track(&input, &output, &calls, 0).unwrap(), 0);
        assert!(output.exists());
    }

    #[rstest]
    fn test_staged_track_commits_on_demand(calls: ArtifactCalls) {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("rep2.clean.bdg");

        let staged = stage_rewrite(&get_test_path("rep2.bdg"), &output, &calls, 1).unwrap();
        assert_eq!(staged.zeroed(), 1);
        assert_eq!(staged.output(), output.as_path());
        assert!(!output.exists());

        assert_eq!(staged.commit().unwrap(), 1);
        assert!(output.exists());
    }

    #[rstest]
    fn test_missing_output_dir(calls: ArtifactCalls) {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("typo").join("rep1.bdg");

        let result = rewrite_track(&get_test_path("rep1.bdg"), &output, &calls, 0);
        assert!(matches!(result, Err(CapstatIoError::OutputDirNotFound(p)) if p == dir.path().join("typo")));
    }
}
