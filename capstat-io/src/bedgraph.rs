use std::fs::File;
use std::io::{BufRead, BufReader, Lines, Read};
use std::path::{Path, PathBuf};

use capstat_core::models::SignalInterval;
use capstat_core::utils::{get_dynamic_reader, is_header_line};
use capstat_signal::accumulator::SignalAccumulator;
use log::debug;

use crate::error::{CapstatIoError, Result, open_error};

///
/// Lazily parses a bedGraph stream into [`SignalInterval`]s.
///
/// Blank, `#`, `track` and `browser` lines are skipped. A malformed record is reported
/// with the file name and its 1-based line number.
///
pub struct BedGraphReader<R> {
    lines: Lines<R>,
    path: PathBuf,
    line_number: usize,
}

impl<R: BufRead> BedGraphReader<R> {
    pub fn new<P: Into<PathBuf>>(reader: R, path: P) -> Self {
        BedGraphReader {
            lines: reader.lines(),
            path: path.into(),
            line_number: 0,
        }
    }
}

impl BedGraphReader<BufReader<Box<dyn Read>>> {
    /// Open a plain or `.gz` bedGraph file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let reader = get_dynamic_reader(path).map_err(|e| open_error(path, e))?;
        Ok(BedGraphReader::new(reader, path))
    }
}

impl<R: BufRead> Iterator for BedGraphReader<R> {
    type Item = Result<SignalInterval>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_number += 1;

            if is_header_line(&line) {
                continue;
            }

            return Some(line.parse::<SignalInterval>().map_err(|source| {
                CapstatIoError::Track {
                    path: self.path.clone(),
                    line: self.line_number,
                    source,
                }
            }));
        }
    }
}

///
/// Stream every record of the bedGraph at `path` through `acc` and reduce it.
///
/// The file is read once and never held in memory.
///
pub fn stream_into<A: SignalAccumulator>(path: &Path, mut acc: A) -> Result<A::Output> {
    let mut n = 0usize;
    for interval in BedGraphReader::from_path(path)? {
        acc.consume(&interval?);
        n += 1;
    }
    debug!("Streamed {} intervals from {}", n, path.display());
    Ok(acc.finish())
}

/// Read a whole track into memory, in file order.
pub fn read_bedgraph(path: &Path) -> Result<Vec<SignalInterval>> {
    BedGraphReader::from_path(path)?.collect()
}

/// Open `path` for line-by-line reading, mapping a missing file to `FileNotFound`.
pub(crate) fn open_lines(path: &Path) -> Result<Lines<BufReader<File>>> {
    let file = File::open(path).map_err(|e| open_error(path, e))?;
    Ok(BufReader::new(file).lines())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use capstat_core::errors::ParseError;
    use capstat_core::models::{GenomicInterval, Strand, Target};
    use capstat_signal::directionality::DirectionalityAccumulator;
    use capstat_signal::classifier::DirectionalWindow;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn get_test_path(file_name: &str) -> PathBuf {
        std::env::current_dir()
            .unwrap()
            .join("../tests/data")
            .join(file_name)
    }

    #[rstest]
    fn test_reader_skips_headers() {
        let data = "track type=bedGraph\n# comment\n\nchr1\t0\t10\t1.5\nchr1\t10\t20\t2\n";
        let intervals: Vec<SignalInterval> = BedGraphReader::new(Cursor::new(data), "mem")
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(intervals.len(), 2);
        assert_eq!(intervals[1].value(), 2.0);
    }

    #[rstest]
    fn test_reader_reports_line_number() {
        let data = "chr1\t0\t10\t1.5\n\nchr1\t10\tx\t2\n";
        let err = BedGraphReader::new(Cursor::new(data), "mem.bdg")
            .collect::<Result<Vec<_>>>()
            .unwrap_err();

        match err {
            CapstatIoError::Track { path, line, source } => {
                assert_eq!(path, PathBuf::from("mem.bdg"));
                assert_eq!(line, 3);
                assert_eq!(
                    source,
                    ParseError::InvalidInteger {
                        field: "end",
                        value: "x".to_string()
                    }
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[rstest]
    fn test_missing_file() {
        let result = read_bedgraph(Path::new("no/such/track.bdg"));
        assert!(matches!(result, Err(CapstatIoError::FileNotFound(_))));
    }

    #[rstest]
    fn test_read_fixture_gz() {
        let plain = read_bedgraph(&get_test_path("rep1.bdg")).unwrap();
        let gz = read_bedgraph(&get_test_path("rep1.bdg.gz")).unwrap();
        assert_eq!(plain.len(), 6);
        assert_eq!(plain, gz);
        assert_eq!(plain[0].chrom(), "chr1");
    }

    #[rstest]
    fn test_stream_into_accumulator() {
        let target = Target::new("chr1", 99_000, 101_000, "probe", Strand::Plus).unwrap();
        let window = DirectionalWindow::new(3000.0, 500_000.0).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("track.bdg");
        std::fs::write(
            &path,
            "chr1\t80000\t90000\t5\nchr1\t110000\t120000\t5\nchr2\t0\t10\t1\n",
        )
        .unwrap();

        let result = stream_into(&path, DirectionalityAccumulator::new(&target, window)).unwrap();
        assert_eq!(result.directionality, 0.0);
        assert_eq!(result.total_reads, 10.0);
    }
}
