use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use capstat_core::errors::ParseError;
use capstat_core::models::SignalInterval;
use capstat_core::utils::{LineTokenizer, is_header_line};

use crate::bedgraph::open_lines;
use crate::error::{CapstatIoError, Result};

///
/// Create `path` for writing, failing with [`CapstatIoError::OutputExists`] if it is
/// already there.
///
/// The existence check and the creation are one atomic `create_new` open, so an existing
/// file is never truncated.
///
pub fn create_output(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => CapstatIoError::OutputExists(path.to_path_buf()),
            _ => CapstatIoError::Io(e),
        })?;

    Ok(BufWriter::new(file))
}

/// Fail on the first of `paths` that already exists. Used before multi-file reports.
pub fn ensure_absent<P: AsRef<Path>>(paths: &[P]) -> Result<()> {
    for path in paths {
        let path = path.as_ref();
        if path.exists() {
            return Err(CapstatIoError::OutputExists(path.to_path_buf()));
        }
    }
    Ok(())
}

///
/// Tab-separated report: `#` header lines followed by data rows.
///
/// ```rust,no_run
/// use std::path::Path;
/// use capstat_io::ReportWriter;
///
/// let mut report = ReportWriter::create(Path::new("directionality.tsv")).unwrap();
/// report.comment("min_dist=3000 max_dist=500000").unwrap();
/// report.columns(&["chrom", "start", "end", "name", "directionality", "error"]).unwrap();
/// report.row("chr1\t99000\t101000\tprobeA\t0.12\t0.01").unwrap();
/// report.finish().unwrap();
/// ```
///
pub struct ReportWriter<W: Write> {
    writer: W,
    path: PathBuf,
    rows: usize,
}

impl ReportWriter<BufWriter<File>> {
    pub fn create(path: &Path) -> Result<Self> {
        Ok(ReportWriter::new(create_output(path)?, path))
    }
}

impl<W: Write> ReportWriter<W> {
    pub fn new<P: Into<PathBuf>>(writer: W, path: P) -> Self {
        ReportWriter {
            writer,
            path: path.into(),
            rows: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn comment(&mut self, text: &str) -> Result<()> {
        writeln!(self.writer, "# {}", text)?;
        Ok(())
    }

    /// Column names as a `#` header line.
    pub fn columns(&mut self, names: &[&str]) -> Result<()> {
        self.comment(&names.join("\t"))
    }

    pub fn row(&mut self, line: &str) -> Result<()> {
        writeln!(self.writer, "{}", line)?;
        self.rows += 1;
        Ok(())
    }

    /// Flush and return the number of data rows written.
    pub fn finish(mut self) -> Result<usize> {
        self.writer.flush()?;
        Ok(self.rows)
    }
}

fn parse_directionality_row(line: &str) -> std::result::Result<SignalInterval, ParseError> {
    let mut tokens = LineTokenizer::new(line);
    let chrom = tokens.next_str("chrom")?;
    let start = tokens.next_u64("start")?;
    let end = tokens.next_u64("end")?;
    tokens.next_str("name")?;
    let directionality = tokens.next_f64("directionality")?;

    SignalInterval::new(chrom, start, end, directionality)
}

///
/// Read a directionality report back as one interval per target, carrying the score as its
/// value. Columns after the score are ignored.
///
pub fn read_directionality_report(path: &Path) -> Result<Vec<SignalInterval>> {
    let mut rows = Vec::new();
    for (i, line) in open_lines(path)?.enumerate() {
        let line = line?;
        if is_header_line(&line) {
            continue;
        }
        let row = parse_directionality_row(&line).map_err(|source| CapstatIoError::Track {
            path: path.to_path_buf(),
            line: i + 1,
            source,
        })?;
        rows.push(row);
    }
    Ok(rows)
}
