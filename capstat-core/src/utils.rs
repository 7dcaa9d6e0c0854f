use std::ffi::OsStr;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use std::str::{FromStr, SplitWhitespace};

use flate2::read::MultiGzDecoder;

use crate::errors::ParseError;

///
/// Get a reader for either a gzip'd or non-gzip'd file.
///
/// # Arguments
///
/// - path: path to the file to read
///
pub fn get_dynamic_reader(path: &Path) -> io::Result<BufReader<Box<dyn Read>>> {
    let is_gzipped = path.extension() == Some(OsStr::new("gz"));
    let file = File::open(path)?;
    let file: Box<dyn Read> = match is_gzipped {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    Ok(BufReader::new(file))
}

/// Lines that carry no record: blank lines, `#` comments and UCSC `track`/`browser` headers.
pub fn is_header_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.is_empty()
        || trimmed.starts_with('#')
        || trimmed.starts_with("track")
        || trimmed.starts_with("browser")
}

///
/// Whitespace tokenizer for one record line. Every field is requested by name so that
/// a malformed line reports exactly which column was missing or unparsable.
///
pub struct LineTokenizer<'a> {
    fields: SplitWhitespace<'a>,
}

impl<'a> LineTokenizer<'a> {
    pub fn new(line: &'a str) -> Self {
        LineTokenizer {
            fields: line.split_whitespace(),
        }
    }

    pub fn next_str(&mut self, field: &'static str) -> Result<&'a str, ParseError> {
        self.fields.next().ok_or(ParseError::MissingField(field))
    }

    pub fn next_opt_str(&mut self) -> Option<&'a str> {
        self.fields.next()
    }

    pub fn next_u64(&mut self, field: &'static str) -> Result<u64, ParseError> {
        let raw = self.next_str(field)?;
        u64::from_str(raw).map_err(|_| ParseError::InvalidInteger {
            field,
            value: raw.to_string(),
        })
    }

    pub fn next_f64(&mut self, field: &'static str) -> Result<f64, ParseError> {
        let raw = self.next_str(field)?;
        f64::from_str(raw).map_err(|_| ParseError::InvalidFloat {
            field,
            value: raw.to_string(),
        })
    }

    /// Everything left on the line, re-joined with tabs.
    pub fn rest(self) -> Option<String> {
        let rest: Vec<&str> = self.fields.collect();
        Some(rest.join("\t")).filter(|s| !s.is_empty())
    }
}
