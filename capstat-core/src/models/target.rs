use std::fmt::{self, Display};
use std::str::FromStr;
use std::sync::OnceLock;

use crate::errors::ParseError;
use crate::models::interval::{GenomicInterval, compute_midpoint};
use crate::utils::LineTokenizer;

/// Strand of a capture target. Anything other than `+` or `-` is neutral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Plus,
    Minus,
    Neutral,
}

impl From<&str> for Strand {
    fn from(value: &str) -> Self {
        match value {
            "+" => Strand::Plus,
            "-" => Strand::Minus,
            _ => Strand::Neutral,
        }
    }
}

impl Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Strand::Plus => "+",
            Strand::Minus => "-",
            Strand::Neutral => ".",
        };
        write!(f, "{}", symbol)
    }
}

///
/// A named capture target (viewpoint), read from a `chrom start end name strand` BED line.
///
/// Targets only serve as a reference midpoint and a chromosome filter.
///
#[derive(Debug, Clone)]
pub struct Target {
    pub name: String,
    pub strand: Strand,
    chrom: String,
    start: u64,
    end: u64,
    midpoint: OnceLock<f64>,
}

impl Target {
    pub fn new<S: Into<String>, N: Into<String>>(
        chrom: S,
        start: u64,
        end: u64,
        name: N,
        strand: Strand,
    ) -> Result<Self, ParseError> {
        if start >= end {
            return Err(ParseError::InvalidInterval { start, end });
        }
        Ok(Target {
            name: name.into(),
            strand,
            chrom: chrom.into(),
            start,
            end,
            midpoint: OnceLock::new(),
        })
    }

    /// `chrom\tstart\tend\tname`, the leading columns of every per-target report row.
    pub fn as_string(&self) -> String {
        format!("{}\t{}\t{}\t{}", self.chrom, self.start, self.end, self.name)
    }
}

impl GenomicInterval for Target {
    fn chrom(&self) -> &str {
        &self.chrom
    }

    fn start(&self) -> u64 {
        self.start
    }

    fn end(&self) -> u64 {
        self.end
    }

    fn midpoint(&self) -> f64 {
        *self
            .midpoint
            .get_or_init(|| compute_midpoint(self.start, self.end))
    }
}

impl FromStr for Target {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut tokens = LineTokenizer::new(line);
        let chrom = tokens.next_str("chrom")?;
        let start = tokens.next_u64("start")?;
        let end = tokens.next_u64("end")?;
        let name = tokens.next_str("name")?;
        let strand = tokens.next_opt_str().map(Strand::from).unwrap_or(Strand::Neutral);

        Target::new(chrom, start, end, name, strand)
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.as_string(), self.strand)
    }
}
