use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::str::FromStr;
use std::sync::OnceLock;

use crate::errors::ParseError;
use crate::utils::LineTokenizer;

///
/// Anything with a chromosome and a half-open `[start, end)` span.
///
/// The midpoint is the reference point for every distance computed in capstat.
///
pub trait GenomicInterval {
    fn chrom(&self) -> &str;
    fn start(&self) -> u64;
    fn end(&self) -> u64;

    /// `(start + end) / 2`, in bp. May be fractional.
    fn midpoint(&self) -> f64;

    fn width(&self) -> u64 {
        self.end() - self.start()
    }

    fn same_chrom<G: GenomicInterval + ?Sized>(&self, other: &G) -> bool {
        self.chrom() == other.chrom()
    }

    /// Absolute midpoint-to-midpoint separation.
    fn separation<G: GenomicInterval + ?Sized>(&self, other: &G) -> f64 {
        (self.midpoint() - other.midpoint()).abs()
    }
}

pub(crate) fn compute_midpoint(start: u64, end: u64) -> f64 {
    0.5 * (start as f64 + end as f64)
}

///
/// One bedGraph record: a bin on `chrom` carrying a pileup value.
///
/// Equality and ordering only look at `(chrom, start, end)`; the value is payload.
///
#[derive(Debug, Clone)]
pub struct SignalInterval {
    chrom: String,
    start: u64,
    end: u64,
    value: f64,
    midpoint: OnceLock<f64>,
}

impl SignalInterval {
    pub fn new<S: Into<String>>(
        chrom: S,
        start: u64,
        end: u64,
        value: f64,
    ) -> Result<Self, ParseError> {
        if start >= end {
            return Err(ParseError::InvalidInterval { start, end });
        }
        Ok(SignalInterval {
            chrom: chrom.into(),
            start,
            end,
            value,
            midpoint: OnceLock::new(),
        })
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// `chrom\tstart\tend\tvalue`
    pub fn as_string(&self) -> String {
        format!("{}\t{}\t{}\t{}", self.chrom, self.start, self.end, self.value)
    }
}

impl GenomicInterval for SignalInterval {
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

impl FromStr for SignalInterval {
    type Err = ParseError;

    /// Parse a `chrom start end value` line. Columns past the fourth are ignored.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut tokens = LineTokenizer::new(line);
        let chrom = tokens.next_str("chrom")?;
        let start = tokens.next_u64("start")?;
        let end = tokens.next_u64("end")?;
        let value = tokens.next_f64("value")?;

        SignalInterval::new(chrom, start, end, value)
    }
}

impl Display for SignalInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

impl Ord for SignalInterval {
    #[inline]
    fn cmp(&self, other: &SignalInterval) -> Ordering {
        self.chrom
            .cmp(&other.chrom)
            .then(self.start.cmp(&other.start))
            .then(self.end.cmp(&other.end))
    }
}

impl PartialOrd for SignalInterval {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SignalInterval {
    #[inline]
    fn eq(&self, other: &SignalInterval) -> bool {
        self.chrom == other.chrom && self.start == other.start && self.end == other.end
    }
}

impl Eq for SignalInterval {}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_parse_bedgraph_line() {
        let iv: SignalInterval = "chr1\t1000\t2000\t3.25".parse().unwrap();
        assert_eq!(iv.chrom(), "chr1");
        assert_eq!(iv.start(), 1000);
        assert_eq!(iv.end(), 2000);
        assert_eq!(iv.value(), 3.25);
        assert_eq!(iv.width(), 1000);
    }

    #[rstest]
    fn test_parse_tolerates_spaces_and_extra_columns() {
        let iv: SignalInterval = "chr2  10 20   0.5 extra".parse().unwrap();
        assert_eq!(iv.as_string(), "chr2\t10\t20\t0.5");
    }

    #[rstest]
    #[case("chr1\t10\t20", ParseError::MissingField("value"))]
    #[case("chr1\tten\t20\t1", ParseError::InvalidInteger { field: "start", value: "ten".to_string() })]
    #[case("chr1\t10\t20\tNaNish", ParseError::InvalidFloat { field: "value", value: "NaNish".to_string() })]
    #[case("chr1\t20\t20\t1", ParseError::InvalidInterval { start: 20, end: 20 })]
    fn test_parse_errors(#[case] line: &str, #[case] expected: ParseError) {
        assert_eq!(line.parse::<SignalInterval>().unwrap_err(), expected);
    }

    #[rstest]
    fn test_midpoint_is_stable() {
        let iv = SignalInterval::new("chr1", 10, 21, 1.0).unwrap();
        let first = iv.midpoint();
        assert_eq!(first, 15.5);
        assert_eq!(iv.midpoint(), first);
        assert_eq!(iv.clone().midpoint(), first);
    }

    #[rstest]
    fn test_ordering_ignores_value() {
        let a = SignalInterval::new("chr1", 10, 20, 1.0).unwrap();
        let b = SignalInterval::new("chr1", 10, 20, 9.0).unwrap();
        let c = SignalInterval::new("chr1", 10, 30, 0.0).unwrap();
        let d = SignalInterval::new("chr2", 0, 5, 0.0).unwrap();

        assert_eq!(a, b);
        let mut sorted = vec![d.clone(), c.clone(), a.clone()];
        sorted.sort();
        assert_eq!(sorted, vec![a, c, d]);
    }

    #[rstest]
    fn test_separation() {
        let a = SignalInterval::new("chr1", 0, 100, 1.0).unwrap();
        let b = SignalInterval::new("chr1", 1000, 1100, 1.0).unwrap();
        assert_eq!(a.separation(&b), 1000.0);
        assert_eq!(b.separation(&a), 1000.0);
        assert!(a.same_chrom(&b));
    }
}
