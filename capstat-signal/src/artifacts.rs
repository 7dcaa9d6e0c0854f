//! Cross-replicate artifact detection.
//!
//! Replicate tracks are joined on the exact `(chrom, start, end)` of their bins. A value is
//! an artifact when it is more than `factor` times larger than the mean of the remaining
//! replicates, where bins absent from a replicate count as zero.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use capstat_core::models::{GenomicInterval, SignalInterval};
use log::warn;

use crate::accumulator::SignalAccumulator;
use crate::config::ArtifactParams;
use crate::errors::{ConfigError, ConfigResult};

/// Join key of a bin across replicates.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CoordinateKey {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
}

impl CoordinateKey {
    pub fn of<G: GenomicInterval + ?Sized>(interval: &G) -> Self {
        CoordinateKey {
            chrom: interval.chrom().to_string(),
            start: interval.start(),
            end: interval.end(),
        }
    }
}

///
/// Named replicate tracks joined by coordinate.
///
/// Each row holds one slot per replicate, `None` where that replicate has no bin.
///
#[derive(Debug, Clone)]
pub struct ReplicateSet {
    names: Vec<String>,
    rows: BTreeMap<CoordinateKey, Vec<Option<f64>>>,
}

impl ReplicateSet {
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> ConfigResult<Self> {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.len() < 2 {
            return Err(ConfigError::TooFewReplicates(names.len()));
        }

        let mut seen = HashSet::new();
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(ConfigError::DuplicateReplicate(name.clone()));
            }
        }

        Ok(ReplicateSet {
            names,
            rows: BTreeMap::new(),
        })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn n_replicates(&self) -> usize {
        self.names.len()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Number of distinct coordinates across all replicates.
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    ///
    /// Record `interval` for replicate `replicate`.
    ///
    /// A coordinate seen twice in the same replicate is a join key collision: the later value
    /// replaces the earlier one and a warning is logged.
    ///
    /// # Panics
    /// If `replicate` is not a valid replicate index.
    ///
    pub fn insert(&mut self, replicate: usize, interval: &SignalInterval) {
        assert!(replicate < self.names.len(), "replicate index out of range");

        let n = self.names.len();
        let key = CoordinateKey::of(interval);
        let row = self.rows.entry(key).or_insert_with(|| vec![None; n]);

        if let Some(previous) = row[replicate].replace(interval.value()) {
            warn!(
                "JoinKeyCollision: {}:{}-{} appears more than once in replicate {} ({} replaced by {})",
                interval.chrom(),
                interval.start(),
                interval.end(),
                self.names[replicate],
                previous,
                interval.value()
            );
        }
    }

    /// Accumulator that loads one replicate's track into the set.
    pub fn loader(&mut self, replicate: usize) -> ReplicateLoader<'_> {
        ReplicateLoader {
            set: self,
            replicate,
            loaded: 0,
        }
    }
}

/// Finishes with the number of intervals loaded.
pub struct ReplicateLoader<'a> {
    set: &'a mut ReplicateSet,
    replicate: usize,
    loaded: u64,
}

impl SignalAccumulator for ReplicateLoader<'_> {
    type Output = u64;

    fn consume(&mut self, interval: &SignalInterval) {
        self.set.insert(self.replicate, interval);
        self.loaded += 1;
    }

    fn finish(self) -> u64 {
        self.loaded
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArtifactDetector {
    factor: f64,
}

impl ArtifactDetector {
    pub fn new(factor: f64) -> ConfigResult<Self> {
        if !(factor > 0.0 && factor.is_finite()) {
            return Err(ConfigError::InvalidFactor(factor));
        }
        Ok(ArtifactDetector { factor })
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    ///
    /// Whether `values[replicate]` is an artifact within its row.
    ///
    /// The rest mean divides by the full replicate count, not by `n - 1`. A positive value
    /// against an all-zero rest is always flagged.
    ///
    pub fn is_outlier(&self, values: &[f64], replicate: usize) -> bool {
        let row_sum: f64 = values.iter().sum();
        let value = values[replicate];
        let mean_of_rest = (row_sum - value) / values.len() as f64;
        value > self.factor * mean_of_rest
    }

    pub fn detect(&self, set: &ReplicateSet) -> ArtifactCalls {
        let mut flagged = vec![BTreeSet::new(); set.n_replicates()];
        let mut values = vec![0.0; set.n_replicates()];

        for (key, row) in &set.rows {
            for (slot, value) in values.iter_mut().zip(row) {
                *slot = value.unwrap_or(0.0);
            }
            for (replicate, calls) in flagged.iter_mut().enumerate() {
                if self.is_outlier(&values, replicate) {
                    calls.insert(key.clone());
                }
            }
        }

        ArtifactCalls {
            names: set.names.clone(),
            flagged,
        }
    }
}

impl TryFrom<&ArtifactParams> for ArtifactDetector {
    type Error = ConfigError;

    fn try_from(params: &ArtifactParams) -> ConfigResult<Self> {
        ArtifactDetector::new(params.factor)
    }
}

/// Flagged coordinates per replicate.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactCalls {
    names: Vec<String>,
    flagged: Vec<BTreeSet<CoordinateKey>>,
}

impl ArtifactCalls {
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_flagged<G: GenomicInterval + ?Sized>(&self, replicate: usize, interval: &G) -> bool {
        self.flagged
            .get(replicate)
            .is_some_and(|calls| calls.contains(&CoordinateKey::of(interval)))
    }

    pub fn flagged(&self, replicate: usize) -> impl Iterator<Item = &CoordinateKey> {
        self.flagged.get(replicate).into_iter().flatten()
    }

    pub fn count(&self, replicate: usize) -> usize {
        self.flagged.get(replicate).map_or(0, BTreeSet::len)
    }

    pub fn total(&self) -> usize {
        self.flagged.iter().map(BTreeSet::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::accumulator::accumulate;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn iv(start: u64, value: f64) -> SignalInterval {
        SignalInterval::new("chr1", start, start + 100, value).unwrap()
    }

    #[fixture]
    fn spiked() -> ReplicateSet {
        let mut set = ReplicateSet::new(["A", "B", "C"]).unwrap();
        set.insert(0, &iv(0, 100.0));
        set.insert(1, &iv(0, 1.0));
        set.insert(2, &iv(0, 1.0));
        set
    }

    #[rstest]
    #[case(10.0, vec![1, 0, 0])]
    #[case(200.0, vec![0, 0, 0])]
    fn test_spike_detection(spiked: ReplicateSet, #[case] factor: f64, #[case] expected: Vec<usize>) {
        let calls = ArtifactDetector::new(factor).unwrap().detect(&spiked);
        let counts: Vec<usize> = (0..3).map(|r| calls.count(r)).collect();
        assert_eq!(counts, expected);
    }

    #[rstest]
    fn test_missing_entries_count_as_zero() {
        let mut set = ReplicateSet::new(["A", "B"]).unwrap();
        set.insert(0, &iv(0, 0.5));
        set.insert(0, &iv(100, 2.0));
        set.insert(1, &iv(100, 2.0));

        let calls = ArtifactDetector::new(10.0).unwrap().detect(&set);
        assert!(calls.is_flagged(0, &iv(0, 0.0)));
        assert!(!calls.is_flagged(0, &iv(100, 0.0)));
        assert_eq!(calls.total(), 1);
        assert_eq!(set.n_rows(), 2);
    }

    #[rstest]
    fn test_all_zero_row_is_not_flagged() {
        let mut set = ReplicateSet::new(["A", "B"]).unwrap();
        set.insert(0, &iv(0, 0.0));
        set.insert(1, &iv(0, 0.0));

        let calls = ArtifactDetector::new(10.0).unwrap().detect(&set);
        assert_eq!(calls.total(), 0);
    }

    #[rstest]
    fn test_rest_mean_uses_full_replicate_count() {
        let detector = ArtifactDetector::new(2.0).unwrap();
        // rest mean is (3 + 3) / 3 = 2, so 4.5 > 4 is flagged; with n-1 it would not be
        assert!(detector.is_outlier(&[4.5, 3.0, 3.0], 0));
        assert!(!detector.is_outlier(&[3.9, 3.0, 3.0], 0));
    }

    #[rstest]
    fn test_collision_keeps_later_value() {
        let mut set = ReplicateSet::new(["A", "B"]).unwrap();
        set.insert(0, &iv(0, 100.0));
        set.insert(0, &iv(0, 1.0));
        set.insert(1, &iv(0, 1.0));

        let calls = ArtifactDetector::new(10.0).unwrap().detect(&set);
        assert_eq!(calls.total(), 0);
    }

    #[rstest]
    fn test_loader() {
        let mut set = ReplicateSet::new(["A", "B"]).unwrap();
        let loaded = accumulate(set.loader(1), vec![iv(0, 1.0), iv(100, 1.0)]);
        assert_eq!(loaded, 2);
        assert_eq!(set.n_rows(), 2);
        assert_eq!(set.index_of("B"), Some(1));
        assert_eq!(set.index_of("Z"), None);
    }

    #[rstest]
    fn test_replicate_validation() {
        assert!(matches!(
            ReplicateSet::new(["A"]),
            Err(ConfigError::TooFewReplicates(1))
        ));
        assert!(matches!(
            ReplicateSet::new(["A", "B", "A"]),
            Err(ConfigError::DuplicateReplicate(name)) if name == "A"
        ));
    }

    #[rstest]
    #[case(0.0)]
    #[case(-1.0)]
    #[case(f64::NAN)]
    fn test_invalid_factor(#[case] factor: f64) {
        assert!(matches!(
            ArtifactDetector::new(factor),
            Err(ConfigError::InvalidFactor(_))
        ));
    }
}
