//! Distance-decay profile of the signal in logarithmically spaced bins.
//!
//! One [`LogSeparationProfile`] is pooled over every target of a run. Each target streams its
//! track through a [`TargetLogAccumulator`] borrowed from the profile.

use std::collections::BTreeMap;

use capstat_core::models::{SignalInterval, Target};

use crate::accumulator::SignalAccumulator;
use crate::classifier::{LogBin, LogBinning};

/// Output values are multiplied by this factor before reporting.
pub const OUTPUT_SCALE: f64 = 1000.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct BinStats {
    sum: f64,
    sum_sq: f64,
    count: u64,
}

/// One reported bin, in ascending center order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogSeparationRow {
    pub log_center: f64,
    /// `ln(mean * 1000)`
    pub log_mean: f64,
    /// `stderr / mean`
    pub relative_error: f64,
    pub center: f64,
    /// `mean * 1000`
    pub mean: f64,
}

impl LogSeparationRow {
    pub fn as_string(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}",
            self.log_center, self.log_mean, self.relative_error, self.center, self.mean
        )
    }
}

#[derive(Debug, Clone)]
pub struct LogSeparationProfile {
    binning: LogBinning,
    bins: BTreeMap<i64, BinStats>,
}

impl LogSeparationProfile {
    pub fn new(binning: LogBinning) -> Self {
        LogSeparationProfile {
            binning,
            bins: BTreeMap::new(),
        }
    }

    pub fn binning(&self) -> &LogBinning {
        &self.binning
    }

    /// Add one interval, measured from `target`. Returns whether it landed in a bin.
    pub fn add(&mut self, target: &Target, interval: &SignalInterval) -> bool {
        let Some(bin) = self.binning.classify(target, interval) else {
            return false;
        };
        let density = interval.value() / bin.physical_width();

        let stats = self.bins.entry(bin.index).or_default();
        stats.sum += density;
        stats.sum_sq += density * density;
        stats.count += 1;
        true
    }

    pub fn for_target<'p, 't>(&'p mut self, target: &'t Target) -> TargetLogAccumulator<'p, 't> {
        TargetLogAccumulator {
            profile: self,
            target,
            binned: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn rows(&self) -> Vec<LogSeparationRow> {
        let log_width = self.binning.log_width();
        self.bins
            .iter()
            .map(|(&index, stats)| {
                let center = LogBin { index, log_width }.center();
                let count = stats.count as f64;
                let mean = stats.sum / count;
                let variance = (stats.sum_sq / count - mean * mean).max(0.0);
                let stderr = variance.sqrt() / count.sqrt();

                LogSeparationRow {
                    log_center: center.ln(),
                    log_mean: (mean * OUTPUT_SCALE).ln(),
                    relative_error: stderr / mean,
                    center,
                    mean: mean * OUTPUT_SCALE,
                }
            })
            .collect()
    }
}

/// Streams one target's track into a shared profile. Finishes with the number of binned intervals.
pub struct TargetLogAccumulator<'p, 't> {
    profile: &'p mut LogSeparationProfile,
    target: &'t Target,
    binned: u64,
}

impl SignalAccumulator for TargetLogAccumulator<'_, '_> {
    type Output = u64;

    fn consume(&mut self, interval: &SignalInterval) {
        if self.profile.add(self.target, interval) {
            self.binned += 1;
        }
    }

    fn finish(self) -> u64 {
        self.binned
    }
}
