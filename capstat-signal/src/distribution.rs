//! Per-target distribution of a track over a fixed chromosome region.
//!
//! Besides the boxplot statistics of the zero-padded, normalised value vector, the region is
//! split into thirds and the share of the chromosome's signal falling in each third (and in
//! the whole region) is reported.

use capstat_core::models::{GenomicInterval, SignalInterval, Target};
use log::{debug, warn};

use crate::accumulator::SignalAccumulator;
use crate::config::DistributionParams;
use crate::errors::{ComputationError, ConfigError, ConfigResult};

/// Lower whisker, lower hinge, median, upper hinge, upper whisker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxplotStats {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
}

impl BoxplotStats {
    /// Sentinel used when there is nothing to summarise.
    pub fn nan() -> Self {
        BoxplotStats {
            lower_whisker: f64::NAN,
            q1: f64::NAN,
            median: f64::NAN,
            q3: f64::NAN,
            upper_whisker: f64::NAN,
        }
    }

    pub fn from_values(mut values: Vec<f64>) -> Result<Self, ComputationError> {
        values.sort_by(|a, b| a.total_cmp(b));
        Self::from_sorted(&values)
    }

    ///
    /// Tukey five-number summary of an ascending slice.
    ///
    /// The hinges are the medians of the lower and upper `n / 2` values; for odd `n` the
    /// middle value belongs to neither half. Whiskers are the most extreme values still
    /// inside `1.5 * IQR` of the hinges.
    ///
    pub fn from_sorted(data: &[f64]) -> Result<Self, ComputationError> {
        let n = data.len();
        if n == 0 {
            return Err(ComputationError::EmptyVector);
        }

        let median = sorted_median(data);
        let half = n / 2;
        let (q1, q3) = if half == 0 {
            (median, median)
        } else {
            (sorted_median(&data[..half]), sorted_median(&data[n - half..]))
        };

        let iqr = q3 - q1;
        let lower_fence = q1 - 1.5 * iqr;
        let upper_fence = q3 + 1.5 * iqr;

        let lower_whisker = data
            .iter()
            .copied()
            .find(|&x| x >= lower_fence)
            .unwrap_or(q1);
        let upper_whisker = data
            .iter()
            .rev()
            .copied()
            .find(|&x| x <= upper_fence)
            .unwrap_or(q3);

        Ok(BoxplotStats {
            lower_whisker,
            q1,
            median,
            q3,
            upper_whisker,
        })
    }

    pub fn as_array(&self) -> [f64; 5] {
        [
            self.lower_whisker,
            self.q1,
            self.median,
            self.q3,
            self.upper_whisker,
        ]
    }
}

/// Median of a non-empty ascending slice.
fn sorted_median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

/// Share of the chromosome total falling in `[from, to)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowProportion {
    pub from: u64,
    pub to: u64,
    pub proportion: f64,
    /// `p (1 - p) / sqrt(total)`
    pub error: f64,
}

/// The analysed stretch `[start, end)` of every target chromosome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisRegion {
    start: u64,
    end: u64,
}

impl AnalysisRegion {
    pub fn new(start: u64, end: u64) -> ConfigResult<Self> {
        if start >= end {
            return Err(ConfigError::InvalidOrder {
                lower: "region_start",
                lower_value: start as f64,
                upper: "region_end",
                upper_value: end as f64,
            });
        }
        Ok(AnalysisRegion { start, end })
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn span(&self) -> u64 {
        self.end - self.start
    }

    /// The whole region followed by its three thirds.
    pub fn windows(&self) -> [(u64, u64); 4] {
        let (start, end) = (self.start, self.end);
        let third = self.span() / 3;
        [
            (start, end),
            (start, start + third),
            (start + third, start + 2 * third),
            (start + 2 * third, end),
        ]
    }
}

impl TryFrom<&DistributionParams> for AnalysisRegion {
    type Error = ConfigError;

    fn try_from(params: &DistributionParams) -> ConfigResult<Self> {
        AnalysisRegion::new(params.region_start, params.region_end)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadStats {
    /// Summed signal over the target chromosome.
    pub total: f64,
    /// Intervals whose midpoint fell inside the region.
    pub observed: usize,
    pub padding: usize,
    pub bin_size: Option<u64>,
    pub windows: [WindowProportion; 4],
    pub boxplot: BoxplotStats,
}

///
/// Collects the values of one track on the target chromosome.
///
/// The bin size of the track is inferred as the smallest positive gap between consecutive
/// starts on the same chromosome, and the region is padded with zeros for the bins the track
/// did not report.
///
pub struct RegionDistribution<'a> {
    target: &'a Target,
    region: AnalysisRegion,
    windows: [(u64, u64); 4],
    total: f64,
    window_sums: [f64; 4],
    values: Vec<f64>,
    min_gap: Option<u64>,
    previous_chrom: String,
    previous_start: Option<u64>,
}

impl<'a> RegionDistribution<'a> {
    pub fn new(target: &'a Target, region: AnalysisRegion) -> Self {
        if target.start() < region.end() && target.end() > region.start() {
            warn!(
                "{}: target lies inside the analysed region [{}, {})",
                target.name,
                region.start(),
                region.end()
            );
        }

        RegionDistribution {
            target,
            region,
            windows: region.windows(),
            total: 0.0,
            window_sums: [0.0; 4],
            values: Vec::new(),
            min_gap: None,
            previous_chrom: String::new(),
            previous_start: None,
        }
    }

    fn track_gap(&mut self, interval: &SignalInterval) {
        if self.previous_chrom == interval.chrom() {
            if let Some(previous) = self.previous_start {
                if interval.start() > previous {
                    let gap = interval.start() - previous;
                    self.min_gap = Some(self.min_gap.map_or(gap, |g| g.min(gap)));
                }
            }
        } else {
            self.previous_chrom = interval.chrom().to_string();
        }
        self.previous_start = Some(interval.start());
    }
}

fn contains(window: (u64, u64), position: f64) -> bool {
    position >= window.0 as f64 && position < window.1 as f64
}

impl SignalAccumulator for RegionDistribution<'_> {
    type Output = ReadStats;

    fn consume(&mut self, interval: &SignalInterval) {
        self.track_gap(interval);

        if !self.target.same_chrom(interval) {
            return;
        }

        let value = interval.value();
        let mid = interval.midpoint();
        self.total += value;

        for (window, sum) in self.windows.iter().zip(self.window_sums.iter_mut()) {
            if contains(*window, mid) {
                *sum += value;
            }
        }
        if contains((self.region.start(), self.region.end()), mid) {
            self.values.push(value);
        }
    }

    fn finish(self) -> ReadStats {
        let total = self.total;
        let observed = self.values.len();

        let padding = match self.min_gap {
            Some(bin) => {
                let expected = (self.region.span() as f64 / bin as f64).round();
                (expected as usize).saturating_sub(observed)
            }
            None => 0,
        };

        let mut windows = [WindowProportion {
            from: 0,
            to: 0,
            proportion: f64::NAN,
            error: f64::NAN,
        }; 4];
        for ((window, sum), out) in self
            .windows
            .iter()
            .zip(self.window_sums.iter())
            .zip(windows.iter_mut())
        {
            let p = sum / total;
            *out = WindowProportion {
                from: window.0,
                to: window.1,
                proportion: p,
                error: p * (1.0 - p) / total.sqrt(),
            };
        }

        let boxplot = if total > 0.0 {
            let mut normalised: Vec<f64> = self.values.iter().map(|v| v / total).collect();
            normalised.resize(observed + padding, 0.0);
            BoxplotStats::from_values(normalised).unwrap_or_else(|e| {
                debug!("{}: {}", self.target.name, e);
                BoxplotStats::nan()
            })
        } else {
            warn!(
                "{}: no signal on {}, cannot normalise",
                self.target.name,
                self.target.chrom()
            );
            BoxplotStats::nan()
        };

        ReadStats {
            total,
            observed,
            padding,
            bin_size: self.min_gap,
            windows,
            boxplot,
        }
    }
}
