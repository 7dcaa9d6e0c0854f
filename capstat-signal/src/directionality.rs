//! Directional bias of the signal around a target.
//!
//! Signal is split into an upstream and a downstream bucket by a [`DirectionalWindow`]. The
//! score is the log ratio of the two observed densities:
//!
//! ```text
//! directionality = ln(downstream_density) - ln(upstream_density)
//! ```
//!
//! A positive score means more signal downstream of the target midpoint.

use capstat_core::models::{GenomicInterval, SignalInterval, Target};
use log::warn;

use crate::accumulator::{Bucket, SignalAccumulator};
use crate::classifier::DirectionalWindow;
use crate::config::{HARD_MAX_DIST, HARD_MIN_DIST};
use crate::errors::ComputationError;

#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalityResult {
    /// `NaN` when either bucket is empty or has a non-positive density.
    pub directionality: f64,
    pub error: f64,
    pub upstream: Bucket,
    pub downstream: Bucket,
    /// Signal between the hard distance bounds, the denominator of the error estimate.
    pub total_reads: f64,
}

/// `ln(downstream_density) - ln(upstream_density)`.
pub fn log_density_ratio(upstream: &Bucket, downstream: &Bucket) -> Result<f64, ComputationError> {
    let up = positive_density(upstream, "upstream")?;
    let down = positive_density(downstream, "downstream")?;
    Ok(down.ln() - up.ln())
}

///
/// Binomial approximation of the error on the directionality score.
///
/// `p_i = sum_i / total_reads`, `err_i = p_i (1 - p_i) / sqrt(total_reads)` and the two
/// relative errors are added in quadrature.
///
pub fn directionality_error(
    upstream: &Bucket,
    downstream: &Bucket,
    total_reads: f64,
) -> Result<f64, ComputationError> {
    let up = positive_density(upstream, "upstream")?;
    let down = positive_density(downstream, "downstream")?;

    let binomial = |sum: f64| {
        let p = sum / total_reads;
        p * (1.0 - p) / total_reads.sqrt()
    };
    let err_up = binomial(upstream.sum) / up;
    let err_down = binomial(downstream.sum) / down;

    Ok((err_up * err_up + err_down * err_down).sqrt())
}

fn positive_density(bucket: &Bucket, label: &'static str) -> Result<f64, ComputationError> {
    let density = bucket.density(label)?;
    if density > 0.0 {
        Ok(density)
    } else {
        Err(ComputationError::NonPositiveDensity(label))
    }
}

///
/// Directionality of one target over one track.
///
/// ```rust
/// use capstat_core::models::{SignalInterval, Strand, Target};
/// use capstat_signal::accumulator::accumulate;
/// use capstat_signal::classifier::DirectionalWindow;
/// use capstat_signal::directionality::DirectionalityAccumulator;
///
/// let target = Target::new("chr1", 99_000, 101_000, "probe", Strand::Plus).unwrap();
/// let window = DirectionalWindow::new(3000.0, 500_000.0).unwrap();
/// let track = vec![
///     SignalInterval::new("chr1", 80_000, 90_000, 5.0).unwrap(),
///     SignalInterval::new("chr1", 110_000, 120_000, 5.0).unwrap(),
/// ];
///
/// let result = accumulate(DirectionalityAccumulator::new(&target, window), &track);
/// assert_eq!(result.directionality, 0.0);
/// ```
///
pub struct DirectionalityAccumulator<'a> {
    target: &'a Target,
    window: DirectionalWindow,
    upstream: Bucket,
    downstream: Bucket,
    total_reads: f64,
}

impl<'a> DirectionalityAccumulator<'a> {
    pub fn new(target: &'a Target, window: DirectionalWindow) -> Self {
        DirectionalityAccumulator {
            target,
            window,
            upstream: Bucket::new(),
            downstream: Bucket::new(),
            total_reads: 0.0,
        }
    }
}

impl SignalAccumulator for DirectionalityAccumulator<'_> {
    type Output = DirectionalityResult;

    fn consume(&mut self, interval: &SignalInterval) {
        if !self.target.same_chrom(interval) {
            return;
        }

        let separation = interval.separation(self.target);
        if separation > HARD_MIN_DIST && separation < HARD_MAX_DIST {
            self.total_reads += interval.value();
        }

        let hit = self.window.classify(self.target, interval);
        if hit.upstream {
            self.upstream.add_interval(interval);
        }
        if hit.downstream {
            self.downstream.add_interval(interval);
        }
    }

    fn finish(self) -> DirectionalityResult {
        let scores = log_density_ratio(&self.upstream, &self.downstream).and_then(|d| {
            directionality_error(&self.upstream, &self.downstream, self.total_reads)
                .map(|e| (d, e))
        });

        let (directionality, error) = match scores {
            Ok(scores) => scores,
            Err(e) => {
                warn!("{}: {}", self.target.name, e);
                (f64::NAN, f64::NAN)
            }
        };

        DirectionalityResult {
            directionality,
            error,
            upstream: self.upstream,
            downstream: self.downstream,
            total_reads: self.total_reads,
        }
    }
}
