use capstat_core::models::{GenomicInterval, SignalInterval, Target};
use log::warn;

use crate::accumulator::{Bucket, SignalAccumulator};
use crate::classifier::{RangeClass, RangeCutoffs};

///
/// Local vs long range signal of one target.
///
/// Each bucket's envelope is tracked in distance-from-target space. A scale factor compares
/// that observed envelope with the nominal window, so sparse tracks that never reach the
/// window edges are not penalised:
///
/// ```text
/// scale = (observed_far - observed_near) / (nominal_hi - nominal_lo)
/// ratio = (local_sum * local_scale) / (long_sum * long_scale)
/// ```
///
#[derive(Debug, Clone, PartialEq)]
pub struct LocalLongResult {
    pub local: Bucket,
    pub long_range: Bucket,
    /// `NaN` for an empty bucket.
    pub local_scale: f64,
    pub long_scale: f64,
    pub scaled_local: f64,
    pub scaled_long: f64,
    pub ratio: f64,
}

impl LocalLongResult {
    pub fn from_buckets(local: Bucket, long_range: Bucket, cutoffs: &RangeCutoffs) -> Self {
        let local_scale = envelope_scale(&local, cutoffs.local_span());
        let long_scale = envelope_scale(&long_range, cutoffs.long_span());
        let scaled_local = local.sum * local_scale;
        let scaled_long = long_range.sum * long_scale;

        LocalLongResult {
            ratio: scaled_local / scaled_long,
            local,
            long_range,
            local_scale,
            long_scale,
            scaled_local,
            scaled_long,
        }
    }
}

fn envelope_scale(bucket: &Bucket, nominal_span: f64) -> f64 {
    match bucket.width() {
        Some(width) => width / nominal_span,
        None => f64::NAN,
    }
}

pub struct LocalLongAccumulator<'a> {
    target: &'a Target,
    cutoffs: RangeCutoffs,
    local: Bucket,
    long_range: Bucket,
}

impl<'a> LocalLongAccumulator<'a> {
    pub fn new(target: &'a Target, cutoffs: RangeCutoffs) -> Self {
        LocalLongAccumulator {
            target,
            cutoffs,
            local: Bucket::new(),
            long_range: Bucket::new(),
        }
    }
}

impl SignalAccumulator for LocalLongAccumulator<'_> {
    type Output = LocalLongResult;

    fn consume(&mut self, interval: &SignalInterval) {
        let Some(class) = self.cutoffs.classify(self.target, interval) else {
            return;
        };

        // near and far edge of the interval as seen from the target midpoint
        let mid = self.target.midpoint();
        let (near, far) = if interval.midpoint() >= mid {
            (interval.start() as f64 - mid, interval.end() as f64 - mid)
        } else {
            (mid - interval.end() as f64, mid - interval.start() as f64)
        };

        let bucket = match class {
            RangeClass::Local => &mut self.local,
            RangeClass::LongRange => &mut self.long_range,
        };
        bucket.add(interval.value(), near, far);
    }

    fn finish(self) -> LocalLongResult {
        if self.local.is_empty() {
            warn!("{}: no signal in the local window", self.target.name);
        }
        if self.long_range.is_empty() {
            warn!("{}: no signal in the long range window", self.target.name);
        }
        LocalLongResult::from_buckets(self.local, self.long_range, &self.cutoffs)
    }
}
