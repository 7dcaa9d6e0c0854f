use std::borrow::Borrow;

use capstat_core::models::{GenomicInterval, SignalInterval};

use crate::errors::ComputationError;

///
/// A single-pass reduction over the intervals of one signal track.
///
/// Every estimator in this crate is an accumulator. The I/O layer streams records into
/// [`consume`](SignalAccumulator::consume) and calls [`finish`](SignalAccumulator::finish)
/// once the track is exhausted.
///
pub trait SignalAccumulator {
    type Output;

    fn consume(&mut self, interval: &SignalInterval);

    fn finish(self) -> Self::Output;
}

/// Feed every interval of an in-memory track into `acc` and reduce it.
pub fn accumulate<A, I>(mut acc: A, intervals: I) -> A::Output
where
    A: SignalAccumulator,
    I: IntoIterator,
    I::Item: Borrow<SignalInterval>,
{
    for interval in intervals {
        acc.consume(interval.borrow());
    }
    acc.finish()
}

///
/// Running totals for one category of intervals (a directional side, a range class).
///
/// The `[min_start, max_end]` envelope starts at the `+inf / 0` sentinels and is widened by
/// every value added. Its coordinates are whatever the caller passes, genomic positions or
/// distances from a target.
///
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub sum: f64,
    pub sum_sq: f64,
    pub count: u64,
    pub min_start: f64,
    pub max_end: f64,
}

impl Default for Bucket {
    fn default() -> Self {
        Bucket {
            sum: 0.0,
            sum_sq: 0.0,
            count: 0,
            min_start: f64::INFINITY,
            max_end: 0.0,
        }
    }
}

impl Bucket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, value: f64, start: f64, end: f64) {
        self.sum += value;
        self.sum_sq += value * value;
        self.count += 1;
        self.min_start = self.min_start.min(start);
        self.max_end = self.max_end.max(end);
    }

    /// Add an interval using its genomic coordinates as the envelope.
    pub fn add_interval(&mut self, interval: &SignalInterval) {
        self.add(
            interval.value(),
            interval.start() as f64,
            interval.end() as f64,
        );
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Observed envelope width, `None` while the bucket is empty.
    pub fn width(&self) -> Option<f64> {
        if self.is_empty() {
            None
        } else {
            Some(self.max_end - self.min_start)
        }
    }

    pub fn mean(&self) -> Option<f64> {
        if self.is_empty() {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }

    /// Summed signal per bp of observed envelope. `label` names the bucket in the error.
    pub fn density(&self, label: &'static str) -> Result<f64, ComputationError> {
        match self.width() {
            Some(width) if width > 0.0 => Ok(self.sum / width),
            _ => Err(ComputationError::EmptyBucket(label)),
        }
    }
}
