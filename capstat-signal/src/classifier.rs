//! Distance classification of signal intervals relative to a capture target.
//!
//! Three policies decide which bucket (if any) an interval contributes to:
//!
//! - [`DirectionalWindow`]: signed, upstream vs downstream of the target midpoint
//! - [`RangeCutoffs`]: unsigned midpoint separation, local vs long range
//! - [`LogBinning`]: unsigned midpoint separation mapped to a logarithmically spaced bin
//!
//! Intervals on a different chromosome than the target never classify.

use capstat_core::models::GenomicInterval;

use crate::config::{
    DirectionalityParams, HARD_MAX_DIST, HARD_MIN_DIST, LocalLongParams, LogSeparationParams,
};
use crate::errors::{ConfigError, ConfigResult};

/// Which directional buckets an interval falls into. The two are independent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectionalHit {
    pub upstream: bool,
    pub downstream: bool,
}

///
/// Symmetric signed window `[min_dist, max_dist]` on both sides of a target.
///
/// Both bounds are restricted to `[HARD_MIN_DIST, HARD_MAX_DIST]`.
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalWindow {
    min_dist: f64,
    max_dist: f64,
}

impl DirectionalWindow {
    pub fn new(min_dist: f64, max_dist: f64) -> ConfigResult<Self> {
        if !(min_dist >= HARD_MIN_DIST) {
            return Err(ConfigError::BelowMinimum {
                name: "min_dist",
                min: HARD_MIN_DIST,
                value: min_dist,
            });
        }
        if !(max_dist <= HARD_MAX_DIST) {
            return Err(ConfigError::AboveMaximum {
                name: "max_dist",
                max: HARD_MAX_DIST,
                value: max_dist,
            });
        }
        if min_dist >= max_dist {
            return Err(ConfigError::InvalidOrder {
                lower: "min_dist",
                lower_value: min_dist,
                upper: "max_dist",
                upper_value: max_dist,
            });
        }
        Ok(DirectionalWindow { min_dist, max_dist })
    }

    pub fn min_dist(&self) -> f64 {
        self.min_dist
    }

    pub fn max_dist(&self) -> f64 {
        self.max_dist
    }

    pub fn classify<T, G>(&self, target: &T, interval: &G) -> DirectionalHit
    where
        T: GenomicInterval + ?Sized,
        G: GenomicInterval + ?Sized,
    {
        if !target.same_chrom(interval) {
            return DirectionalHit::default();
        }

        let mid = target.midpoint();
        let end_offset = interval.end() as f64 - mid;
        let start_offset = interval.start() as f64 - mid;

        DirectionalHit {
            downstream: end_offset > self.min_dist && start_offset < self.max_dist,
            upstream: end_offset > -self.max_dist && start_offset < -self.min_dist,
        }
    }
}

impl TryFrom<&DirectionalityParams> for DirectionalWindow {
    type Error = ConfigError;

    fn try_from(params: &DirectionalityParams) -> ConfigResult<Self> {
        DirectionalWindow::new(params.min_dist, params.max_dist)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeClass {
    Local,
    LongRange,
}

///
/// Local range is `[min_dist, cutoff)`, long range is `[cutoff, max_dist]`, both measured
/// as absolute midpoint separation.
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeCutoffs {
    min_dist: f64,
    cutoff: f64,
    max_dist: f64,
}

impl RangeCutoffs {
    pub fn new(min_dist: f64, cutoff: f64, max_dist: f64) -> ConfigResult<Self> {
        if !(min_dist >= 0.0) {
            return Err(ConfigError::BelowMinimum {
                name: "min_dist",
                min: 0.0,
                value: min_dist,
            });
        }
        if !(min_dist < cutoff) {
            return Err(ConfigError::InvalidOrder {
                lower: "min_dist",
                lower_value: min_dist,
                upper: "cutoff",
                upper_value: cutoff,
            });
        }
        if !(cutoff < max_dist) {
            return Err(ConfigError::InvalidOrder {
                lower: "cutoff",
                lower_value: cutoff,
                upper: "max_dist",
                upper_value: max_dist,
            });
        }
        Ok(RangeCutoffs {
            min_dist,
            cutoff,
            max_dist,
        })
    }

    pub fn min_dist(&self) -> f64 {
        self.min_dist
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    pub fn max_dist(&self) -> f64 {
        self.max_dist
    }

    /// Nominal width of the local window.
    pub fn local_span(&self) -> f64 {
        self.cutoff - self.min_dist
    }

    /// Nominal width of the long range window.
    pub fn long_span(&self) -> f64 {
        self.max_dist - self.cutoff
    }

    pub fn classify_separation(&self, separation: f64) -> Option<RangeClass> {
        if separation < self.min_dist || separation > self.max_dist {
            None
        } else if separation < self.cutoff {
            Some(RangeClass::Local)
        } else {
            Some(RangeClass::LongRange)
        }
    }

    pub fn classify<T, G>(&self, target: &T, interval: &G) -> Option<RangeClass>
    where
        T: GenomicInterval + ?Sized,
        G: GenomicInterval + ?Sized,
    {
        if !target.same_chrom(interval) {
            return None;
        }
        self.classify_separation(interval.separation(target))
    }
}

impl TryFrom<&LocalLongParams> for RangeCutoffs {
    type Error = ConfigError;

    fn try_from(params: &LocalLongParams) -> ConfigResult<Self> {
        RangeCutoffs::new(params.min_dist, params.cutoff, params.max_dist)
    }
}

///
/// A logarithmically spaced distance bin. Bin `k` covers `[exp(k*w), exp((k+1)*w))`.
///
/// Bins are identified by their integer index rather than by the floating point center.
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogBin {
    pub index: i64,
    pub log_width: f64,
}

impl LogBin {
    pub fn center(&self) -> f64 {
        ((self.index as f64) * self.log_width + 0.5 * self.log_width).exp()
    }

    /// Width of the bin in bp, used to turn summed signal into a density.
    pub fn physical_width(&self) -> f64 {
        log_bin_width(self.center(), self.log_width)
    }
}

/// Center of the log bin holding `distance`, `None` when the distance is not positive.
pub fn log_bin_center(distance: f64, log_width: f64) -> Option<f64> {
    LogBinning { log_width }.bin(distance).map(|bin| bin.center())
}

/// Physical width (bp) of the log bin centred on `center`.
pub fn log_bin_width(center: f64, log_width: f64) -> f64 {
    let log_center = center.ln();
    (log_center + 0.5 * log_width).exp() - (log_center - 0.5 * log_width).exp()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogBinning {
    log_width: f64,
}

impl LogBinning {
    pub fn new(log_width: f64) -> ConfigResult<Self> {
        if !(log_width > 0.0 && log_width.is_finite()) {
            return Err(ConfigError::InvalidBinWidth(log_width));
        }
        Ok(LogBinning { log_width })
    }

    pub fn log_width(&self) -> f64 {
        self.log_width
    }

    /// Distances that are zero, negative or not finite have no logarithm and get no bin.
    pub fn bin(&self, distance: f64) -> Option<LogBin> {
        if !(distance > 0.0 && distance.is_finite()) {
            return None;
        }
        let index = (distance.ln() / self.log_width).floor() as i64;
        Some(LogBin {
            index,
            log_width: self.log_width,
        })
    }

    pub fn classify<T, G>(&self, target: &T, interval: &G) -> Option<LogBin>
    where
        T: GenomicInterval + ?Sized,
        G: GenomicInterval + ?Sized,
    {
        if !target.same_chrom(interval) {
            return None;
        }
        self.bin(interval.separation(target))
    }
}

impl TryFrom<&LogSeparationParams> for LogBinning {
    type Error = ConfigError;

    fn try_from(params: &LogSeparationParams) -> ConfigResult<Self> {
        LogBinning::new(params.bin_width)
    }
}
