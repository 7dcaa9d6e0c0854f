//! Signal statistics around capture targets.
//!
//! Every analysis is a [`SignalAccumulator`](accumulator::SignalAccumulator): a track is
//! streamed through it once, each interval is classified relative to the target midpoint,
//! and the accumulated buckets are reduced to the final metric.
//!
//! - [`directionality`]: log ratio of downstream vs upstream signal density
//! - [`local_long`]: local vs long range signal, scaled by the observed extents
//! - [`log_separation`]: distance-decay profile in log-spaced bins, pooled over targets
//! - [`artifacts`]: replicate values far above the other replicates
//! - [`distribution`]: Tukey boxplot and sub-window shares over a chromosome region
//! - [`derivative`]: slope of directionality between neighbouring targets
//!
//! # Example
//!
//! ```no_run
//! use capstat_core::models::{SignalInterval, Strand, Target};
//! use capstat_signal::accumulator::accumulate;
//! use capstat_signal::classifier::RangeCutoffs;
//! use capstat_signal::config::AnalysisConfig;
//! use capstat_signal::local_long::LocalLongAccumulator;
//!
//! let config = AnalysisConfig::try_from("capstat.toml").unwrap();
//! let cutoffs = RangeCutoffs::try_from(&config.local_long).unwrap();
//!
//! let target: Target = "chr11\t5000000\t5001000\tHbb\t-".parse().unwrap();
//! let track: Vec<SignalInterval> = vec![];
//!
//! let result = accumulate(LocalLongAccumulator::new(&target, cutoffs), &track);
//! println!("{}", result.ratio);
//! ```

pub mod accumulator;
pub mod artifacts;
pub mod classifier;
pub mod config;
pub mod derivative;
pub mod directionality;
pub mod distribution;
pub mod errors;
pub mod local_long;
pub mod log_separation;

// re-exports
pub use accumulator::{SignalAccumulator, accumulate};
pub use config::AnalysisConfig;
pub use errors::{ComputationError, ConfigError};
