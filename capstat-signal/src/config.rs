//! Analysis parameters.
//!
//! Every analysis reads its numeric parameters from one of the structs below. They can be
//! loaded from a TOML file where any section or field may be omitted, in which case the
//! documented default applies:
//!
//! ```toml
//! [directionality]
//! min_dist = 3000
//! max_dist = 500000
//!
//! [local_long]
//! min_dist = 1000
//! cutoff = 100000
//! max_dist = 10000000
//!
//! [log_separation]
//! bin_width = 0.25
//!
//! [artifacts]
//! factor = 10.0
//!
//! [distribution]
//! region_start = 0
//! region_end = 30000000
//! ```

use std::fs::read_to_string;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Interactions closer than this (bp) are never used by the directionality estimator.
pub const HARD_MIN_DIST: f64 = 1000.0;
/// Interactions further than this (bp) are never used by the directionality estimator.
pub const HARD_MAX_DIST: f64 = 10_000_000.0;

pub const DEFAULT_LOG_BIN_WIDTH: f64 = 0.25;
pub const DEFAULT_ARTIFACT_FACTOR: f64 = 10.0;
pub const DEFAULT_REGION_END: u64 = 30_000_000;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DirectionalityParams {
    pub min_dist: f64,
    pub max_dist: f64,
}

impl Default for DirectionalityParams {
    fn default() -> Self {
        DirectionalityParams {
            min_dist: 3000.0,
            max_dist: 500_000.0,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LocalLongParams {
    pub min_dist: f64,
    pub cutoff: f64,
    pub max_dist: f64,
}

impl Default for LocalLongParams {
    fn default() -> Self {
        LocalLongParams {
            min_dist: HARD_MIN_DIST,
            cutoff: 100_000.0,
            max_dist: HARD_MAX_DIST,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LogSeparationParams {
    /// Bin width in natural-log space.
    pub bin_width: f64,
}

impl Default for LogSeparationParams {
    fn default() -> Self {
        LogSeparationParams {
            bin_width: DEFAULT_LOG_BIN_WIDTH,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ArtifactParams {
    /// How many times larger than the mean of the other replicates a value must be.
    pub factor: f64,
}

impl Default for ArtifactParams {
    fn default() -> Self {
        ArtifactParams {
            factor: DEFAULT_ARTIFACT_FACTOR,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DistributionParams {
    pub region_start: u64,
    pub region_end: u64,
}

impl Default for DistributionParams {
    fn default() -> Self {
        DistributionParams {
            region_start: 0,
            region_end: DEFAULT_REGION_END,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct AnalysisConfig {
    pub directionality: DirectionalityParams,
    pub local_long: LocalLongParams,
    pub log_separation: LogSeparationParams,
    pub artifacts: ArtifactParams,
    pub distribution: DistributionParams,
}

impl TryFrom<&Path> for AnalysisConfig {
    type Error = ConfigError;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let toml_str = read_to_string(path)?;
        let config = toml::from_str(&toml_str)?;
        Ok(config)
    }
}

impl TryFrom<&str> for AnalysisConfig {
    type Error = ConfigError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        AnalysisConfig::try_from(Path::new(value))
    }
}
