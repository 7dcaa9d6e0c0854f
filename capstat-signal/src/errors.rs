use thiserror::Error;

/// Invalid analysis parameters. Always fatal, raised before any track is read.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{name} must be at least {min} (got {value})")]
    BelowMinimum { name: &'static str, min: f64, value: f64 },

    #[error("{name} must be at most {max} (got {value})")]
    AboveMaximum { name: &'static str, max: f64, value: f64 },

    #[error("{lower} ({lower_value}) must be smaller than {upper} ({upper_value})")]
    InvalidOrder {
        lower: &'static str,
        lower_value: f64,
        upper: &'static str,
        upper_value: f64,
    },

    #[error("Artifact factor must be positive (got {0})")]
    InvalidFactor(f64),

    #[error("Log bin width must be positive and finite (got {0})")]
    InvalidBinWidth(f64),

    #[error("At least two replicates are required (got {0})")]
    TooFewReplicates(usize),

    #[error("Replicate name `{0}` was given more than once")]
    DuplicateReplicate(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

/// A numeric reduction that has no defined value. Public metric results encode these as `NaN`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComputationError {
    #[error("No interval fell into the {0} bucket")]
    EmptyBucket(&'static str),

    #[error("Density of the {0} bucket is not positive, its logarithm is undefined")]
    NonPositiveDensity(&'static str),

    #[error("Cannot compute order statistics of an empty vector")]
    EmptyVector,

    #[error("Entries span more than one chromosome ({0} and {1})")]
    MixedChromosomes(String, String),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
