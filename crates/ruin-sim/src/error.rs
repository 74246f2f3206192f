use thiserror::Error;

/// Rejected configuration. Raised before any step runs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid count for {field}: {value} (must be positive)")]
    InvalidCount { field: &'static str, value: u64 },

    #[error("Count for {field} is {value}, above the limit of {max}")]
    CountTooLarge {
        field: &'static str,
        value: u64,
        max: u64,
    },

    #[error("Invalid parameter {field} = {value}: {reason}")]
    InvalidParameter {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("Invalid allocation: {0}")]
    InvalidAllocation(String),

    #[error("Failed to read config file {path}: {error}")]
    Io { path: String, error: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A programming defect detected mid-run. The run is aborted.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

pub type Result<T> = std::result::Result<T, SimError>;
