//! Error types for Dockwatch.

use thiserror::Error;

/// Rejections raised at the input boundary, before anything is scored.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field} must not be negative (got {value})")]
    NegativeDuration { field: &'static str, value: f64 },

    #[error("{field} must be a finite number")]
    NonFiniteDuration { field: &'static str },

    #[error("process name must not be empty")]
    EmptyName,

    #[error("unknown process status '{0}' (expected one of: completed, in-progress, delayed, critical, failed)")]
    UnknownStatus(String),

    #[error("unknown time range '{0}' (expected one of: last1Hour, last6Hours, last24Hours, last7Days)")]
    UnknownTimeRange(String),

    #[error("unknown duration unit '{0}' (expected seconds or milliseconds)")]
    UnknownUnit(String),
}

/// Configuration loading and validation failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid thresholds: {0}")]
    Thresholds(String),
}

impl ValidationError {
    /// Stable machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::NegativeDuration { .. } => "negative_duration",
            ValidationError::NonFiniteDuration { .. } => "non_finite_duration",
            ValidationError::EmptyName => "empty_name",
            ValidationError::UnknownStatus(_) => "unknown_status",
            ValidationError::UnknownTimeRange(_) => "unknown_time_range",
            ValidationError::UnknownUnit(_) => "unknown_unit",
        }
    }
}
