//! Duration normalization.
//!
//! Storage reports durations in seconds, dashboards in milliseconds.
//! Everything that reaches the scorer is seconds.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unit a raw duration was recorded in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    #[default]
    #[serde(alias = "s", alias = "sec", alias = "secs")]
    Seconds,
    #[serde(alias = "ms", alias = "millis")]
    Milliseconds,
}

impl DurationUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            DurationUnit::Seconds => "seconds",
            DurationUnit::Milliseconds => "milliseconds",
        }
    }
}

impl fmt::Display for DurationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DurationUnit {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "s" | "sec" | "secs" | "seconds" => Ok(DurationUnit::Seconds),
            "ms" | "millis" | "milliseconds" => Ok(DurationUnit::Milliseconds),
            other => Err(ValidationError::UnknownUnit(other.to_string())),
        }
    }
}

/// Check a duration field is a usable, non-negative number
pub fn check_duration(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteDuration { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeDuration { field, value });
    }
    Ok(value)
}

/// Convert a raw duration into canonical seconds
pub fn to_seconds(value: f64, unit: DurationUnit) -> Result<f64, ValidationError> {
    let value = check_duration("duration", value)?;
    Ok(match unit {
        DurationUnit::Seconds => value,
        DurationUnit::Milliseconds => value / 1000.0,
    })
}
