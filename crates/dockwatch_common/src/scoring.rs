//! Deterministic risk scoring.
//!
//! Additive rule set with capped components:
//! - delay percentage: 0-50 points
//! - status: 0-40 points
//! - absolute delay in minutes: 0-10 points
//!
//! Inputs are seconds. The minutes component is unit-sensitive, so callers
//! must normalize through `duration` first.

use crate::observation::ProcessStatus;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const MAX_SCORE: u8 = 100;

/// Cap on the reported overrun so near-zero baselines stay finite on the wire
pub const MAX_DELAY_PERCENTAGE: f64 = 1_000_000.0;

/// Per-component view of a score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub delay_percentage: f64,
    pub percentage_points: f64,
    pub status_points: f64,
    pub duration_points: f64,
    pub total: u8,
}

/// Signed overrun relative to the baseline, at most `MAX_DELAY_PERCENTAGE`.
/// Zero baseline is degenerate, not an error: the percentage is forced to 0.
pub fn delay_percentage(actual: f64, average: f64) -> f64 {
    if average > 0.0 {
        (((actual - average) / average) * 100.0).min(MAX_DELAY_PERCENTAGE)
    } else {
        0.0
    }
}

/// Points for |delay%|
pub fn percentage_points(delay_percentage: f64) -> f64 {
    if delay_percentage.is_nan() {
        return 0.0;
    }
    let magnitude = delay_percentage.abs();
    if magnitude >= 50.0 {
        50.0
    } else if magnitude >= 30.0 {
        40.0
    } else if magnitude >= 20.0 {
        30.0
    } else if magnitude >= 10.0 {
        20.0
    } else {
        magnitude
    }
}

/// Points for process status
pub fn status_points(status: ProcessStatus) -> f64 {
    match status {
        ProcessStatus::Critical => 40.0,
        ProcessStatus::Failed => 35.0,
        ProcessStatus::Delayed => 20.0,
        ProcessStatus::InProgress => 10.0,
        ProcessStatus::Completed => 0.0,
        ProcessStatus::Unknown => {
            warn!("Unknown process status contributes 0 risk points");
            0.0
        }
    }
}

/// Points for the absolute overrun, measured in minutes
pub fn duration_points(actual: f64, average: f64) -> f64 {
    let delay_minutes = (actual - average) / 60.0;
    if delay_minutes >= 60.0 {
        10.0
    } else if delay_minutes >= 30.0 {
        7.0
    } else if delay_minutes >= 15.0 {
        5.0
    } else if delay_minutes > 0.0 {
        3.0
    } else {
        0.0
    }
}

/// Full breakdown for (actual, average, status), durations in seconds
pub fn score_breakdown(actual: f64, average: f64, status: ProcessStatus) -> ScoreBreakdown {
    let delay_percentage = delay_percentage(actual, average);
    let percentage_points = percentage_points(delay_percentage);
    let status_points = status_points(status);
    let duration_points = duration_points(actual, average);

    let sum = percentage_points + status_points + duration_points;
    let total = round_half_up(sum).clamp(0.0, MAX_SCORE as f64) as u8;

    ScoreBreakdown {
        delay_percentage,
        percentage_points,
        status_points,
        duration_points,
        total,
    }
}

/// Risk score in [0, 100]
pub fn score(actual: f64, average: f64, status: ProcessStatus) -> u8 {
    score_breakdown(actual, average, status).total
}

/// Round to nearest, halves toward +inf (dashboard-compatible rounding)
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Round to one decimal place, halves toward +inf
pub fn round_one_decimal(value: f64) -> f64 {
    round_half_up(value * 10.0) / 10.0
}

/// Clamp an overflowed sum back to the largest finite value
pub fn saturate(value: f64) -> f64 {
    value.clamp(f64::MIN, f64::MAX)
}
