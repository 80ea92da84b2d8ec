//! Per-observation risk analysis.
//!
//! normalize -> score -> classify + bottleneck predicate. Results are
//! ephemeral and recomputed on every refresh.

use crate::bottleneck::is_bottleneck_by_rule;
use crate::config::Thresholds;
use crate::error::ValidationError;
use crate::observation::{ProcessObservation, ProcessStatus, RawObservation, UndecodableRow};
use crate::scoring::{round_one_decimal, score_breakdown};
use crate::severity::{classify, RiskLevel};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAnalysis {
    pub process_name: String,
    pub process_id: String,
    pub status: ProcessStatus,
    /// Seconds
    pub actual_duration: f64,
    /// Seconds
    pub average_duration: f64,
    /// Signed, one decimal
    pub delay_percentage: f64,
    /// actual - average, seconds; negative when early
    pub delay_time: f64,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub is_potential_bottleneck: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl RiskAnalysis {
    /// Overrun in whole minutes (rounded, may be negative)
    pub fn delay_minutes(&self) -> i64 {
        crate::scoring::round_half_up(self.delay_time / 60.0) as i64
    }
}

/// An observation that failed validation inside a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedObservation {
    pub index: usize,
    pub process_id: String,
    pub process_name: String,
    pub reason: String,
}

/// Batch result: analyses in input order plus whatever was rejected
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchOutcome {
    pub analyses: Vec<RiskAnalysis>,
    pub rejected: Vec<RejectedObservation>,
}

/// Analyze one observation (durations already in seconds)
pub fn analyze(
    observation: &ProcessObservation,
    thresholds: &Thresholds,
) -> Result<RiskAnalysis, ValidationError> {
    observation.validate()?;

    let breakdown = score_breakdown(
        observation.actual_duration,
        observation.average_duration,
        observation.status,
    );
    let delay_percentage = round_one_decimal(breakdown.delay_percentage);

    debug!(
        process = %observation.name,
        score = breakdown.total,
        pct_points = breakdown.percentage_points,
        status_points = breakdown.status_points,
        duration_points = breakdown.duration_points,
        "scored observation"
    );

    Ok(RiskAnalysis {
        process_name: observation.name.clone(),
        process_id: observation.id.clone(),
        status: observation.status,
        actual_duration: observation.actual_duration,
        average_duration: observation.average_duration,
        delay_percentage,
        delay_time: observation.actual_duration - observation.average_duration,
        risk_score: breakdown.total,
        risk_level: classify(breakdown.total, thresholds),
        is_potential_bottleneck: is_bottleneck_by_rule(
            breakdown.total,
            breakdown.delay_percentage,
            thresholds,
        ),
        message: None,
    })
}

/// Analyze a batch; one bad record never aborts the rest
pub fn analyze_batch(observations: &[ProcessObservation], thresholds: &Thresholds) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();

    for (index, observation) in observations.iter().enumerate() {
        match analyze(observation, thresholds) {
            Ok(analysis) => outcome.analyses.push(analysis),
            Err(e) => {
                warn!(index, process = %observation.name, "Rejected observation: {}", e);
                outcome.rejected.push(RejectedObservation {
                    index,
                    process_id: observation.id.clone(),
                    process_name: observation.name.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    outcome
}

/// Normalize and analyze raw records in one pass
pub fn analyze_raw_batch(raw: Vec<RawObservation>, thresholds: &Thresholds) -> BatchOutcome {
    analyze_rows(raw.into_iter().map(Ok).collect(), thresholds)
}

/// Analyze decoded rows; undecodable rows are rejected at their index like
/// any other invalid record.
pub fn analyze_rows(
    rows: Vec<Result<RawObservation, UndecodableRow>>,
    thresholds: &Thresholds,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();

    for (index, row) in rows.into_iter().enumerate() {
        let result = match row {
            Ok(record) => {
                let process_id = record.id.clone();
                let process_name = record.name.clone();
                record
                    .normalize()
                    .and_then(|obs| analyze(&obs, thresholds))
                    .map_err(|e| (process_id, process_name, e.to_string()))
            }
            Err(row) => Err((row.id, row.name, row.reason)),
        };

        match result {
            Ok(analysis) => outcome.analyses.push(analysis),
            Err((process_id, process_name, reason)) => {
                warn!(index, process = %process_name, "Rejected observation: {}", reason);
                outcome.rejected.push(RejectedObservation {
                    index,
                    process_id,
                    process_name,
                    reason,
                });
            }
        }
    }

    outcome
}

/// Highest score first; equal scores keep input order
pub fn sort_by_risk(analyses: &mut [RiskAnalysis]) {
    analyses.sort_by(|a, b| b.risk_score.cmp(&a.risk_score));
}
