//! Process observations as they arrive from the data source.

use crate::duration::{check_duration, to_seconds, DurationUnit};
use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Process status. Closed set on the wire; anything else lands in `Unknown`
/// so a single bad row cannot fail a whole batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProcessStatus {
    Completed,
    InProgress,
    Delayed,
    Critical,
    Failed,
    #[serde(other)]
    Unknown,
}

impl ProcessStatus {
    pub const ALL: [ProcessStatus; 5] = [
        ProcessStatus::Completed,
        ProcessStatus::InProgress,
        ProcessStatus::Delayed,
        ProcessStatus::Critical,
        ProcessStatus::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessStatus::Completed => "completed",
            ProcessStatus::InProgress => "in-progress",
            ProcessStatus::Delayed => "delayed",
            ProcessStatus::Critical => "critical",
            ProcessStatus::Failed => "failed",
            ProcessStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strict parse used at creation boundaries (HTTP body, CLI flags)
impl FromStr for ProcessStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProcessStatus::ALL
            .iter()
            .find(|status| status.as_str() == s)
            .copied()
            .ok_or_else(|| ValidationError::UnknownStatus(s.to_string()))
    }
}

/// A single timing observation, durations in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessObservation {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub actual_duration: f64,
    pub average_duration: f64,
    pub status: ProcessStatus,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl ProcessObservation {
    pub fn new(
        name: impl Into<String>,
        actual_duration: f64,
        average_duration: f64,
        status: ProcessStatus,
    ) -> Self {
        let name = name.into();
        Self {
            id: slug(&name),
            name,
            actual_duration,
            average_duration,
            status,
            timestamp: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Reject negative or non-finite durations and blank names
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        check_duration("actual_duration", self.actual_duration)?;
        check_duration("average_duration", self.average_duration)?;
        Ok(())
    }
}

/// Observation in a caller-declared unit, before normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub actual_duration: f64,
    pub average_duration: f64,
    pub status: ProcessStatus,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub unit: DurationUnit,
}

impl RawObservation {
    /// Convert into a seconds-based observation
    pub fn normalize(self) -> Result<ProcessObservation, ValidationError> {
        let actual = check_duration("actual_duration", self.actual_duration)?;
        let average = check_duration("average_duration", self.average_duration)?;

        let observation = ProcessObservation {
            id: if self.id.is_empty() {
                slug(&self.name)
            } else {
                self.id
            },
            name: self.name,
            actual_duration: to_seconds(actual, self.unit)?,
            average_duration: to_seconds(average, self.unit)?,
            status: self.status,
            timestamp: self.timestamp,
        };
        observation.validate()?;
        Ok(observation)
    }

    /// Override the declared unit (CLI `--unit` flag)
    pub fn in_unit(mut self, unit: DurationUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Decode one untyped row. A failed row keeps whatever id and name it had.
    pub fn from_value(value: serde_json::Value) -> Result<Self, UndecodableRow> {
        let text_field = |key: &str| {
            value
                .get(key)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };
        let id = text_field("id");
        let name = text_field("name");

        serde_json::from_value(value).map_err(|e| UndecodableRow {
            id,
            name,
            reason: format!("invalid record: {}", e),
        })
    }
}

/// A row that is not a well-formed observation
#[derive(Debug, Clone, PartialEq)]
pub struct UndecodableRow {
    pub id: String,
    pub name: String,
    pub reason: String,
}

/// Parse a JSON array of observation rows. Only a malformed document or a
/// non-array is an error; bad rows come back individually.
pub fn decode_rows(json: &str) -> Result<Vec<Result<RawObservation, UndecodableRow>>, serde_json::Error> {
    let rows: Vec<serde_json::Value> = serde_json::from_str(json)?;
    Ok(rows.into_iter().map(RawObservation::from_value).collect())
}

/// "Material Picking" -> "material-picking"
pub fn slug(name: &str) -> String {
    name.split_whitespace()
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        let status: ProcessStatus = serde_json::from_str("\"in-progress\"").unwrap();
        assert_eq!(status, ProcessStatus::InProgress);
        assert_eq!(serde_json::to_string(&ProcessStatus::Critical).unwrap(), "\"critical\"");
    }

    #[test]
    fn test_unrecognized_status_deserializes_to_unknown() {
        let status: ProcessStatus = serde_json::from_str("\"on-track\"").unwrap();
        assert_eq!(status, ProcessStatus::Unknown);
    }

    #[test]
    fn test_strict_parse_rejects_unknown() {
        assert_eq!("failed".parse::<ProcessStatus>().unwrap(), ProcessStatus::Failed);
        assert!("unknown".parse::<ProcessStatus>().is_err());
        assert!("on-track".parse::<ProcessStatus>().is_err());
    }

    #[test]
    fn test_normalize_milliseconds() {
        let raw = RawObservation {
            id: String::new(),
            name: "Material Picking".to_string(),
            actual_duration: 1_260_000.0,
            average_duration: 720_000.0,
            status: ProcessStatus::Delayed,
            timestamp: Utc::now(),
            unit: DurationUnit::Milliseconds,
        };
        let obs = raw.normalize().unwrap();
        assert_eq!(obs.id, "material-picking");
        assert_eq!(obs.actual_duration, 1260.0);
        assert_eq!(obs.average_duration, 720.0);
    }

    #[test]
    fn test_normalize_rejects_negative_average() {
        let raw = RawObservation {
            id: "x".to_string(),
            name: "Dispatch".to_string(),
            actual_duration: 10.0,
            average_duration: -5.0,
            status: ProcessStatus::Completed,
            timestamp: Utc::now(),
            unit: DurationUnit::Seconds,
        };
        assert_eq!(
            raw.normalize().unwrap_err(),
            ValidationError::NegativeDuration {
                field: "average_duration",
                value: -5.0
            }
        );
    }

    #[test]
    fn test_validate_blank_name() {
        let obs = ProcessObservation::new("  ", 1.0, 1.0, ProcessStatus::Completed);
        assert_eq!(obs.validate().unwrap_err(), ValidationError::EmptyName);
    }

    #[test]
    fn test_observation_defaults_from_json() {
        let obs: ProcessObservation = serde_json::from_str(
            r#"{"name":"Dispatch","actual_duration":1260,"average_duration":720,"status":"critical"}"#,
        )
        .unwrap();
        assert!(obs.id.is_empty());
        assert_eq!(obs.status, ProcessStatus::Critical);
    }

    #[test]
    fn test_decode_rows_isolates_bad_rows() {
        let rows = decode_rows(
            r#"[
                {"name": "Packing", "actual_duration": 660000, "average_duration": 600000, "status": "delayed", "unit": "ms"},
                {"id": "qc", "name": "Quality Check", "actual_duration": 10, "average_duration": 5, "status": "failed", "unit": "minutes"},
                {"name": "Dispatch", "actual_duration": "late", "average_duration": 720, "status": "critical"}
            ]"#,
        )
        .unwrap();

        assert_eq!(rows.len(), 3);
        let packing = rows[0].clone().unwrap().normalize().unwrap();
        assert_eq!(packing.actual_duration, 660.0);

        let bad_unit = rows[1].clone().unwrap_err();
        assert_eq!(bad_unit.id, "qc");
        assert_eq!(bad_unit.name, "Quality Check");
        assert!(bad_unit.reason.contains("minutes"));

        assert_eq!(rows[2].clone().unwrap_err().name, "Dispatch");
    }

    #[test]
    fn test_decode_rows_requires_array() {
        assert!(decode_rows(r#"{"name": "Dispatch"}"#).is_err());
        assert!(decode_rows("[").is_err());
    }
}
