//! Process data source for the daemon.
//!
//! Handlers only see `ProcessSource`; `InMemoryStore` is the provided
//! implementation, optionally seeded from a JSON file at startup. Nothing is
//! written back to disk.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dockwatch_common::observation::{decode_rows, ProcessObservation, ProcessStatus};
use dockwatch_common::window::TimeWindow;
use std::path::Path;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Query over stored observations; `None` fields match everything
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessFilter {
    pub window: Option<TimeWindow>,
    pub status: Option<ProcessStatus>,
    /// Case-insensitive substring of the process name
    pub name: Option<String>,
}

impl ProcessFilter {
    pub fn in_window(window: TimeWindow) -> Self {
        Self {
            window: Some(window),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: ProcessStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, observation: &ProcessObservation, now: DateTime<Utc>) -> bool {
        if let Some(window) = self.window {
            if !window.contains(observation.timestamp, now) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if observation.status != status {
                return false;
            }
        }
        if let Some(name) = &self.name {
            if !observation.name.to_lowercase().contains(&name.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

#[async_trait]
pub trait ProcessSource: Send + Sync {
    /// Matching observations in insertion order
    async fn list(&self, filter: &ProcessFilter) -> Vec<ProcessObservation>;

    async fn get(&self, id: &str) -> Option<ProcessObservation>;

    /// Store an already-normalized observation and return it
    async fn insert(&self, observation: ProcessObservation) -> ProcessObservation;

    async fn count(&self) -> usize;
}

#[derive(Default)]
pub struct InMemoryStore {
    records: RwLock<Vec<ProcessObservation>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_observations(observations: Vec<ProcessObservation>) -> Self {
        Self {
            records: RwLock::new(observations),
        }
    }

    /// Load a JSON array of raw observations. Rows that fail to decode or
    /// normalize are skipped with a warning; an unreadable file or a
    /// document that is not an array is an error.
    pub fn from_seed_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read seed file {}", path.display()))?;
        let rows = decode_rows(&content)
            .with_context(|| format!("Failed to parse seed file {}", path.display()))?;

        let total = rows.len();
        let mut observations = Vec::with_capacity(total);
        for (index, row) in rows.into_iter().enumerate() {
            match row {
                Ok(record) => {
                    let name = record.name.clone();
                    match record.normalize() {
                        Ok(observation) => observations.push(observation),
                        Err(e) => warn!(index, process = %name, "Skipping seed record: {}", e),
                    }
                }
                Err(row) => warn!(index, process = %row.name, "Skipping seed record: {}", row.reason),
            }
        }

        info!(
            "Seeded {} of {} observations from {}",
            observations.len(),
            total,
            path.display()
        );
        Ok(Self::with_observations(observations))
    }
}

#[async_trait]
impl ProcessSource for InMemoryStore {
    async fn list(&self, filter: &ProcessFilter) -> Vec<ProcessObservation> {
        let now = Utc::now();
        let records = self.records.read().await;
        records
            .iter()
            .filter(|o| filter.matches(o, now))
            .cloned()
            .collect()
    }

    async fn get(&self, id: &str) -> Option<ProcessObservation> {
        let records = self.records.read().await;
        records.iter().find(|o| o.id == id).cloned()
    }

    async fn insert(&self, observation: ProcessObservation) -> ProcessObservation {
        let mut records = self.records.write().await;
        records.push(observation.clone());
        observation
    }

    async fn count(&self) -> usize {
        self.records.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::io::Write;

    fn obs(name: &str, status: ProcessStatus) -> ProcessObservation {
        ProcessObservation::new(name, 100.0, 100.0, status)
    }

    #[test]
    fn test_filter_matches() {
        let now = Utc::now();
        let recent = obs("Material Picking", ProcessStatus::Delayed);
        let old = obs("Dispatch", ProcessStatus::Delayed).with_timestamp(now - Duration::hours(2));

        let window = ProcessFilter::in_window(TimeWindow::Last1Hour);
        assert!(window.matches(&recent, now));
        assert!(!window.matches(&old, now));

        let by_status = ProcessFilter::default().with_status(ProcessStatus::Completed);
        assert!(!by_status.matches(&recent, now));

        let by_name = ProcessFilter {
            name: Some("picking".to_string()),
            ..ProcessFilter::default()
        };
        assert!(by_name.matches(&recent, now));
        assert!(!by_name.matches(&old, now));
    }

    #[tokio::test]
    async fn test_insert_get_list() {
        let store = InMemoryStore::new();
        store.insert(obs("Dispatch", ProcessStatus::Critical).with_id("d-1")).await;
        store.insert(obs("Receiving", ProcessStatus::Completed).with_id("r-1")).await;

        assert_eq!(store.count().await, 2);
        assert_eq!(store.get("r-1").await.map(|o| o.name), Some("Receiving".to_string()));
        assert!(store.get("missing").await.is_none());

        let all = store.list(&ProcessFilter::default()).await;
        assert_eq!(all[0].id, "d-1");
        assert_eq!(all[1].id, "r-1");
    }

    #[tokio::test]
    async fn test_seed_file_skips_invalid_records() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"name": "Dispatch", "actual_duration": 1260000, "average_duration": 720000, "status": "critical", "unit": "milliseconds"}},
                {{"name": "Broken", "actual_duration": -1, "average_duration": 10, "status": "delayed"}},
                {{"name": "Packing", "actual_duration": 660000, "average_duration": 600000, "status": "delayed", "unit": "ms"}},
                {{"name": "Storing", "actual_duration": 25, "average_duration": 20, "status": "delayed", "unit": "minutes"}}
            ]"#
        )
        .unwrap();

        let store = InMemoryStore::from_seed_file(file.path()).unwrap();
        let all = store.list(&ProcessFilter::default()).await;
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, "dispatch");
        assert_eq!(all[0].actual_duration, 1260.0);
        assert_eq!(all[1].id, "packing");
        assert_eq!(all[1].actual_duration, 660.0);
    }

    #[test]
    fn test_seed_file_malformed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(InMemoryStore::from_seed_file(file.path()).is_err());
    }
}
