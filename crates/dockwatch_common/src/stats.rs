//! Status counts, per-process roll-ups and the delayed-process view.

use crate::observation::{ProcessObservation, ProcessStatus};
use crate::scoring::{delay_percentage, round_half_up};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub delayed: usize,
    pub critical: usize,
    pub failed: usize,
    pub unknown: usize,
}

impl StatusCounts {
    pub fn record(&mut self, status: ProcessStatus) {
        self.total += 1;
        match status {
            ProcessStatus::Completed => self.completed += 1,
            ProcessStatus::InProgress => self.in_progress += 1,
            ProcessStatus::Delayed => self.delayed += 1,
            ProcessStatus::Critical => self.critical += 1,
            ProcessStatus::Failed => self.failed += 1,
            ProcessStatus::Unknown => self.unknown += 1,
        }
    }

    pub fn from_observations(observations: &[ProcessObservation]) -> Self {
        let mut counts = Self::default();
        for observation in observations {
            counts.record(observation.status);
        }
        counts
    }
}

/// Roll-up of every run of one named process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessNameSummary {
    pub name: String,
    pub total_runs: usize,
    pub statuses: StatusCounts,
    /// Mean actual duration, whole seconds
    pub avg_duration: f64,
    pub max_duration: f64,
    pub min_duration: f64,
    /// Sum of positive overruns, seconds
    pub total_delay: f64,
}

/// Group by process name; groups appear in first-seen order
pub fn summarize_by_name(observations: &[ProcessObservation]) -> Vec<ProcessNameSummary> {
    let mut groups: Vec<ProcessNameSummary> = Vec::new();
    let mut duration_sums: Vec<f64> = Vec::new();

    for observation in observations {
        let index = match groups.iter().position(|g| g.name == observation.name) {
            Some(index) => index,
            None => {
                groups.push(ProcessNameSummary {
                    name: observation.name.clone(),
                    total_runs: 0,
                    statuses: StatusCounts::default(),
                    avg_duration: 0.0,
                    max_duration: f64::MIN,
                    min_duration: f64::MAX,
                    total_delay: 0.0,
                });
                duration_sums.push(0.0);
                groups.len() - 1
            }
        };

        let group = &mut groups[index];
        group.total_runs += 1;
        group.statuses.record(observation.status);
        group.max_duration = group.max_duration.max(observation.actual_duration);
        group.min_duration = group.min_duration.min(observation.actual_duration);
        group.total_delay += (observation.actual_duration - observation.average_duration).max(0.0);
        duration_sums[index] += observation.actual_duration;
    }

    for (group, sum) in groups.iter_mut().zip(duration_sums) {
        group.avg_duration = round_half_up(sum / group.total_runs as f64);
    }

    groups
}

/// Delayed-status record with its overrun
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelayedProcess {
    #[serde(flatten)]
    pub observation: ProcessObservation,
    pub delay_seconds: f64,
    /// Whole-number percentage
    pub delay_percentage: f64,
}

impl DelayedProcess {
    pub fn from_observation(observation: ProcessObservation) -> Self {
        let delay_seconds = observation.actual_duration - observation.average_duration;
        let delay_percentage = round_half_up(delay_percentage(
            observation.actual_duration,
            observation.average_duration,
        ));
        Self {
            observation,
            delay_seconds,
            delay_percentage,
        }
    }
}

/// Records whose status is `delayed`, with overrun figures
pub fn delayed_processes(observations: &[ProcessObservation]) -> Vec<DelayedProcess> {
    observations
        .iter()
        .filter(|o| o.status == ProcessStatus::Delayed)
        .cloned()
        .map(DelayedProcess::from_observation)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(name: &str, actual: f64, average: f64, status: ProcessStatus) -> ProcessObservation {
        ProcessObservation::new(name, actual, average, status)
    }

    #[test]
    fn test_status_counts() {
        let observations = vec![
            obs("A", 1.0, 1.0, ProcessStatus::Completed),
            obs("B", 1.0, 1.0, ProcessStatus::Delayed),
            obs("C", 1.0, 1.0, ProcessStatus::Delayed),
            obs("D", 1.0, 1.0, ProcessStatus::InProgress),
        ];
        let counts = StatusCounts::from_observations(&observations);
        assert_eq!(counts.total, 4);
        assert_eq!(counts.delayed, 2);
        assert_eq!(counts.in_progress, 1);
        assert_eq!(counts.failed, 0);
    }

    #[test]
    fn test_summarize_by_name() {
        let observations = vec![
            obs("Dispatch", 900.0, 720.0, ProcessStatus::Delayed),
            obs("Receiving", 300.0, 400.0, ProcessStatus::Completed),
            obs("Dispatch", 601.0, 720.0, ProcessStatus::Completed),
        ];
        let groups = summarize_by_name(&observations);

        assert_eq!(groups.len(), 2);
        let dispatch = &groups[0];
        assert_eq!(dispatch.name, "Dispatch");
        assert_eq!(dispatch.total_runs, 2);
        assert_eq!(dispatch.statuses.delayed, 1);
        assert_eq!(dispatch.statuses.completed, 1);
        assert_eq!(dispatch.avg_duration, 751.0); // 750.5 rounds up
        assert_eq!(dispatch.max_duration, 900.0);
        assert_eq!(dispatch.min_duration, 601.0);
        assert_eq!(dispatch.total_delay, 180.0);
        assert_eq!(groups[1].total_delay, 0.0);
    }

    #[test]
    fn test_delayed_processes() {
        let observations = vec![
            obs("Dispatch", 900.0, 720.0, ProcessStatus::Delayed),
            obs("Receiving", 300.0, 400.0, ProcessStatus::Completed),
        ];
        let delayed = delayed_processes(&observations);
        assert_eq!(delayed.len(), 1);
        assert_eq!(delayed[0].delay_seconds, 180.0);
        assert_eq!(delayed[0].delay_percentage, 25.0);
    }
}
