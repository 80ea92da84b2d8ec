//! Fixed reporting windows.

use crate::error::ValidationError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TimeWindow {
    #[default]
    #[serde(rename = "last1Hour")]
    Last1Hour,
    #[serde(rename = "last6Hours")]
    Last6Hours,
    #[serde(rename = "last24Hours")]
    Last24Hours,
    #[serde(rename = "last7Days")]
    Last7Days,
}

impl TimeWindow {
    pub const ALL: [TimeWindow; 4] = [
        TimeWindow::Last1Hour,
        TimeWindow::Last6Hours,
        TimeWindow::Last24Hours,
        TimeWindow::Last7Days,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::Last1Hour => "last1Hour",
            TimeWindow::Last6Hours => "last6Hours",
            TimeWindow::Last24Hours => "last24Hours",
            TimeWindow::Last7Days => "last7Days",
        }
    }

    pub fn short(&self) -> &'static str {
        match self {
            TimeWindow::Last1Hour => "1h",
            TimeWindow::Last6Hours => "6h",
            TimeWindow::Last24Hours => "24h",
            TimeWindow::Last7Days => "7d",
        }
    }

    pub fn span(&self) -> Duration {
        match self {
            TimeWindow::Last1Hour => Duration::hours(1),
            TimeWindow::Last6Hours => Duration::hours(6),
            TimeWindow::Last24Hours => Duration::hours(24),
            TimeWindow::Last7Days => Duration::days(7),
        }
    }

    /// Earliest timestamp inside the window
    pub fn start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.span()
    }

    pub fn contains(&self, timestamp: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        timestamp >= self.start(now)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeWindow {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeWindow::ALL
            .iter()
            .find(|w| w.as_str() == s || w.short() == s)
            .copied()
            .ok_or_else(|| ValidationError::UnknownTimeRange(s.to_string()))
    }
}
