//! Severity classification of risk scores.

use crate::config::Thresholds;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered severity bands. `Ord` follows severity: Low < Critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Critical,
        RiskLevel::High,
        RiskLevel::Medium,
        RiskLevel::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Critical => "Critical",
        }
    }

    /// Colored dot used in text reports
    pub fn marker(&self) -> &'static str {
        match self {
            RiskLevel::Critical => "🔴",
            RiskLevel::High => "🟠",
            RiskLevel::Medium => "🟡",
            RiskLevel::Low => "🟢",
        }
    }

    /// Classify with the default threshold set
    pub fn from_score(score: u8) -> Self {
        classify(score, &Thresholds::default())
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Total function over scores; lower bounds are inclusive
pub fn classify(score: u8, thresholds: &Thresholds) -> RiskLevel {
    if score >= thresholds.critical {
        RiskLevel::Critical
    } else if score >= thresholds.high {
        RiskLevel::High
    } else if score >= thresholds.medium {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_edges() {
        let t = Thresholds::default();
        assert_eq!(classify(0, &t), RiskLevel::Low);
        assert_eq!(classify(39, &t), RiskLevel::Low);
        assert_eq!(classify(40, &t), RiskLevel::Medium);
        assert_eq!(classify(59, &t), RiskLevel::Medium);
        assert_eq!(classify(60, &t), RiskLevel::High);
        assert_eq!(classify(79, &t), RiskLevel::High);
        assert_eq!(classify(80, &t), RiskLevel::Critical);
        assert_eq!(classify(100, &t), RiskLevel::Critical);
    }

    #[test]
    fn test_custom_medium_bound() {
        let t = Thresholds {
            medium: 30,
            ..Thresholds::default()
        };
        assert_eq!(classify(30, &t), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(30), RiskLevel::Low);
    }

    #[test]
    fn test_ordering() {
        assert!(RiskLevel::Critical > RiskLevel::High);
        assert!(RiskLevel::Medium > RiskLevel::Low);
    }
}
