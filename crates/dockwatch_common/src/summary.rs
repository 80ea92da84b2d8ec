//! Batch roll-up of risk analyses.

use crate::analysis::RiskAnalysis;
use crate::scoring::{round_half_up, saturate};
use crate::severity::RiskLevel;
use serde::{Deserialize, Serialize};

pub const NO_PROCESS: &str = "None";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskDistribution {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl RiskDistribution {
    pub fn count(&self, level: RiskLevel) -> usize {
        match level {
            RiskLevel::Critical => self.critical,
            RiskLevel::High => self.high,
            RiskLevel::Medium => self.medium,
            RiskLevel::Low => self.low,
        }
    }

    fn record(&mut self, level: RiskLevel) {
        match level {
            RiskLevel::Critical => self.critical += 1,
            RiskLevel::High => self.high += 1,
            RiskLevel::Medium => self.medium += 1,
            RiskLevel::Low => self.low += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateSummary {
    pub total_processes: usize,
    pub bottleneck_count: usize,
    pub bottlenecks: Vec<String>,
    pub risk_distribution: RiskDistribution,
    /// Rounded mean; 0 for an empty batch
    pub average_risk_score: u8,
    /// Sum of positive overruns, seconds
    pub total_delay: f64,
    pub most_problematic: String,
}

/// Pure and total; an empty slice yields zeroed counts and "None"
pub fn summarize(analyses: &[RiskAnalysis]) -> AggregateSummary {
    let mut distribution = RiskDistribution::default();
    let mut bottlenecks = Vec::new();
    let mut score_sum: u64 = 0;
    let mut total_delay = 0.0;
    let mut worst: Option<&RiskAnalysis> = None;

    for analysis in analyses {
        distribution.record(analysis.risk_level);
        score_sum += u64::from(analysis.risk_score);
        total_delay = saturate(total_delay + analysis.delay_time.max(0.0));

        if analysis.is_potential_bottleneck {
            bottlenecks.push(analysis.process_name.clone());
        }
        // Strict comparison keeps the earliest of equal scores
        if worst.map_or(true, |w| analysis.risk_score > w.risk_score) {
            worst = Some(analysis);
        }
    }

    let average_risk_score = if analyses.is_empty() {
        0
    } else {
        round_half_up(score_sum as f64 / analyses.len() as f64) as u8
    };

    AggregateSummary {
        total_processes: analyses.len(),
        bottleneck_count: bottlenecks.len(),
        bottlenecks,
        risk_distribution: distribution,
        average_risk_score,
        total_delay,
        most_problematic: worst
            .map(|w| w.process_name.clone())
            .unwrap_or_else(|| NO_PROCESS.to_string()),
    }
}
