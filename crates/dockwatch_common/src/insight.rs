//! Insight tiers and deterministic alert text.
//!
//! The template output is the fallback for every enrichment failure, so it
//! must stay byte-for-byte stable for a given analysis and tier.

use crate::analysis::RiskAnalysis;
use crate::config::{EnrichmentConfig, Thresholds};
use crate::observation::ProcessStatus;
use crate::scoring::round_half_up;
use crate::severity::RiskLevel;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const NO_DATA_MESSAGE: &str = "ℹ️ No process data available for the selected time range";
pub const ALL_CLEAR_MESSAGE: &str = "✅ All processes operating normally, no bottlenecks detected";

/// Message tier, most severe first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightTier {
    Critical,
    Urgent,
    Warning,
    Attention,
    Info,
}

impl InsightTier {
    /// Status can escalate a tier on its own; score fills in the rest
    pub fn select(status: ProcessStatus, score: u8, thresholds: &Thresholds) -> Self {
        if status == ProcessStatus::Critical || score >= thresholds.critical {
            InsightTier::Critical
        } else if status == ProcessStatus::Failed || score >= thresholds.urgent {
            InsightTier::Urgent
        } else if status == ProcessStatus::Delayed || score >= thresholds.high {
            InsightTier::Warning
        } else if score >= thresholds.medium {
            InsightTier::Attention
        } else {
            InsightTier::Info
        }
    }

    pub fn for_analysis(analysis: &RiskAnalysis, thresholds: &Thresholds) -> Self {
        Self::select(analysis.status, analysis.risk_score, thresholds)
    }

    pub fn marker(&self) -> &'static str {
        match self {
            InsightTier::Critical => "🔴",
            InsightTier::Urgent => "⚠️",
            InsightTier::Warning => "📊",
            InsightTier::Attention => "💡",
            InsightTier::Info => "ℹ️",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InsightTier::Critical => "critical",
            InsightTier::Urgent => "urgent",
            InsightTier::Warning => "warning",
            InsightTier::Attention => "attention",
            InsightTier::Info => "info",
        }
    }
}

impl From<RiskLevel> for InsightTier {
    fn from(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Critical => InsightTier::Critical,
            RiskLevel::High => InsightTier::Urgent,
            RiskLevel::Medium => InsightTier::Warning,
            RiskLevel::Low => InsightTier::Info,
        }
    }
}

impl fmt::Display for InsightTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rule-based alert text for an analysis
pub fn fallback_message(analysis: &RiskAnalysis, tier: InsightTier) -> String {
    let name = &analysis.process_name;
    let marker = tier.marker();
    let pct = analysis.delay_percentage.abs();
    let minutes = analysis.delay_minutes();
    let score = analysis.risk_score;

    match tier {
        InsightTier::Critical => format!(
            "{} CRITICAL: {} severely delayed by {} minutes ({:.1}%). Immediate intervention required: deploy additional resources and investigate root cause.",
            marker, name, minutes, pct
        ),
        InsightTier::Urgent => format!(
            "{} URGENT: {} experiencing {} minute delay (risk score: {}). Recommend immediate resource reallocation and process review.",
            marker, name, minutes, score
        ),
        InsightTier::Warning => format!(
            "{} WARNING: {} showing {:.1}% delay. Monitor closely and prepare contingency plans to prevent escalation.",
            marker, name, pct
        ),
        InsightTier::Attention => format!(
            "{} ATTENTION: {} has early warning signs (risk: {}). Continue monitoring and consider process optimization.",
            marker, name, score
        ),
        InsightTier::Info => format!(
            "{} {} showing {:.1}% delay. Review for potential optimization opportunities.",
            marker, name, pct
        ),
    }
}

/// Listing filter: score at or above `min_score`, or a large relative overrun
pub fn qualifies_for_insight(analysis: &RiskAnalysis, min_score: u8, thresholds: &Thresholds) -> bool {
    analysis.risk_score >= min_score
        || analysis.delay_percentage >= thresholds.bottleneck_delay_percentage
}

/// Generation parameters sent alongside the prompt
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_tokens: 150,
            temperature: 0.7,
            top_p: 0.9,
        }
    }
}

impl From<&EnrichmentConfig> for GenerationParams {
    fn from(config: &EnrichmentConfig) -> Self {
        Self {
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
        }
    }
}

/// Structured request for the enrichment service
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightPrompt {
    pub process_name: String,
    pub tier: InsightTier,
    pub text: String,
    pub params: GenerationParams,
}

/// Build the enrichment prompt from the same fields the template uses
pub fn build_prompt(analysis: &RiskAnalysis, tier: InsightTier, params: GenerationParams) -> InsightPrompt {
    let actual_minutes = round_half_up(analysis.actual_duration / 60.0) as i64;
    let average_minutes = round_half_up(analysis.average_duration / 60.0) as i64;
    let delay_minutes = actual_minutes - average_minutes;
    let sign = if delay_minutes > 0 { "+" } else { "" };

    let text = format!(
        "You are a warehouse operations analyst. Write one alert for this process bottleneck.\n\
         \n\
         Process: {name}\n\
         Status: {status}\n\
         Performance: {actual} minutes (expected: {average} minutes)\n\
         Delay: {sign}{delay} minutes ({pct:.1}%)\n\
         Risk score: {score}/100\n\
         Severity: {tier}\n\
         \n\
         Requirements:\n\
         - Start with the marker {marker}\n\
         - Say what is happening and why it matters\n\
         - Give one specific, actionable recommendation\n\
         - At most 2 sentences\n\
         - Use warehouse operations terminology\n\
         \n\
         Reply with the alert text only.",
        name = analysis.process_name,
        status = analysis.status,
        actual = actual_minutes,
        average = average_minutes,
        sign = sign,
        delay = delay_minutes,
        pct = analysis.delay_percentage,
        score = analysis.risk_score,
        tier = tier,
        marker = tier.marker(),
    );

    InsightPrompt {
        process_name: analysis.process_name.clone(),
        tier,
        text,
        params,
    }
}
