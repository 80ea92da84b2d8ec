//! Dockwatch Common - risk scoring and insight engine for warehouse processes.
//!
//! Pure computation lives here: normalization, scoring, classification,
//! bottleneck detection, insight templates and the batch summary. The only
//! I/O is the optional enrichment client and alert channel.
//!
//! v0.2.0: One shared threshold set, additive scorer only
//! v0.3.0: Enrichment via injected `InsightEnricher`, cost impact, recommendations
//! v0.4.0: Per-name roll-ups and the delayed view
//! v0.5.0: Alert and digest delivery through an injected `AlertNotifier`

pub mod analysis;
pub mod bottleneck;
pub mod config;
pub mod cost;
pub mod duration;
pub mod enrich;
pub mod error;
pub mod insight;
pub mod notify;
pub mod observation;
pub mod openrouter;
pub mod recommend;
pub mod report;
pub mod scoring;
pub mod severity;
pub mod stats;
pub mod summary;
pub mod window;

pub use analysis::{
    analyze, analyze_batch, analyze_raw_batch, analyze_rows, sort_by_risk, BatchOutcome, RiskAnalysis,
};
pub use config::{BottleneckRule, DockwatchConfig, Thresholds};
pub use duration::DurationUnit;
pub use enrich::{FakeEnricher, GeneratedInsight, InsightEnricher, InsightGenerator, LlmError, MessageSource};
pub use error::{ConfigError, ValidationError};
pub use insight::{fallback_message, InsightTier};
pub use notify::{AlertMessage, AlertNotifier, DispatchReport, FakeNotifier, Notifier, NotifyError};
pub use observation::{decode_rows, ProcessObservation, ProcessStatus, RawObservation, UndecodableRow};
pub use scoring::{score, score_breakdown, ScoreBreakdown};
pub use severity::{classify, RiskLevel};
pub use summary::{summarize, AggregateSummary};
pub use window::TimeWindow;

/// Crate version, shared by daemon and CLI
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
