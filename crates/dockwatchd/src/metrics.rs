//! Prometheus metrics for the daemon

use dockwatch_common::analysis::RiskAnalysis;
use dockwatch_common::enrich::{GeneratedInsight, MessageSource};
use dockwatch_common::notify::DispatchReport;
use prometheus::{
    register_int_counter_vec_with_registry, register_int_counter_with_registry,
    register_int_gauge_with_registry, Encoder, IntCounter, IntCounterVec, IntGauge, Registry,
    TextEncoder,
};

#[derive(Clone)]
pub struct DaemonMetrics {
    pub analyses_total: IntCounter,
    pub insights_total: IntCounterVec,
    pub enrichment_failures_total: IntCounter,
    pub bottlenecks: IntGauge,
    pub notifications_total: IntCounterVec,

    registry: Registry,
}

impl DaemonMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let analyses_total = register_int_counter_with_registry!(
            "dockwatch_analyses_total",
            "Total number of process observations analysed",
            registry
        )?;

        let insights_total = register_int_counter_vec_with_registry!(
            "dockwatch_insights_total",
            "Total number of insight messages generated by source",
            &["source"],
            registry
        )?;

        let enrichment_failures_total = register_int_counter_with_registry!(
            "dockwatch_enrichment_failures_total",
            "Enrichment attempts that fell back to the rule-based message",
            registry
        )?;

        let bottlenecks = register_int_gauge_with_registry!(
            "dockwatch_bottlenecks",
            "Potential bottlenecks in the most recent analysis",
            registry
        )?;

        let notifications_total = register_int_counter_vec_with_registry!(
            "dockwatch_notifications_total",
            "Alert deliveries by outcome",
            &["outcome"],
            registry
        )?;

        Ok(Self {
            analyses_total,
            insights_total,
            enrichment_failures_total,
            bottlenecks,
            notifications_total,
            registry,
        })
    }

    pub fn record_analysis(&self, analyses: &[RiskAnalysis]) {
        self.analyses_total.inc_by(analyses.len() as u64);
        let flagged = analyses.iter().filter(|a| a.is_potential_bottleneck).count();
        self.bottlenecks.set(flagged as i64);
    }

    /// `attempted` counts insights that were eligible for enrichment
    pub fn record_insights(&self, insights: &[GeneratedInsight], attempted: usize) {
        let enriched = insights
            .iter()
            .filter(|i| i.source == MessageSource::Enriched)
            .count();
        let fallback = insights.len() - enriched;

        self.insights_total
            .with_label_values(&["enriched"])
            .inc_by(enriched as u64);
        self.insights_total
            .with_label_values(&["fallback"])
            .inc_by(fallback as u64);
        self.enrichment_failures_total
            .inc_by(attempted.saturating_sub(enriched) as u64);
    }

    pub fn record_dispatch(&self, report: &DispatchReport) {
        self.notifications_total
            .with_label_values(&["delivered"])
            .inc_by(report.sent as u64);
        self.notifications_total
            .with_label_values(&["failed"])
            .inc_by((report.total - report.sent) as u64);
    }

    /// Export metrics in Prometheus text format
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
