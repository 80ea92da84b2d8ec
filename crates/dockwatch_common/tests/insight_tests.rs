//! Golden tests for insight text and enrichment fallback.
//!
//! Tests verify:
//! - Template messages are pinned per tier
//! - Any enrichment failure yields exactly the template message
//! - Batch generation keeps input order

use dockwatch_common::analysis::{analyze, RiskAnalysis};
use dockwatch_common::config::Thresholds;
use dockwatch_common::enrich::{FakeEnricher, InsightGenerator, LlmError, MessageSource};
use dockwatch_common::insight::{fallback_message, InsightTier};
use dockwatch_common::observation::{ProcessObservation, ProcessStatus};
use std::sync::Arc;
use std::time::Duration;

fn run(name: &str, actual: f64, average: f64, status: ProcessStatus) -> RiskAnalysis {
    analyze(
        &ProcessObservation::new(name, actual, average, status),
        &Thresholds::default(),
    )
    .unwrap()
}

fn dispatch() -> RiskAnalysis {
    run("Dispatch", 1260.0, 720.0, ProcessStatus::Critical)
}

/// GOLDEN: critical template
#[test]
fn golden_critical_message() {
    assert_eq!(
        fallback_message(&dispatch(), InsightTier::Critical),
        "🔴 CRITICAL: Dispatch severely delayed by 9 minutes (75.0%). Immediate intervention required: deploy additional resources and investigate root cause."
    );
}

/// GOLDEN: urgent template quotes the score
#[test]
fn golden_urgent_message() {
    assert_eq!(
        fallback_message(&dispatch(), InsightTier::Urgent),
        "⚠️ URGENT: Dispatch experiencing 9 minute delay (risk score: 93). Recommend immediate resource reallocation and process review."
    );
}

/// GOLDEN: warning, attention and info templates
#[test]
fn golden_lower_tiers() {
    let packing = run("Packing", 660.0, 600.0, ProcessStatus::Delayed);
    assert_eq!(InsightTier::for_analysis(&packing, &Thresholds::default()), InsightTier::Warning);
    assert_eq!(
        fallback_message(&packing, InsightTier::Warning),
        "📊 WARNING: Packing showing 10.0% delay. Monitor closely and prepare contingency plans to prevent escalation."
    );
    assert_eq!(
        fallback_message(&packing, InsightTier::Attention),
        "💡 ATTENTION: Packing has early warning signs (risk: 43). Continue monitoring and consider process optimization."
    );

    let receiving = run("Receiving", 840.0, 900.0, ProcessStatus::Completed);
    assert_eq!(InsightTier::for_analysis(&receiving, &Thresholds::default()), InsightTier::Info);
    assert_eq!(
        fallback_message(&receiving, InsightTier::Info),
        "ℹ️ Receiving showing 6.7% delay. Review for potential optimization opportunities."
    );
}

#[tokio::test]
async fn enrichment_error_returns_fallback_exactly() {
    let errors = vec![
        LlmError::HttpStatus(500),
        LlmError::HttpError("connection refused".to_string()),
        LlmError::InvalidResponse("not json".to_string()),
        LlmError::EmptyResponse,
        LlmError::NotConfigured,
    ];
    let analysis = dispatch();
    let expected = fallback_message(&analysis, InsightTier::Critical);

    for error in errors {
        let fake = Arc::new(FakeEnricher::always_error(error));
        let generator = InsightGenerator::rule_based(Thresholds::default()).with_enricher(fake.clone());
        let insight = generator.generate(&analysis).await;

        assert_eq!(insight.message, expected);
        assert_eq!(insight.source, MessageSource::Fallback);
        assert_eq!(fake.call_count(), 1, "exactly one attempt, no retries");
    }
}

#[tokio::test]
async fn slow_enricher_times_out_to_fallback() {
    let fake = Arc::new(FakeEnricher::always_ok("too late").with_delay(Duration::from_millis(500)));
    let generator = InsightGenerator::rule_based(Thresholds::default())
        .with_enricher(fake.clone())
        .with_timeout(Duration::from_millis(20));

    let analysis = dispatch();
    let insight = generator.generate(&analysis).await;
    assert_eq!(insight.source, MessageSource::Fallback);
    assert_eq!(insight.message, fallback_message(&analysis, InsightTier::Critical));
    assert_eq!(fake.call_count(), 1);
}

#[tokio::test]
async fn batch_keeps_order_and_mixes_sources() {
    let fake = Arc::new(FakeEnricher::new(vec![
        Ok("🔴 Dispatch needs loaders now.".to_string()),
        Err(LlmError::HttpStatus(429)),
    ]));
    let generator = InsightGenerator::rule_based(Thresholds::default()).with_enricher(fake.clone());

    let analyses = vec![
        dispatch(),
        run("Receiving", 840.0, 900.0, ProcessStatus::Completed),
        run("Quality Check", 2400.0, 1200.0, ProcessStatus::Failed),
    ];
    let insights = generator.generate_batch(&analyses).await;

    let names: Vec<_> = insights.iter().map(|i| i.process_name.as_str()).collect();
    assert_eq!(names, vec!["Dispatch", "Receiving", "Quality Check"]);
    // Receiving scores 7, below the enrichment cut-off
    assert_eq!(insights[1].source, MessageSource::Fallback);
    assert_eq!(fake.call_count(), 2);
    assert_eq!(
        insights.iter().filter(|i| i.source == MessageSource::Enriched).count(),
        1
    );
}

#[tokio::test]
async fn explicit_level_maps_to_tier() {
    let generator = InsightGenerator::rule_based(Thresholds::default());
    let insight = generator
        .generate_with_tier(&dispatch(), dockwatch_common::RiskLevel::High)
        .await;
    assert_eq!(insight.tier, InsightTier::Urgent);
    assert!(insight.message.starts_with("⚠️ URGENT: Dispatch"));
}
