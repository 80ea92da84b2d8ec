//! Command implementations.

use crate::client::DaemonClient;
use crate::output;
use anyhow::{Context, Result};
use dockwatch_common::analysis::{analyze, analyze_rows, sort_by_risk, BatchOutcome};
use dockwatch_common::bottleneck::{is_bottleneck, is_bottleneck_strict};
use dockwatch_common::config::DockwatchConfig;
use dockwatch_common::cost::estimate;
use dockwatch_common::duration::{to_seconds, DurationUnit};
use dockwatch_common::enrich::InsightGenerator;
use dockwatch_common::insight::{
    fallback_message, qualifies_for_insight, InsightTier, ALL_CLEAR_MESSAGE, NO_DATA_MESSAGE,
};
use dockwatch_common::observation::{
    decode_rows, ProcessObservation, ProcessStatus, RawObservation, UndecodableRow,
};
use dockwatch_common::report::format_risk_report;
use dockwatch_common::scoring::score_breakdown;
use dockwatch_common::severity::classify;
use dockwatch_common::summary::summarize;
use dockwatch_common::window::TimeWindow;
use std::path::Path;

fn parse_unit(unit: Option<&str>) -> Result<Option<DurationUnit>> {
    unit.map(|u| u.parse::<DurationUnit>())
        .transpose()
        .context("Invalid --unit")
}

/// Read a JSON array of observation rows, optionally forcing one unit.
/// Rows that do not decode come back as errors in place.
pub fn load_observations(
    path: &Path,
    unit: Option<DurationUnit>,
) -> Result<Vec<Result<RawObservation, UndecodableRow>>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let rows = decode_rows(&content)
        .with_context(|| format!("Failed to parse {} as a JSON array of observations", path.display()))?;

    Ok(match unit {
        Some(unit) => rows.into_iter().map(|row| row.map(|r| r.in_unit(unit))).collect(),
        None => rows,
    })
}

fn analyze_file(path: &Path, unit: Option<&str>, config: &DockwatchConfig) -> Result<BatchOutcome> {
    let rows = load_observations(path, parse_unit(unit)?)?;
    let outcome = analyze_rows(rows, &config.thresholds);
    for rejected in &outcome.rejected {
        output::display_warning(&format!(
            "Skipped record {} ({}): {}",
            rejected.index, rejected.process_name, rejected.reason
        ));
    }
    Ok(outcome)
}

pub fn score(
    config: &DockwatchConfig,
    actual: f64,
    average: f64,
    status: &str,
    unit: &str,
) -> Result<String> {
    let status = status.parse::<ProcessStatus>()?;
    let unit = unit.parse::<DurationUnit>()?;
    let actual = to_seconds(actual, unit)?;
    let average = to_seconds(average, unit)?;

    let thresholds = &config.thresholds;
    let breakdown = score_breakdown(actual, average, status);
    let level = classify(breakdown.total, thresholds);
    let tier = InsightTier::select(status, breakdown.total, thresholds);

    let analysis = analyze(&ProcessObservation::new("Process", actual, average, status), thresholds)?;
    let message = fallback_message(&analysis, tier);

    Ok(output::render_breakdown(
        &breakdown,
        level,
        is_bottleneck_strict(breakdown.total, thresholds),
        is_bottleneck(breakdown.total, breakdown.delay_percentage, thresholds),
        tier,
        &message,
    ))
}

pub fn analyze_command(
    config: &DockwatchConfig,
    file: &Path,
    unit: Option<&str>,
    json: bool,
) -> Result<String> {
    let mut outcome = analyze_file(file, unit, config)?;
    for analysis in outcome.analyses.iter_mut() {
        let tier = InsightTier::for_analysis(analysis, &config.thresholds);
        analysis.message = Some(fallback_message(analysis, tier));
    }

    if json {
        let summary = summarize(&outcome.analyses);
        let body = serde_json::json!({
            "analyses": outcome.analyses,
            "summary": summary,
            "rejected": outcome.rejected,
        });
        return Ok(serde_json::to_string_pretty(&body)?);
    }

    Ok(format_risk_report(&outcome.analyses))
}

pub async fn insights(
    config: &DockwatchConfig,
    file: &Path,
    threshold: Option<u8>,
    enrich: bool,
    unit: Option<&str>,
) -> Result<String> {
    let outcome = analyze_file(file, unit, config)?;
    if outcome.analyses.is_empty() {
        return Ok(format!("{}\n", NO_DATA_MESSAGE));
    }

    let generator = if enrich {
        let generator = InsightGenerator::from_config(config);
        if !generator.has_enricher() {
            output::display_warning("Enrichment not configured, using rule-based insights");
        }
        generator
    } else {
        InsightGenerator::rule_based(config.thresholds.clone())
    };

    let threshold = threshold.unwrap_or(config.thresholds.insight_min_score);
    let mut candidates: Vec<_> = outcome
        .analyses
        .into_iter()
        .filter(|a| qualifies_for_insight(a, threshold, &config.thresholds))
        .collect();
    if candidates.is_empty() {
        return Ok(format!("{}\n", ALL_CLEAR_MESSAGE));
    }
    sort_by_risk(&mut candidates);

    let insights = generator.generate_batch(&candidates).await;
    Ok(output::render_insights(&insights))
}

pub fn cost(config: &DockwatchConfig, file: &Path, unit: Option<&str>) -> Result<String> {
    let outcome = analyze_file(file, unit, config)?;
    Ok(output::render_cost(&estimate(&outcome.analyses, &config.cost)))
}

pub async fn remote(url: &str, range: Option<&str>, json: bool) -> Result<String> {
    // Validate locally for a clearer error than the daemon's 400
    let range = range.map(|r| r.parse::<TimeWindow>()).transpose()?;
    let client = DaemonClient::new(url)?;
    let remote = client.analyze(range.map(|r| r.as_str())).await?;

    if json {
        let body = serde_json::json!({
            "range": remote.range,
            "analyses": remote.analyses,
            "summary": remote.summary,
        });
        return Ok(serde_json::to_string_pretty(&body)?);
    }

    let mut analyses = remote.analyses;
    sort_by_risk(&mut analyses);
    Ok(format!(
        "{}\n{}",
        output::render_table(&analyses),
        output::render_summary(&remote.summary)
    ))
}
