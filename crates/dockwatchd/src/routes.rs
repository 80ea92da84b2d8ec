//! API routes for dockwatchd
//!
//! Every read endpoint accepts `range` (`last1Hour`..`last7Days` or `1h`..`7d`).
//! Without it all stored observations are used.
//!
//! v0.3.0: Insights go through `InsightGenerator` (enrichment + fallback)
//! v0.4.0: Added /api/processes/summary, /api/processes/delayed and /api/cost
//! v0.5.0: Added /api/notifications/alert and /api/notifications/summary

use crate::error::ApiError;
use crate::server::AppState;
use crate::store::ProcessFilter;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use dockwatch_common::analysis::{analyze, analyze_batch, sort_by_risk, RejectedObservation, RiskAnalysis};
use dockwatch_common::cost::{estimate, CostReport};
use dockwatch_common::duration::DurationUnit;
use dockwatch_common::enrich::GeneratedInsight;
use dockwatch_common::insight::{
    fallback_message, qualifies_for_insight, InsightTier, ALL_CLEAR_MESSAGE, NO_DATA_MESSAGE,
};
use dockwatch_common::notify::{render_alert, render_digest, DeliveryResult};
use dockwatch_common::observation::{ProcessObservation, ProcessStatus, RawObservation};
use dockwatch_common::recommend::{recommend, Recommendation};
use dockwatch_common::report::format_risk_report;
use dockwatch_common::stats::{
    delayed_processes, summarize_by_name, DelayedProcess, ProcessNameSummary, StatusCounts,
};
use dockwatch_common::summary::{summarize, AggregateSummary};
use dockwatch_common::window::TimeWindow;
use dockwatch_common::VERSION;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

type AppStateArc = Arc<AppState>;

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub range: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProcessQuery {
    pub range: Option<String>,
    pub status: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InsightQuery {
    pub range: Option<String>,
    pub threshold: Option<String>,
}

fn parse_window(range: Option<&str>) -> Result<Option<TimeWindow>, ApiError> {
    match range {
        None | Some("") => Ok(None),
        Some(value) => Ok(Some(value.parse::<TimeWindow>()?)),
    }
}

fn parse_threshold(value: Option<&str>, default: u8) -> Result<u8, ApiError> {
    let Some(value) = value else {
        return Ok(default);
    };
    match value.parse::<u8>() {
        Ok(threshold) if threshold <= 100 => Ok(threshold),
        _ => Err(ApiError::BadRequest(format!(
            "threshold must be an integer between 0 and 100 (got '{}')",
            value
        ))),
    }
}

fn window_filter(range: Option<&str>) -> Result<ProcessFilter, ApiError> {
    Ok(ProcessFilter {
        window: parse_window(range)?,
        ..ProcessFilter::default()
    })
}

/// Analyses in input order, each carrying its rule-based message
async fn load_analyses(
    state: &AppState,
    filter: &ProcessFilter,
) -> (Vec<RiskAnalysis>, Vec<RejectedObservation>) {
    let observations = state.store.list(filter).await;
    let thresholds = state.generator.thresholds();
    let mut outcome = analyze_batch(&observations, thresholds);

    for analysis in outcome.analyses.iter_mut() {
        let tier = InsightTier::for_analysis(analysis, thresholds);
        analysis.message = Some(fallback_message(analysis, tier));
    }

    state.metrics.record_analysis(&outcome.analyses);
    (outcome.analyses, outcome.rejected)
}

// ============================================================================
// Health Routes
// ============================================================================

pub fn health_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/", get(banner))
        .route("/api/health", get(health_check))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BannerResponse {
    pub name: String,
    pub status: String,
    pub version: String,
}

async fn banner() -> Json<BannerResponse> {
    Json(BannerResponse {
        name: "dockwatch".to_string(),
        status: "running".to_string(),
        version: VERSION.to_string(),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub uptime_secs: u64,
    pub enrichment: bool,
    pub notifications: bool,
    pub processes: usize,
}

async fn health_check(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        enrichment: state.generator.has_enricher(),
        notifications: state.notifier.is_configured(),
        processes: state.store.count().await,
    })
}

// ============================================================================
// Process Routes
// ============================================================================

pub fn process_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/api/processes", get(list_processes).post(create_process))
        .route("/api/processes/delayed", get(list_delayed))
        .route("/api/processes/summary", get(summary_by_name))
        .route("/api/processes/:id", get(get_process))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AppliedFilters {
    pub range: Option<String>,
    pub status: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProcessListResponse {
    pub count: usize,
    pub filters: AppliedFilters,
    pub stats: StatusCounts,
    pub data: Vec<ProcessObservation>,
}

async fn list_processes(
    State(state): State<AppStateArc>,
    Query(query): Query<ProcessQuery>,
) -> Result<Json<ProcessListResponse>, ApiError> {
    let status = match query.status.as_deref() {
        None | Some("") => None,
        Some(value) => Some(value.parse::<ProcessStatus>()?),
    };
    let filter = ProcessFilter {
        window: parse_window(query.range.as_deref())?,
        status,
        name: query.name.clone().filter(|n| !n.is_empty()),
    };

    let data = state.store.list(&filter).await;
    Ok(Json(ProcessListResponse {
        count: data.len(),
        stats: StatusCounts::from_observations(&data),
        filters: AppliedFilters {
            range: filter.window.map(|w| w.as_str().to_string()),
            status: filter.status.map(|s| s.as_str().to_string()),
            name: filter.name,
        },
        data,
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub count: usize,
    pub data: Vec<T>,
}

impl<T> ListResponse<T> {
    fn new(data: Vec<T>) -> Self {
        Self {
            count: data.len(),
            data,
        }
    }
}

async fn list_delayed(
    State(state): State<AppStateArc>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<ListResponse<DelayedProcess>>, ApiError> {
    let filter = window_filter(query.range.as_deref())?.with_status(ProcessStatus::Delayed);
    let observations = state.store.list(&filter).await;
    Ok(Json(ListResponse::new(delayed_processes(&observations))))
}

async fn summary_by_name(
    State(state): State<AppStateArc>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<ListResponse<ProcessNameSummary>>, ApiError> {
    let observations = state.store.list(&window_filter(query.range.as_deref())?).await;
    Ok(Json(ListResponse::new(summarize_by_name(&observations))))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProcessDetail {
    pub process: ProcessObservation,
    pub analysis: RiskAnalysis,
    pub recommendations: Vec<Recommendation>,
}

fn detail_for(state: &AppState, observation: ProcessObservation) -> Result<ProcessDetail, ApiError> {
    let thresholds = state.generator.thresholds();
    let mut analysis = analyze(&observation, thresholds)?;
    let tier = InsightTier::for_analysis(&analysis, thresholds);
    analysis.message = Some(fallback_message(&analysis, tier));
    let recommendations = recommend(&analysis);

    Ok(ProcessDetail {
        process: observation,
        analysis,
        recommendations,
    })
}

async fn get_process(
    State(state): State<AppStateArc>,
    Path(id): Path<String>,
) -> Result<Json<ProcessDetail>, ApiError> {
    let observation = state
        .store
        .get(&id)
        .await
        .ok_or_else(|| ApiError::NotFound(id.clone()))?;
    Ok(Json(detail_for(&state, observation)?))
}

/// Body for POST /api/processes. Status and unit are parsed strictly.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateProcessRequest {
    pub name: String,
    pub actual_duration: f64,
    pub average_duration: f64,
    pub status: String,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl CreateProcessRequest {
    fn into_observation(self) -> Result<ProcessObservation, ApiError> {
        let status = self.status.parse::<ProcessStatus>()?;
        let unit = match self.unit.as_deref() {
            Some(unit) => unit.parse::<DurationUnit>()?,
            None => DurationUnit::default(),
        };

        let raw = RawObservation {
            id: uuid::Uuid::new_v4().to_string(),
            name: self.name.trim().to_string(),
            actual_duration: self.actual_duration,
            average_duration: self.average_duration,
            status,
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            unit,
        };
        Ok(raw.normalize()?)
    }
}

async fn create_process(
    State(state): State<AppStateArc>,
    payload: Result<Json<CreateProcessRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ProcessDetail>), ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let observation = request.into_observation()?;

    let stored = state.store.insert(observation).await;
    info!("  Created process {} ({})", stored.name, stored.id);

    Ok((StatusCode::CREATED, Json(detail_for(&state, stored)?)))
}

// ============================================================================
// Analysis Routes
// ============================================================================

pub fn analysis_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/api/analyze", get(analyze_range))
        .route("/api/report", get(report))
        .route("/api/cost", get(cost_impact))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub range: Option<String>,
    pub analyses: Vec<RiskAnalysis>,
    pub summary: AggregateSummary,
    pub rejected: Vec<RejectedObservation>,
}

async fn analyze_range(
    State(state): State<AppStateArc>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let filter = window_filter(query.range.as_deref())?;
    let (analyses, rejected) = load_analyses(&state, &filter).await;
    let summary = summarize(&analyses);

    Ok(Json(AnalyzeResponse {
        range: filter.window.map(|w| w.as_str().to_string()),
        analyses,
        summary,
        rejected,
    }))
}

async fn report(
    State(state): State<AppStateArc>,
    Query(query): Query<RangeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = window_filter(query.range.as_deref())?;
    let (analyses, _) = load_analyses(&state, &filter).await;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        format_risk_report(&analyses),
    ))
}

async fn cost_impact(
    State(state): State<AppStateArc>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<CostReport>, ApiError> {
    let filter = window_filter(query.range.as_deref())?;
    let (analyses, _) = load_analyses(&state, &filter).await;
    Ok(Json(estimate(&analyses, &state.config.cost)))
}

// ============================================================================
// Insight Routes
// ============================================================================

pub fn insight_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/api/insights", get(insights))
        .route("/api/insights/high-risk", get(high_risk_insights))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsResponse {
    pub count: usize,
    pub range: Option<String>,
    pub threshold: u8,
    pub messages: Vec<String>,
    pub details: Vec<GeneratedInsight>,
}

/// Generate, then order by score (stable), then flatten to messages
async fn build_insights(
    state: &AppState,
    range: Option<TimeWindow>,
    threshold: u8,
    selected: impl Fn(&RiskAnalysis) -> bool,
) -> InsightsResponse {
    let filter = ProcessFilter {
        window: range,
        ..ProcessFilter::default()
    };
    let (analyses, _) = load_analyses(state, &filter).await;
    let range = range.map(|w| w.as_str().to_string());

    if analyses.is_empty() {
        return InsightsResponse {
            count: 0,
            range,
            threshold,
            messages: vec![NO_DATA_MESSAGE.to_string()],
            details: Vec::new(),
        };
    }

    let mut candidates: Vec<RiskAnalysis> = analyses.into_iter().filter(|a| selected(a)).collect();
    sort_by_risk(&mut candidates);

    let attempted = candidates
        .iter()
        .filter(|a| state.generator.enrichment_eligible(a.risk_score))
        .count();
    let details = state.generator.generate_batch(&candidates).await;
    state.metrics.record_insights(&details, attempted);

    let mut messages: Vec<String> = details.iter().map(|d| d.message.clone()).collect();
    if messages.is_empty() {
        messages.push(ALL_CLEAR_MESSAGE.to_string());
    }

    InsightsResponse {
        count: details.len(),
        range,
        threshold,
        messages,
        details,
    }
}

async fn insights(
    State(state): State<AppStateArc>,
    Query(query): Query<InsightQuery>,
) -> Result<Json<InsightsResponse>, ApiError> {
    let range = parse_window(query.range.as_deref())?;
    let thresholds = state.generator.thresholds().clone();
    let threshold = parse_threshold(query.threshold.as_deref(), thresholds.insight_min_score)?;

    let response = build_insights(&state, range, threshold, |a| {
        qualifies_for_insight(a, threshold, &thresholds)
    })
    .await;
    Ok(Json(response))
}

async fn high_risk_insights(
    State(state): State<AppStateArc>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<InsightsResponse>, ApiError> {
    let range = parse_window(query.range.as_deref())?;
    let threshold = state.generator.thresholds().urgent;

    let response = build_insights(&state, range, threshold, |a| a.risk_score >= threshold).await;
    Ok(Json(response))
}

// ============================================================================
// Notification Routes
// ============================================================================

/// Key insights carried in a digest
const DIGEST_INSIGHTS: usize = 5;

pub fn notification_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/api/notifications/alert", post(send_alert))
        .route("/api/notifications/summary", post(send_summary))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRequest {
    pub process_id: String,
    #[serde(default)]
    pub recipients: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRequest {
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub recipients: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub success: bool,
    pub message: String,
    pub subject: String,
    pub results: Vec<DeliveryResult>,
}

fn recipients_for(state: &AppState, requested: Option<&[String]>) -> Result<Vec<String>, ApiError> {
    let recipients = state.notifier.resolve_recipients(requested);
    if recipients.is_empty() {
        return Err(ApiError::BadRequest(
            "no recipients given and none configured".to_string(),
        ));
    }
    Ok(recipients)
}

async fn send_alert(
    State(state): State<AppStateArc>,
    payload: Result<Json<AlertRequest>, JsonRejection>,
) -> Result<Json<NotificationResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let recipients = recipients_for(&state, request.recipients.as_deref())?;

    let observation = state
        .store
        .get(&request.process_id)
        .await
        .ok_or_else(|| ApiError::NotFound(request.process_id.clone()))?;
    let analysis = analyze(&observation, state.generator.thresholds())?;

    let attempted = usize::from(state.generator.enrichment_eligible(analysis.risk_score));
    let insight = state.generator.generate(&analysis).await;
    state.metrics.record_insights(std::slice::from_ref(&insight), attempted);

    let alert = render_alert(&analysis, Some(&insight.message), state.notifier.dashboard_url());
    let report = state.notifier.dispatch(&alert, &recipients).await;
    state.metrics.record_dispatch(&report);

    Ok(Json(NotificationResponse {
        success: report.all_delivered(),
        message: format!("Sent {} of {} alerts", report.sent, report.total),
        subject: alert.subject,
        results: report.results,
    }))
}

async fn send_summary(
    State(state): State<AppStateArc>,
    payload: Result<Json<SummaryRequest>, JsonRejection>,
) -> Result<Json<NotificationResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let recipients = recipients_for(&state, request.recipients.as_deref())?;

    let filter = window_filter(request.range.as_deref())?;
    let (analyses, _) = load_analyses(&state, &filter).await;
    let mut counts = StatusCounts::default();
    for analysis in &analyses {
        counts.record(analysis.status);
    }

    let thresholds = state.generator.thresholds();
    let mut flagged: Vec<RiskAnalysis> = analyses
        .iter()
        .filter(|a| qualifies_for_insight(a, thresholds.insight_min_score, thresholds))
        .cloned()
        .collect();
    sort_by_risk(&mut flagged);
    let insights: Vec<String> = flagged
        .into_iter()
        .take(DIGEST_INSIGHTS)
        .filter_map(|a| a.message)
        .collect();

    let digest = render_digest(
        &summarize(&analyses),
        &counts,
        &insights,
        Utc::now().date_naive(),
        state.notifier.dashboard_url(),
    );
    let report = state.notifier.dispatch(&digest, &recipients).await;
    state.metrics.record_dispatch(&report);

    Ok(Json(NotificationResponse {
        success: report.all_delivered(),
        message: format!("Sent {} of {} summaries", report.sent, report.total),
        subject: digest.subject,
        results: report.results,
    }))
}

// ============================================================================
// Metrics Routes
// ============================================================================

pub fn metrics_routes() -> Router<AppStateArc> {
    Router::new().route("/metrics", get(metrics))
}

async fn metrics(State(state): State<AppStateArc>) -> Result<impl IntoResponse, ApiError> {
    let body = state
        .metrics
        .export()
        .map_err(|e| ApiError::Internal(format!("Failed to encode metrics: {}", e)))?;
    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body))
}
