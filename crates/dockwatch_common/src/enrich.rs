//! Insight generation with optional LLM enrichment.
//!
//! Every message starts life as the rule-based fallback. When an enricher is
//! configured and the score is high enough, one enrichment attempt is made
//! under a timeout; any failure returns the fallback unchanged. No retries.
//!
//! Production code plugs in `OpenRouterClient`; tests use `FakeEnricher`.

use crate::analysis::RiskAnalysis;
use crate::config::{DockwatchConfig, Thresholds};
use crate::insight::{build_prompt, fallback_message, GenerationParams, InsightPrompt, InsightTier};
use crate::openrouter::OpenRouterClient;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Enrichment errors. None of these ever reach a batch caller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LlmError {
    #[error("enrichment service is not configured")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("HTTP status {0} from enrichment service")]
    HttpStatus(u16),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("request timeout after {0} seconds")]
    Timeout(u64),

    #[error("enrichment service returned an empty completion")]
    EmptyResponse,
}

/// Capability: turn a structured prompt into alert text
#[async_trait]
pub trait InsightEnricher: Send + Sync {
    async fn enrich(&self, prompt: &InsightPrompt) -> Result<String, LlmError>;

    /// Label for logs (model or backend name)
    fn label(&self) -> &str;
}

/// Where a message came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageSource {
    Fallback,
    Enriched,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedInsight {
    pub process_name: String,
    pub process_id: String,
    pub risk_score: u8,
    pub delay_percentage: f64,
    pub tier: InsightTier,
    pub message: String,
    pub source: MessageSource,
}

impl GeneratedInsight {
    pub fn is_enriched(&self) -> bool {
        self.source == MessageSource::Enriched
    }
}

pub struct InsightGenerator {
    enricher: Option<Arc<dyn InsightEnricher>>,
    thresholds: Thresholds,
    params: GenerationParams,
    timeout: Duration,
}

impl InsightGenerator {
    /// Deterministic generator, never calls out
    pub fn rule_based(thresholds: Thresholds) -> Self {
        Self {
            enricher: None,
            thresholds,
            params: GenerationParams::default(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Enricher from config when a key is available, rule-based otherwise
    pub fn from_config(config: &DockwatchConfig) -> Self {
        let generator = Self::rule_based(config.thresholds.clone())
            .with_params(GenerationParams::from(&config.enrichment))
            .with_timeout(Duration::from_secs(config.enrichment.timeout_secs));

        if !config.enrichment.is_configured() {
            info!("Enrichment disabled, using rule-based insights");
            return generator;
        }

        match OpenRouterClient::new(&config.enrichment) {
            Ok(client) => {
                info!("Enrichment enabled ({})", client.label());
                generator.with_enricher(Arc::new(client))
            }
            Err(e) => {
                warn!("Enrichment client unavailable, using rule-based insights: {}", e);
                generator
            }
        }
    }

    pub fn with_enricher(mut self, enricher: Arc<dyn InsightEnricher>) -> Self {
        self.enricher = Some(enricher);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn has_enricher(&self) -> bool {
        self.enricher.is_some()
    }

    /// Whether an analysis with this score would be sent for enrichment
    pub fn enrichment_eligible(&self, risk_score: u8) -> bool {
        self.has_enricher() && risk_score >= self.thresholds.enrichment_min_score
    }

    /// Generate with the tier implied by status and score
    pub async fn generate(&self, analysis: &RiskAnalysis) -> GeneratedInsight {
        let tier = InsightTier::for_analysis(analysis, &self.thresholds);
        self.generate_with_tier(analysis, tier).await
    }

    /// Generate for an explicit tier (a `RiskLevel` converts too)
    pub async fn generate_with_tier(
        &self,
        analysis: &RiskAnalysis,
        tier: impl Into<InsightTier>,
    ) -> GeneratedInsight {
        let tier = tier.into();
        let fallback = fallback_message(analysis, tier);

        let (message, source) = match self.enricher.as_ref() {
            Some(enricher) if self.enrichment_eligible(analysis.risk_score) => {
                match self.try_enrich(enricher.as_ref(), analysis, tier).await {
                    Ok(text) => (text, MessageSource::Enriched),
                    Err(e) => {
                        warn!(
                            "Enrichment failed for {}, using fallback: {}",
                            analysis.process_name, e
                        );
                        (fallback, MessageSource::Fallback)
                    }
                }
            }
            _ => (fallback, MessageSource::Fallback),
        };

        GeneratedInsight {
            process_name: analysis.process_name.clone(),
            process_id: analysis.process_id.clone(),
            risk_score: analysis.risk_score,
            delay_percentage: analysis.delay_percentage,
            tier,
            message,
            source,
        }
    }

    async fn try_enrich(
        &self,
        enricher: &dyn InsightEnricher,
        analysis: &RiskAnalysis,
        tier: InsightTier,
    ) -> Result<String, LlmError> {
        let prompt = build_prompt(analysis, tier, self.params);

        let text = tokio::time::timeout(self.timeout, enricher.enrich(&prompt))
            .await
            .map_err(|_| LlmError::Timeout(self.timeout.as_secs()))??;

        let text = text.trim();
        if text.is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        debug!("Enriched insight for {} via {}", analysis.process_name, enricher.label());
        Ok(text.to_string())
    }

    /// Fan out one generation per analysis, each under its own timeout.
    /// Output order mirrors input order.
    pub async fn generate_batch(&self, analyses: &[RiskAnalysis]) -> Vec<GeneratedInsight> {
        let insights =
            futures::future::join_all(analyses.iter().map(|analysis| self.generate(analysis))).await;

        let enriched = insights.iter().filter(|i| i.is_enriched()).count();
        info!(
            "Generated {} insights ({} enriched, {} rule-based)",
            insights.len(),
            enriched,
            insights.len() - enriched
        );
        insights
    }

    /// Fill `message` on each analysis in place
    pub async fn annotate(&self, analyses: &mut [RiskAnalysis]) -> Vec<MessageSource> {
        let insights = self.generate_batch(analyses).await;
        analyses
            .iter_mut()
            .zip(insights)
            .map(|(analysis, insight)| {
                analysis.message = Some(insight.message);
                insight.source
            })
            .collect()
    }
}

/// Scripted enricher for tests
pub struct FakeEnricher {
    responses: Mutex<Vec<Result<String, LlmError>>>,
    call_count: AtomicUsize,
    delay: Duration,
}

impl FakeEnricher {
    /// Responses are consumed in order; the last one repeats
    pub fn new(responses: Vec<Result<String, LlmError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            call_count: AtomicUsize::new(0),
            delay: Duration::ZERO,
        }
    }

    pub fn always_ok(text: impl Into<String>) -> Self {
        Self::new(vec![Ok(text.into())])
    }

    pub fn always_error(error: LlmError) -> Self {
        Self::new(vec![Err(error)])
    }

    /// Sleep before answering (timeout tests)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    fn next_response(&self) -> Result<String, LlmError> {
        let mut responses = match self.responses.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match responses.len() {
            0 => Err(LlmError::EmptyResponse),
            1 => responses[0].clone(),
            _ => responses.remove(0),
        }
    }
}

#[async_trait]
impl InsightEnricher for FakeEnricher {
    async fn enrich(&self, _prompt: &InsightPrompt) -> Result<String, LlmError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.next_response()
    }

    fn label(&self) -> &str {
        "fake"
    }
}
