//! OpenRouter (OpenAI-compatible chat completions) enrichment backend.

use crate::config::EnrichmentConfig;
use crate::enrich::{InsightEnricher, LlmError};
use crate::insight::InsightPrompt;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const APP_TITLE: &str = "Dockwatch";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

pub struct OpenRouterClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
    timeout_secs: u64,
}

impl OpenRouterClient {
    pub fn new(config: &EnrichmentConfig) -> Result<Self, LlmError> {
        if !config.enabled {
            return Err(LlmError::NotConfigured);
        }
        let api_key = config.resolve_api_key().ok_or(LlmError::NotConfigured)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::HttpError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            timeout_secs: config.timeout_secs,
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint)
    }
}

/// Pull the first completion out of a response body
fn extract_completion(body: &str) -> Result<String, LlmError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or(LlmError::EmptyResponse)?;

    let content = content.trim();
    if content.is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(content.to_string())
}

#[async_trait]
impl InsightEnricher for OpenRouterClient {
    async fn enrich(&self, prompt: &InsightPrompt) -> Result<String, LlmError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt.text,
            }],
            max_tokens: prompt.params.max_tokens,
            temperature: prompt.params.temperature,
            top_p: prompt.params.top_p,
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .header("X-Title", APP_TITLE)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(self.timeout_secs)
                } else {
                    LlmError::HttpError(format!("Request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LlmError::HttpStatus(status.as_u16()));
        }

        let text = response
            .text()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to read body: {}", e)))?;

        let completion = extract_completion(&text)?;
        tracing::info!("Enriched insight generated for {} using {}", prompt.process_name, self.model);
        Ok(completion)
    }

    fn label(&self) -> &str {
        &self.model
    }
}
