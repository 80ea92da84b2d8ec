//! HTTP client for a running dockwatchd.

use anyhow::{anyhow, Context, Result};
use dockwatch_common::analysis::RiskAnalysis;
use dockwatch_common::summary::AggregateSummary;
use serde::Deserialize;
use std::time::Duration;

/// Subset of the /api/analyze response the CLI needs
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteAnalysis {
    pub range: Option<String>,
    pub analyses: Vec<RiskAnalysis>,
    pub summary: AggregateSummary,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct DaemonClient {
    base_url: String,
    http: reqwest::Client,
}

impl DaemonClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn analyze_url(&self, range: Option<&str>) -> String {
        match range {
            Some(range) => format!("{}/api/analyze?range={}", self.base_url, range),
            None => format!("{}/api/analyze", self.base_url),
        }
    }

    pub async fn analyze(&self, range: Option<&str>) -> Result<RemoteAnalysis> {
        let url = self.analyze_url(range);
        let response = self.http.get(&url).send().await.map_err(|e| {
            anyhow!(
                "Cannot reach dockwatchd at {}: {}\n\n\
                 Is the daemon running? Start it with: dockwatchd",
                self.base_url,
                e
            )
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .map(|body| body.message)
                .unwrap_or_else(|_| status.to_string());
            return Err(anyhow!("dockwatchd returned {}: {}", status, message));
        }

        response
            .json::<RemoteAnalysis>()
            .await
            .context("Failed to parse analysis response")
    }
}
