//! Alert delivery for critical bottlenecks and shift digests.
//!
//! Messages are always rendered. Delivery needs a configured channel; without
//! one every recipient is reported as not delivered and nothing leaves the
//! process. Production code plugs in `WebhookNotifier`; tests use
//! `FakeNotifier`.

use crate::analysis::RiskAnalysis;
use crate::config::{DockwatchConfig, NotificationConfig};
use crate::stats::StatusCounts;
use crate::summary::AggregateSummary;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{info, warn};

const PENDING_RECOMMENDATION: &str = "Investigating root cause...";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertMessage {
    pub subject: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NotifyError {
    #[error("notification channel is not configured")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("HTTP status {0} from notification channel")]
    HttpStatus(u16),

    #[error("delivery timeout after {0} seconds")]
    Timeout(u64),
}

/// Capability: hand a rendered message to one recipient
#[async_trait]
pub trait AlertNotifier: Send + Sync {
    async fn deliver(&self, recipient: &str, message: &AlertMessage) -> Result<(), NotifyError>;

    fn label(&self) -> &str;
}

fn dashboard_link(dashboard_url: &str) -> String {
    format!("{}/dashboard", dashboard_url.trim_end_matches('/'))
}

/// Critical bottleneck alert for one process
pub fn render_alert(
    analysis: &RiskAnalysis,
    recommendation: Option<&str>,
    dashboard_url: &str,
) -> AlertMessage {
    let subject = format!("🚨 Critical Bottleneck Alert: {}", analysis.process_name);
    let text = format!(
        "CRITICAL BOTTLENECK ALERT\n\n\
         Process: {}\n\
         Status: {}\n\
         Risk Level: {}\n\
         Delay: {} minutes\n\
         Risk Score: {}\n\n\
         Recommendation: {}\n\n\
         Please review this bottleneck immediately in the dashboard.\n\
         Dashboard: {}\n",
        analysis.process_name,
        analysis.status,
        analysis.risk_level,
        analysis.delay_minutes().max(0),
        analysis.risk_score,
        recommendation.unwrap_or(PENDING_RECOMMENDATION),
        dashboard_link(dashboard_url),
    );
    AlertMessage { subject, text }
}

/// Digest of one window: status counts, summary figures, key insights
pub fn render_digest(
    summary: &AggregateSummary,
    counts: &StatusCounts,
    insights: &[String],
    date: NaiveDate,
    dashboard_url: &str,
) -> AlertMessage {
    let subject = format!("📊 Daily Process Summary - {}", date);

    let mut text = format!(
        "DAILY PROCESS SUMMARY - {}\n\n\
         Critical: {}\n\
         Delayed: {}\n\
         Completed: {}\n\n\
         Average Risk Score: {}/100\n\
         Potential Bottlenecks: {}\n\
         Most Problematic: {}\n\n\
         Key Insights:\n",
        date,
        counts.critical,
        counts.delayed,
        counts.completed,
        summary.average_risk_score,
        summary.bottleneck_count,
        summary.most_problematic,
    );
    if insights.is_empty() {
        text.push_str("None\n");
    }
    for (i, insight) in insights.iter().enumerate() {
        text.push_str(&format!("{}. {}\n", i + 1, insight));
    }
    text.push_str(&format!("\nDashboard: {}\n", dashboard_link(dashboard_url)));

    AlertMessage { subject, text }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryResult {
    pub recipient: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DispatchReport {
    pub sent: usize,
    pub total: usize,
    pub results: Vec<DeliveryResult>,
}

impl DispatchReport {
    pub fn all_delivered(&self) -> bool {
        self.total > 0 && self.sent == self.total
    }
}

pub struct Notifier {
    channel: Option<Arc<dyn AlertNotifier>>,
    recipients: Vec<String>,
    timeout: Duration,
    dashboard_url: String,
}

impl Notifier {
    /// No channel: every delivery reports `NotConfigured`
    pub fn disabled(config: &NotificationConfig) -> Self {
        Self {
            channel: None,
            recipients: config.recipients.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            dashboard_url: config.dashboard_url.clone(),
        }
    }

    /// Webhook channel when configured, disabled otherwise
    pub fn from_config(config: &DockwatchConfig) -> Self {
        let notifier = Self::disabled(&config.notifications);
        if !config.notifications.is_configured() {
            info!("Notifications disabled, alerts will not be delivered");
            return notifier;
        }

        match WebhookNotifier::new(&config.notifications) {
            Ok(webhook) => {
                info!("Notifications enabled ({})", webhook.label());
                notifier.with_channel(Arc::new(webhook))
            }
            Err(e) => {
                warn!("Notification channel unavailable: {}", e);
                notifier
            }
        }
    }

    pub fn with_channel(mut self, channel: Arc<dyn AlertNotifier>) -> Self {
        self.channel = Some(channel);
        self
    }

    pub fn with_recipients(mut self, recipients: Vec<String>) -> Self {
        self.recipients = recipients;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.channel.is_some()
    }

    pub fn dashboard_url(&self) -> &str {
        &self.dashboard_url
    }

    /// Requested recipients if any are non-blank, else the configured ones
    pub fn resolve_recipients(&self, requested: Option<&[String]>) -> Vec<String> {
        let clean = |list: &[String]| -> Vec<String> {
            list.iter()
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .collect()
        };
        match requested.map(clean) {
            Some(list) if !list.is_empty() => list,
            _ => clean(&self.recipients),
        }
    }

    /// One delivery per recipient, each under its own timeout, results in
    /// recipient order. Failures are reported, never raised.
    pub async fn dispatch(&self, message: &AlertMessage, recipients: &[String]) -> DispatchReport {
        let results = futures::future::join_all(
            recipients
                .iter()
                .map(|recipient| self.deliver_one(recipient, message)),
        )
        .await;

        let sent = results.iter().filter(|r| r.success).count();
        info!(
            "Dispatched '{}': {} of {} delivered",
            message.subject,
            sent,
            results.len()
        );
        DispatchReport {
            sent,
            total: results.len(),
            results,
        }
    }

    async fn deliver_one(&self, recipient: &str, message: &AlertMessage) -> DeliveryResult {
        let outcome = match self.channel.as_ref() {
            None => Err(NotifyError::NotConfigured),
            Some(channel) => tokio::time::timeout(self.timeout, channel.deliver(recipient, message))
                .await
                .unwrap_or(Err(NotifyError::Timeout(self.timeout.as_secs()))),
        };

        match outcome {
            Ok(()) => DeliveryResult {
                recipient: recipient.to_string(),
                success: true,
                error: None,
            },
            Err(e) => {
                warn!("Alert not delivered to {}: {}", recipient, e);
                DeliveryResult {
                    recipient: recipient.to_string(),
                    success: false,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    source: &'a str,
    recipient: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Posts each message as JSON to a single webhook endpoint
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
    timeout_secs: u64,
}

impl WebhookNotifier {
    pub fn new(config: &NotificationConfig) -> Result<Self, NotifyError> {
        let url = config.webhook().ok_or(NotifyError::NotConfigured)?.to_string();
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| NotifyError::HttpError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url,
            timeout_secs: config.timeout_secs,
        })
    }
}

#[async_trait]
impl AlertNotifier for WebhookNotifier {
    async fn deliver(&self, recipient: &str, message: &AlertMessage) -> Result<(), NotifyError> {
        let payload = WebhookPayload {
            source: "dockwatch",
            recipient,
            subject: &message.subject,
            text: &message.text,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NotifyError::Timeout(self.timeout_secs)
                } else {
                    NotifyError::HttpError(format!("Request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::HttpStatus(status.as_u16()));
        }
        Ok(())
    }

    fn label(&self) -> &str {
        "webhook"
    }
}

/// Records deliveries; recipients listed in `failing` get an error
#[derive(Default)]
pub struct FakeNotifier {
    delivered: Mutex<Vec<(String, AlertMessage)>>,
    failing: Vec<String>,
}

impl FakeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(recipients: &[&str]) -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
            failing: recipients.iter().map(|r| r.to_string()).collect(),
        }
    }

    pub fn delivered(&self) -> Vec<(String, AlertMessage)> {
        match self.delivered.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl AlertNotifier for FakeNotifier {
    async fn deliver(&self, recipient: &str, message: &AlertMessage) -> Result<(), NotifyError> {
        if self.failing.iter().any(|r| r == recipient) {
            return Err(NotifyError::HttpStatus(502));
        }
        let mut delivered = match self.delivered.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        delivered.push((recipient.to_string(), message.clone()));
        Ok(())
    }

    fn label(&self) -> &str {
        "fake"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use crate::config::Thresholds;
    use crate::observation::{ProcessObservation, ProcessStatus};
    use crate::summary::summarize;

    fn dispatch_analysis() -> RiskAnalysis {
        analyze(
            &ProcessObservation::new("Dispatch", 1260.0, 720.0, ProcessStatus::Critical),
            &Thresholds::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_render_alert() {
        let alert = render_alert(&dispatch_analysis(), None, "http://localhost:3000/");
        assert_eq!(alert.subject, "🚨 Critical Bottleneck Alert: Dispatch");
        assert!(alert.text.contains("Status: critical\n"));
        assert!(alert.text.contains("Risk Level: Critical\n"));
        assert!(alert.text.contains("Delay: 9 minutes\n"));
        assert!(alert.text.contains("Risk Score: 93\n"));
        assert!(alert.text.contains("Recommendation: Investigating root cause..."));
        assert!(alert.text.contains("Dashboard: http://localhost:3000/dashboard"));
    }

    #[test]
    fn test_render_digest() {
        let observations = vec![
            ProcessObservation::new("Receiving", 840.0, 900.0, ProcessStatus::Completed),
            ProcessObservation::new("Dispatch", 1260.0, 720.0, ProcessStatus::Critical),
        ];
        let analyses: Vec<_> = observations
            .iter()
            .map(|o| analyze(o, &Thresholds::default()).unwrap())
            .collect();
        let counts = StatusCounts::from_observations(&observations);
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();

        let digest = render_digest(
            &summarize(&analyses),
            &counts,
            &["Dispatch is late".to_string()],
            date,
            "http://localhost:3000",
        );
        assert_eq!(digest.subject, "📊 Daily Process Summary - 2026-10-19");
        assert!(digest.text.contains("Critical: 1\nDelayed: 0\nCompleted: 1\n"));
        assert!(digest.text.contains("Most Problematic: Dispatch"));
        assert!(digest.text.contains("1. Dispatch is late\n"));

        let quiet = render_digest(&summarize(&[]), &StatusCounts::default(), &[], date, "");
        assert!(quiet.text.contains("Key Insights:\nNone\n"));
    }

    #[test]
    fn test_resolve_recipients() {
        let notifier = Notifier::disabled(&NotificationConfig::default())
            .with_recipients(vec!["ops@example.com".to_string()]);

        assert_eq!(notifier.resolve_recipients(None), vec!["ops@example.com"]);
        let blank = vec!["  ".to_string()];
        assert_eq!(notifier.resolve_recipients(Some(&blank)), vec!["ops@example.com"]);
        let explicit = vec![" lead@example.com ".to_string()];
        assert_eq!(notifier.resolve_recipients(Some(&explicit)), vec!["lead@example.com"]);
    }

    #[tokio::test]
    async fn test_unconfigured_reports_every_recipient() {
        let notifier = Notifier::disabled(&NotificationConfig::default());
        let alert = render_alert(&dispatch_analysis(), None, "");
        let report = notifier
            .dispatch(&alert, &["a@example.com".to_string(), "b@example.com".to_string()])
            .await;

        assert_eq!(report.total, 2);
        assert_eq!(report.sent, 0);
        assert!(!report.all_delivered());
        assert_eq!(
            report.results[0].error.as_deref(),
            Some("notification channel is not configured")
        );
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_order() {
        let fake = Arc::new(FakeNotifier::failing_for(&["b@example.com"]));
        let notifier = Notifier::disabled(&NotificationConfig::default()).with_channel(fake.clone());
        let alert = render_alert(&dispatch_analysis(), Some("Add loading staff"), "");

        let recipients: Vec<String> = ["a@example.com", "b@example.com", "c@example.com"]
            .iter()
            .map(|r| r.to_string())
            .collect();
        let report = notifier.dispatch(&alert, &recipients).await;

        assert_eq!(report.sent, 2);
        assert!(report.results[0].success);
        assert!(!report.results[1].success);
        assert_eq!(report.results[2].recipient, "c@example.com");

        let delivered = fake.delivered();
        assert_eq!(delivered.len(), 2);
        assert!(delivered[0].1.text.contains("Recommendation: Add loading staff"));
    }
}
