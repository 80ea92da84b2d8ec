//! Dockwatch Configuration
//!
//! Configuration lives in /etc/dockwatch/config.toml unless DOCKWATCH_CONFIG
//! or an explicit path says otherwise. Every field has a default, so an empty
//! file (or no file) is a valid configuration.
//!
//! v0.2.0: Thresholds became one shared set instead of per-endpoint constants
//! v0.3.0: Added enrichment and cost sections

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// System configuration directory
pub const SYSTEM_CONFIG_DIR: &str = "/etc/dockwatch";
const CONFIG_FILE: &str = "config.toml";

/// Placeholder shipped in sample .env files; never a real key
const PLACEHOLDER_API_KEY: &str = "your_openrouter_api_key_here";

/// HTTP daemon settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Whole-request timeout (seconds); must exceed the enrichment timeout
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Allowed CORS origin; "*" or absent allows any
    #[serde(default)]
    pub cors_origin: Option<String>,
}

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            request_timeout_secs: default_request_timeout(),
            cors_origin: None,
        }
    }
}

/// Which predicate fills `RiskAnalysis::is_potential_bottleneck`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BottleneckRule {
    /// score >= bottleneck_score
    #[default]
    ScoreOnly,
    /// score >= bottleneck_score OR delay% >= bottleneck_delay_percentage
    ScoreOrDelay,
}

/// The single threshold set shared by classifier, predicates and insights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    #[serde(default = "default_medium")]
    pub medium: u8,

    #[serde(default = "default_high")]
    pub high: u8,

    /// Insight tier boundary between warning and urgent
    #[serde(default = "default_urgent")]
    pub urgent: u8,

    #[serde(default = "default_critical")]
    pub critical: u8,

    #[serde(default = "default_bottleneck_score")]
    pub bottleneck_score: u8,

    #[serde(default = "default_bottleneck_delay")]
    pub bottleneck_delay_percentage: f64,

    #[serde(default)]
    pub bottleneck_rule: BottleneckRule,

    /// Minimum score before the enrichment service is consulted
    #[serde(default = "default_enrichment_min_score")]
    pub enrichment_min_score: u8,

    /// Default score cut-off for the insights listing
    #[serde(default = "default_insight_min_score")]
    pub insight_min_score: u8,
}

fn default_medium() -> u8 {
    40
}

fn default_high() -> u8 {
    60
}

fn default_urgent() -> u8 {
    70
}

fn default_critical() -> u8 {
    80
}

fn default_bottleneck_score() -> u8 {
    60
}

fn default_bottleneck_delay() -> f64 {
    20.0
}

fn default_enrichment_min_score() -> u8 {
    60
}

fn default_insight_min_score() -> u8 {
    20
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            medium: default_medium(),
            high: default_high(),
            urgent: default_urgent(),
            critical: default_critical(),
            bottleneck_score: default_bottleneck_score(),
            bottleneck_delay_percentage: default_bottleneck_delay(),
            bottleneck_rule: BottleneckRule::default(),
            enrichment_min_score: default_enrichment_min_score(),
            insight_min_score: default_insight_min_score(),
        }
    }
}

impl Thresholds {
    /// Bands must be strictly increasing inside (0, 100] so the four
    /// severity levels partition the score range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0 < self.medium && self.medium < self.high && self.high < self.critical) {
            return Err(ConfigError::Thresholds(format!(
                "expected 0 < medium < high < critical, got {} / {} / {}",
                self.medium, self.high, self.critical
            )));
        }
        if self.critical > 100 {
            return Err(ConfigError::Thresholds(format!(
                "critical must be <= 100, got {}",
                self.critical
            )));
        }
        if self.urgent < self.high || self.urgent > self.critical {
            return Err(ConfigError::Thresholds(format!(
                "urgent must lie between high ({}) and critical ({}), got {}",
                self.high, self.critical, self.urgent
            )));
        }
        for (name, value) in [
            ("bottleneck_score", self.bottleneck_score),
            ("enrichment_min_score", self.enrichment_min_score),
            ("insight_min_score", self.insight_min_score),
        ] {
            if value > 100 {
                return Err(ConfigError::Thresholds(format!(
                    "{} must be <= 100, got {}",
                    name, value
                )));
            }
        }
        if !self.bottleneck_delay_percentage.is_finite() {
            return Err(ConfigError::Thresholds(
                "bottleneck_delay_percentage must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Enrichment (LLM phrasing) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    #[serde(default = "default_enrichment_enabled")]
    pub enabled: bool,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Inline key; prefer `api_key_env`
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_enrichment_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,
}

fn default_enrichment_enabled() -> bool {
    true
}

fn default_endpoint() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_model() -> String {
    "anthropic/claude-3.5-sonnet".to_string()
}

fn default_api_key_env() -> String {
    "OPENROUTER_API_KEY".to_string()
}

fn default_enrichment_timeout() -> u64 {
    10
}

fn default_max_tokens() -> u32 {
    150
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_p() -> f32 {
    0.9
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: default_enrichment_enabled(),
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: None,
            api_key_env: default_api_key_env(),
            timeout_secs: default_enrichment_timeout(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
        }
    }
}

impl EnrichmentConfig {
    /// Inline key first, then the configured environment variable.
    /// Empty values and the sample placeholder count as missing.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty() && key != PLACEHOLDER_API_KEY)
    }

    pub fn is_configured(&self) -> bool {
        self.enabled && self.resolve_api_key().is_some()
    }
}

/// Cost model for delay impact estimates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostConfig {
    #[serde(default = "default_hourly_cost")]
    pub hourly_operation_cost: f64,

    #[serde(default = "default_orders_per_day")]
    pub orders_per_day: u32,
}

fn default_hourly_cost() -> f64 {
    500.0
}

fn default_orders_per_day() -> u32 {
    1000
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            hourly_operation_cost: default_hourly_cost(),
            orders_per_day: default_orders_per_day(),
        }
    }
}

/// Alert delivery settings. Delivery is off until a webhook is configured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Endpoint that receives one JSON POST per recipient
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Used when a request names no recipients
    #[serde(default)]
    pub recipients: Vec<String>,

    #[serde(default = "default_notification_timeout")]
    pub timeout_secs: u64,

    /// Linked from every alert
    #[serde(default = "default_dashboard_url")]
    pub dashboard_url: String,
}

fn default_notification_timeout() -> u64 {
    10
}

fn default_dashboard_url() -> String {
    "http://localhost:3000".to_string()
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            webhook_url: None,
            recipients: Vec::new(),
            timeout_secs: default_notification_timeout(),
            dashboard_url: default_dashboard_url(),
        }
    }
}

impl NotificationConfig {
    pub fn webhook(&self) -> Option<&str> {
        self.webhook_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn is_configured(&self) -> bool {
        self.enabled && self.webhook().is_some()
    }
}

/// Data source settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataConfig {
    /// JSON array of observations loaded at daemon startup
    #[serde(default)]
    pub seed_file: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DockwatchConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub thresholds: Thresholds,

    #[serde(default)]
    pub enrichment: EnrichmentConfig,

    #[serde(default)]
    pub cost: CostConfig,

    #[serde(default)]
    pub notifications: NotificationConfig,

    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub log: LogConfig,
}

impl DockwatchConfig {
    /// Load and validate a config file. Missing or malformed files are errors.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let mut config: DockwatchConfig =
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        config.thresholds.validate()?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Explicit path, else DOCKWATCH_CONFIG, else the system file if present,
    /// else built-in defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        if let Ok(path) = std::env::var("DOCKWATCH_CONFIG") {
            return Self::load(Path::new(&path));
        }
        let system_path = config_path();
        if system_path.exists() {
            return Self::load(&system_path);
        }
        let mut config = Self::default();
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(bind) = std::env::var("DOCKWATCH_BIND") {
            if !bind.trim().is_empty() {
                self.server.bind = bind;
            }
        }
    }
}

/// Get the config file path
pub fn config_path() -> PathBuf {
    PathBuf::from(SYSTEM_CONFIG_DIR).join(CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = DockwatchConfig::default();
        assert_eq!(config.thresholds.medium, 40);
        assert_eq!(config.thresholds.high, 60);
        assert_eq!(config.thresholds.critical, 80);
        assert_eq!(config.thresholds.bottleneck_rule, BottleneckRule::ScoreOnly);
        assert_eq!(config.enrichment.timeout_secs, 10);
        assert_eq!(config.enrichment.max_tokens, 150);
        assert!(config.thresholds.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[thresholds]\nmedium = 30\nbottleneck_rule = \"score_or_delay\"\n\n[log]\nlevel = \"debug\""
        )
        .unwrap();

        let config = DockwatchConfig::load(file.path()).unwrap();
        assert_eq!(config.thresholds.medium, 30);
        assert_eq!(config.thresholds.high, 60);
        assert_eq!(config.thresholds.bottleneck_rule, BottleneckRule::ScoreOrDelay);
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.enrichment.model, "anthropic/claude-3.5-sonnet");
    }

    #[test]
    fn test_malformed_file_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[thresholds\nmedium = ").unwrap();
        assert!(matches!(
            DockwatchConfig::load(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = DockwatchConfig::load(&dir.path().join("nope.toml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_notifications_need_enabled_webhook() {
        let mut config = NotificationConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.dashboard_url, "http://localhost:3000");

        config.webhook_url = Some("  ".to_string());
        config.enabled = true;
        assert!(!config.is_configured());

        config.webhook_url = Some("https://hooks.example.com/dockwatch".to_string());
        assert!(config.is_configured());
    }

    #[test]
    fn test_overlapping_thresholds_rejected() {
        let thresholds = Thresholds {
            medium: 60,
            high: 60,
            ..Thresholds::default()
        };
        assert!(thresholds.validate().is_err());

        let thresholds = Thresholds {
            urgent: 90,
            ..Thresholds::default()
        };
        assert!(thresholds.validate().is_err());

        let thresholds = Thresholds {
            critical: 101,
            ..Thresholds::default()
        };
        assert!(thresholds.validate().is_err());
    }

    #[test]
    fn test_placeholder_key_is_not_configured() {
        let config = EnrichmentConfig {
            api_key: Some(PLACEHOLDER_API_KEY.to_string()),
            ..EnrichmentConfig::default()
        };
        assert!(config.resolve_api_key().is_none());
        assert!(!config.is_configured());

        let config = EnrichmentConfig {
            api_key: Some("sk-test".to_string()),
            ..EnrichmentConfig::default()
        };
        assert_eq!(config.resolve_api_key().as_deref(), Some("sk-test"));
        assert!(config.is_configured());
    }

    #[test]
    fn test_disabled_enrichment_is_not_configured() {
        let config = EnrichmentConfig {
            enabled: false,
            api_key: Some("sk-test".to_string()),
            ..EnrichmentConfig::default()
        };
        assert!(!config.is_configured());
    }
}
