//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::utils::http::endpoint;

/// Longest lifetime accepted for a cached API key.
pub const MAX_KEY_TTL_DAYS: i64 = 3_650;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Search API and rate-limit settings
    #[serde(default)]
    pub collector: CollectorConfig,

    /// Chat-completion API and retry settings
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Locations of state files and reports
    #[serde(default)]
    pub paths: PathsConfig,

    /// Report rendering
    #[serde(default)]
    pub report: ReportConfig,

    /// Seen-set bookkeeping
    #[serde(default)]
    pub state: StateConfig,

    /// Logging verbosity
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if endpoint(&self.collector.api_base, "search/repositories").is_err() {
            return Err(AppError::validation(format!(
                "collector.api_base '{}' is not a valid URL",
                self.collector.api_base
            )));
        }
        if endpoint(&self.analyzer.api_base, "chat/completions").is_err() {
            return Err(AppError::validation(format!(
                "analyzer.api_base '{}' is not a valid URL",
                self.analyzer.api_base
            )));
        }
        if self.collector.user_agent.trim().is_empty() {
            return Err(AppError::validation("collector.user_agent is empty"));
        }
        if self.collector.topics.is_empty() {
            return Err(AppError::validation("No topics defined"));
        }
        if self.collector.per_page == 0 || self.collector.per_page > 100 {
            return Err(AppError::validation(
                "collector.per_page must be between 1 and 100",
            ));
        }
        if self.collector.timeout_secs == 0 {
            return Err(AppError::validation("collector.timeout_secs must be > 0"));
        }
        if self.collector.topic_delay_ms.min > self.collector.topic_delay_ms.max {
            return Err(AppError::validation(
                "collector.topic_delay_ms: min is greater than max",
            ));
        }
        if self.collector.item_delay_ms.min > self.collector.item_delay_ms.max {
            return Err(AppError::validation(
                "collector.item_delay_ms: min is greater than max",
            ));
        }
        if self.analyzer.model.trim().is_empty() {
            return Err(AppError::validation("analyzer.model is empty"));
        }
        if self.analyzer.request_timeout_secs == 0 || self.analyzer.validate_timeout_secs == 0 {
            return Err(AppError::validation("analyzer timeouts must be > 0"));
        }
        if !(0.0..=2.0).contains(&self.analyzer.temperature) {
            return Err(AppError::validation(
                "analyzer.temperature must be within 0.0..=2.0",
            ));
        }
        if !(1..=MAX_KEY_TTL_DAYS).contains(&self.analyzer.key_ttl_days) {
            return Err(AppError::validation(format!(
                "analyzer.key_ttl_days must be between 1 and {MAX_KEY_TTL_DAYS}"
            )));
        }
        if self.analyzer.api_key_env.trim().is_empty() {
            return Err(AppError::validation("analyzer.api_key_env is empty"));
        }
        Ok(())
    }
}

/// Inclusive range of milliseconds used for randomized pauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min: u64,
    pub max: u64,
}

impl DelayRange {
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    /// A range that never sleeps.
    pub const fn zero() -> Self {
        Self { min: 0, max: 0 }
    }
}

/// GitHub search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Base URL of the GitHub REST API
    #[serde(default = "defaults::github_api")]
    pub api_base: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Optional token; `GITHUB_TOKEN` is used when unset
    #[serde(default)]
    pub token: Option<String>,

    /// Topic categories searched on every run
    #[serde(default = "defaults::topics")]
    pub topics: Vec<String>,

    /// Repositories requested per topic
    #[serde(default = "defaults::per_page")]
    pub per_page: u32,

    /// Request timeout in seconds
    #[serde(default = "defaults::collector_timeout")]
    pub timeout_secs: u64,

    /// Pause before each topic query
    #[serde(default = "defaults::topic_delay")]
    pub topic_delay_ms: DelayRange,

    /// Pause after each per-repository topic fetch
    #[serde(default = "defaults::item_delay")]
    pub item_delay_ms: DelayRange,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            api_base: defaults::github_api(),
            user_agent: defaults::user_agent(),
            token: None,
            topics: defaults::topics(),
            per_page: defaults::per_page(),
            timeout_secs: defaults::collector_timeout(),
            topic_delay_ms: defaults::topic_delay(),
            item_delay_ms: defaults::item_delay(),
        }
    }
}

/// DeepSeek chat-completion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Base URL of the OpenAI-compatible API
    #[serde(default = "defaults::deepseek_api")]
    pub api_base: String,

    /// Model used when the provider does not list any
    #[serde(default = "defaults::model")]
    pub model: String,

    #[serde(default = "defaults::temperature")]
    pub temperature: f32,

    /// Timeout for a single analysis request
    #[serde(default = "defaults::request_timeout")]
    pub request_timeout_secs: u64,

    /// Timeout for the key validation request
    #[serde(default = "defaults::validate_timeout")]
    pub validate_timeout_secs: u64,

    /// Extra attempts after a retryable failure
    #[serde(default = "defaults::max_retries")]
    pub max_retries: u32,

    /// Base of the `base * 2^attempt` wait between attempts
    #[serde(default = "defaults::retry_base")]
    pub retry_base_secs: u64,

    /// Retries performed by the HTTP layer on retryable statuses
    #[serde(default = "defaults::transport_retries")]
    pub transport_retries: u32,

    /// Backoff factor of the HTTP layer retries
    #[serde(default = "defaults::transport_backoff")]
    pub transport_backoff_secs: u64,

    /// Number of records analyzed in test mode
    #[serde(default = "defaults::test_limit")]
    pub test_limit: usize,

    /// Environment variable holding the fallback key
    #[serde(default = "defaults::api_key_env")]
    pub api_key_env: String,

    /// Lifetime of a cached key
    #[serde(default = "defaults::key_ttl_days")]
    pub key_ttl_days: i64,
}

impl AnalyzerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn validate_timeout(&self) -> Duration {
        Duration::from_secs(self.validate_timeout_secs)
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            api_base: defaults::deepseek_api(),
            model: defaults::model(),
            temperature: defaults::temperature(),
            request_timeout_secs: defaults::request_timeout(),
            validate_timeout_secs: defaults::validate_timeout(),
            max_retries: defaults::max_retries(),
            retry_base_secs: defaults::retry_base(),
            transport_retries: defaults::transport_retries(),
            transport_backoff_secs: defaults::transport_backoff(),
            test_limit: defaults::test_limit(),
            api_key_env: defaults::api_key_env(),
            key_ttl_days: defaults::key_ttl_days(),
        }
    }
}

/// File locations, relative to the working directory unless absolute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "defaults::output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "defaults::seen_file")]
    pub seen_file: PathBuf,

    #[serde(default = "defaults::key_cache")]
    pub key_cache: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            output_dir: defaults::output_dir(),
            seen_file: defaults::seen_file(),
            key_cache: defaults::key_cache(),
        }
    }
}

/// Report output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Markdown,
    Text,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Markdown => "md",
            ReportFormat::Text => "txt",
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            "text" | "txt" | "plain" => Ok(ReportFormat::Text),
            other => Err(AppError::validation(format!(
                "unknown report format '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub format: ReportFormat,
}

/// When collected URLs are committed to the seen-set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeenPolicy {
    /// Every collected URL is committed right after collection.
    #[default]
    OnCollect,
    /// Only URLs whose analysis succeeded are committed.
    OnEnriched,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateConfig {
    #[serde(default)]
    pub seen_policy: SeenPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "defaults::log_level")]
    pub level: String,

    /// Print per-record progress lines
    #[serde(default = "defaults::show_progress")]
    pub show_progress: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
            show_progress: defaults::show_progress(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    use super::DelayRange;

    // Collector defaults
    pub fn github_api() -> String {
        "https://api.github.com".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 toolwatch/0.1".into()
    }
    pub fn topics() -> Vec<String> {
        vec![
            "ai-tools".into(),
            "artificial-intelligence".into(),
            "machine-learning".into(),
            "deep-learning".into(),
        ]
    }
    pub fn per_page() -> u32 {
        20
    }
    pub fn collector_timeout() -> u64 {
        30
    }
    pub fn topic_delay() -> DelayRange {
        DelayRange::new(2_000, 5_000)
    }
    pub fn item_delay() -> DelayRange {
        DelayRange::new(500, 1_000)
    }

    // Analyzer defaults
    pub fn deepseek_api() -> String {
        "https://api.deepseek.com/v1".into()
    }
    pub fn model() -> String {
        "deepseek-chat".into()
    }
    pub fn temperature() -> f32 {
        0.7
    }
    pub fn request_timeout() -> u64 {
        90
    }
    pub fn validate_timeout() -> u64 {
        15
    }
    pub fn max_retries() -> u32 {
        2
    }
    pub fn retry_base() -> u64 {
        5
    }
    pub fn transport_retries() -> u32 {
        3
    }
    pub fn transport_backoff() -> u64 {
        2
    }
    pub fn test_limit() -> usize {
        3
    }
    pub fn api_key_env() -> String {
        "DEEPSEEK_API_KEY".into()
    }
    pub fn key_ttl_days() -> i64 {
        30
    }

    // Path defaults
    pub fn output_dir() -> PathBuf {
        PathBuf::from("output")
    }
    pub fn seen_file() -> PathBuf {
        PathBuf::from("output/github_seen_urls.json")
    }
    pub fn key_cache() -> PathBuf {
        PathBuf::from("config/api_keys.json")
    }

    // Logging defaults
    pub fn log_level() -> String {
        "info".into()
    }
    pub fn show_progress() -> bool {
        true
    }
}
