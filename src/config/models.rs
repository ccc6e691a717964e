//! Configuration data structures for studio-cache.
//!
//! This module defines the schema for the application settings: the admin
//! server, the backing store, cache TTL policy and cost estimates, analytics
//! baselines, and logging.

use crate::cache::Provider;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The root configuration object for the application.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Admin HTTP server settings (host, port).
    #[serde(default)]
    pub server: ServerConfig,

    /// Backing key-value store settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Cache policy: TTLs per content category, timeouts, per-call costs.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Savings analytics baselines and targets.
    #[serde(default)]
    pub analytics: AnalyticsConfig,

    /// Voice command shortcut settings.
    #[serde(default)]
    pub voice: VoiceConfig,

    /// Logging and observability settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for the admin HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The IP address or hostname the server should bind to.
    /// Default: `127.0.0.1`
    #[serde(default = "default_host")]
    pub host: String,

    /// The port number the server should listen on.
    /// Default: `8088`
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Settings for the backing store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store backend: `memory` or `redis`.
    /// Default: `memory`
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Connection URL for the `redis` backend.
    /// Default: `redis://127.0.0.1:6379`
    #[serde(default = "default_redis_url")]
    pub url: String,

    /// Maximum number of cache entries held by the `memory` backend.
    /// Default: `10000`
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

/// Cache policy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether caching is enabled. When disabled every lookup is a bypass.
    /// Default: `true`
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Default TTL for generative media results (music generation).
    /// Default: `604800` (7 days)
    #[serde(default = "default_generation_ttl")]
    pub generation_ttl_seconds: u64,

    /// Default TTL for chat-style completions.
    /// Default: `3600` (1 hour)
    #[serde(default = "default_chat_ttl")]
    pub chat_ttl_seconds: u64,

    /// Default TTL for transcription results.
    /// Default: `7200` (2 hours)
    #[serde(default = "default_transcription_ttl")]
    pub transcription_ttl_seconds: u64,

    /// Upper bound on any single store round-trip before it counts as a failure.
    /// Default: `250`
    #[serde(default = "default_store_timeout")]
    pub store_timeout_ms: u64,

    /// Estimated cost of one upstream call, matched by model substring.
    /// These are estimates, not billing data.
    #[serde(default = "default_cost_estimates")]
    pub cost_estimates: Vec<CostRule>,
}

/// A per-call cost estimate for every model of `provider` whose name contains `model_pattern`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CostRule {
    pub provider: Provider,
    pub model_pattern: String,
    pub cost_per_call: f64,
}

/// Settings for the savings analytics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Assumed monthly spend per provider without caching, keyed by provider name.
    /// These are estimates used to express savings, not measured figures.
    #[serde(default = "default_baseline_costs")]
    pub baseline_monthly_costs: BTreeMap<String, f64>,

    /// Monthly savings considered a full score by the efficiency heuristic.
    /// Default: `500.0`
    #[serde(default = "default_target_savings")]
    pub target_monthly_savings: f64,

    /// Cache size considered a full score by the efficiency heuristic.
    /// Default: `1000`
    #[serde(default = "default_optimal_size")]
    pub optimal_cache_size: u64,
}

/// Settings for the voice command path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceConfig {
    /// Model whose AI-resolved intents are cached for unmatched utterances.
    /// Default: `gpt-4o-mini`
    #[serde(default = "default_intent_model")]
    pub intent_model: String,
}

/// Settings for application logging and output format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum log level (`trace`, `debug`, `info`, `warn`, `error`).
    /// Default: `info`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format for logs (`pretty`, `json`).
    /// Default: `pretty`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            url: default_redis_url(),
            max_entries: default_max_entries(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            generation_ttl_seconds: default_generation_ttl(),
            chat_ttl_seconds: default_chat_ttl(),
            transcription_ttl_seconds: default_transcription_ttl(),
            store_timeout_ms: default_store_timeout(),
            cost_estimates: default_cost_estimates(),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            baseline_monthly_costs: default_baseline_costs(),
            target_monthly_savings: default_target_savings(),
            optimal_cache_size: default_optimal_size(),
        }
    }
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            intent_model: default_intent_model(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8088
}

fn default_backend() -> String {
    "memory".to_string()
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_max_entries() -> usize {
    10_000
}

fn default_true() -> bool {
    true
}

fn default_generation_ttl() -> u64 {
    7 * 24 * 3600
}

fn default_chat_ttl() -> u64 {
    3600
}

fn default_transcription_ttl() -> u64 {
    2 * 3600
}

fn default_store_timeout() -> u64 {
    250
}

fn default_cost_estimates() -> Vec<CostRule> {
    let rule = |provider, model_pattern: &str, cost_per_call| CostRule {
        provider,
        model_pattern: model_pattern.to_string(),
        cost_per_call,
    };

    vec![
        rule(Provider::OpenAi, "gpt-4o-mini", 0.002),
        rule(Provider::OpenAi, "gpt-4o", 0.02),
        rule(Provider::OpenAi, "gpt-4", 0.03),
        rule(Provider::OpenAi, "gpt-3.5", 0.002),
        rule(Provider::OpenAi, "whisper", 0.006),
        rule(Provider::OpenAi, "tts", 0.015),
        rule(Provider::Anthropic, "opus", 0.075),
        rule(Provider::Anthropic, "sonnet", 0.015),
        rule(Provider::Anthropic, "haiku", 0.0025),
        rule(Provider::Replicate, "musicgen", 0.15),
        rule(Provider::Replicate, "riffusion", 0.08),
        rule(Provider::Replicate, "demucs", 0.05),
    ]
}

fn default_baseline_costs() -> BTreeMap<String, f64> {
    BTreeMap::from([
        ("openai".to_string(), 500.0),
        ("anthropic".to_string(), 300.0),
        ("replicate".to_string(), 800.0),
    ])
}

fn default_target_savings() -> f64 {
    500.0
}

fn default_optimal_size() -> u64 {
    1000
}

fn default_intent_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}
