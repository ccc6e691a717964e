//! Structured logging setup and log-friendly formatting helpers.
//!
//! This module configures the `tracing` ecosystem for the application,
//! supporting multiple output formats, and keeps cache keys short enough to
//! read in log lines.

use crate::config::LoggingConfig;
use crate::error::{CacheError, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Hex digits of the payload digest kept when a cache key is logged.
const DIGEST_PREVIEW: usize = 12;

/// Initializes the global tracing subscriber for the application.
///
/// Supports two output formats:
/// - `json`: Structured JSON logs for production ingestion.
/// - `pretty` (default): Human-readable, colorized output for development.
///
/// Log levels are controlled via the `RUST_LOG` environment variable or
/// the provided `LoggingConfig`.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let installed = match config.format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init(),
    };

    installed.map_err(|e| CacheError::Internal(format!("failed to install logger: {}", e)))
}

/// Shortens `ai:cache:{provider}:{model}:{digest}` to its scope plus a digest prefix.
pub fn short_key(key: &str) -> String {
    match key.rfind(':') {
        Some(idx) => {
            let digest = &key[idx + 1..];
            let keep = digest
                .char_indices()
                .nth(DIGEST_PREVIEW)
                .map(|(i, _)| i)
                .unwrap_or(digest.len());
            format!("{}{}", &key[..=idx], &digest[..keep])
        }
        None => key.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_key() {
        let key = format!("ai:cache:openai:gpt-4o:{}", "a".repeat(64));
        assert_eq!(short_key(&key), "ai:cache:openai:gpt-4o:aaaaaaaaaaaa");
        assert_eq!(short_key("ai:cache:openai:x:abc"), "ai:cache:openai:x:abc");
        assert_eq!(short_key("plain"), "plain");
    }
}
