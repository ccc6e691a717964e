//! Cache entry, option and statistics models.

use crate::error::CacheError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Supported upstream AI vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Anthropic,
    Replicate,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::OpenAi, Provider::Anthropic, Provider::Replicate];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Replicate => "replicate",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "anthropic" => Ok(Provider::Anthropic),
            "replicate" => Ok(Provider::Replicate),
            other => Err(CacheError::InvalidRequest(format!(
                "Unsupported provider: {}. Supported providers: openai, anthropic, replicate",
                other
            ))),
        }
    }
}

/// What kind of AI operation produced a result. Drives the default TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentCategory {
    /// Conversational completions and intent detection.
    #[default]
    Chat,
    /// Expensive generative media (music, stems).
    Generation,
    /// Speech-to-text results.
    Transcription,
}

/// Per-call options for `CacheService::get` and `CacheService::set`.
#[derive(Debug, Clone)]
pub struct CacheOptions {
    pub provider: Provider,
    pub model: String,
    pub category: ContentCategory,
    /// Overrides the category default TTL on `set`.
    pub ttl: Option<Duration>,
    /// Force-refresh escape hatch: no store access, no counters.
    pub skip_cache: bool,
}

impl CacheOptions {
    pub fn new(provider: Provider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            category: ContentCategory::default(),
            ttl: None,
            skip_cache: false,
        }
    }

    pub fn category(mut self, category: ContentCategory) -> Self {
        self.category = category;
        self
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn skip_cache(mut self, skip: bool) -> Self {
        self.skip_cache = skip;
        self
    }
}

/// A cached upstream result plus bookkeeping, as persisted in the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub payload: serde_json::Value,
    /// Epoch milliseconds.
    pub cached_at: i64,
    /// Epoch milliseconds.
    pub expires_at: i64,
    pub hit_count: u64,
}

impl CacheEntry {
    pub fn new(key: String, payload: serde_json::Value, now_ms: i64, ttl: Duration) -> Self {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        Self {
            key,
            payload,
            cached_at: now_ms,
            expires_at: now_ms.saturating_add(ttl_ms),
            hit_count: 0,
        }
    }

    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms > self.expires_at
    }

    /// Time left before expiry. The entry is valid while `now <= expires_at`,
    /// so the last valid millisecond yields `Some(ZERO)`.
    pub fn remaining(&self, now_ms: i64) -> Option<Duration> {
        let left = self.expires_at.saturating_sub(now_ms);
        if left >= 0 {
            Some(Duration::from_millis(left as u64))
        } else {
            None
        }
    }
}

/// Hit/miss statistics for one counter scope.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub saved_cost: f64,
}

impl CacheStats {
    pub fn new(hits: u64, misses: u64, saved_cost: f64) -> Self {
        Self {
            hits,
            misses,
            hit_rate: hit_rate(hits, misses),
            saved_cost,
        }
    }

    pub fn observations(&self) -> u64 {
        self.hits + self.misses
    }
}

/// `hits / (hits + misses)`, 0 when nothing has been observed.
pub fn hit_rate(hits: u64, misses: u64) -> f64 {
    let total = hits + misses;
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}

/// Snapshot of what the cache namespace currently holds.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct CacheInfo {
    pub total_keys: usize,
    /// Bytes reported by the store.
    pub memory_usage: u64,
    pub providers: BTreeMap<String, usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_valid_through_expiry_instant() {
        let entry = CacheEntry::new("k".to_string(), serde_json::Value::Null, 1_000, Duration::from_millis(500));
        assert_eq!(entry.expires_at, 1_500);

        assert_eq!(entry.remaining(1_200), Some(Duration::from_millis(300)));
        assert_eq!(entry.remaining(1_500), Some(Duration::ZERO));
        assert!(!entry.is_expired(1_500));
        assert_eq!(entry.remaining(1_501), None);
        assert!(entry.is_expired(1_501));
    }

    #[test]
    fn test_entry_ttl_saturates() {
        let entry = CacheEntry::new("k".to_string(), serde_json::Value::Null, 1_000, Duration::from_secs(u64::MAX));
        assert_eq!(entry.expires_at, i64::MAX);
        assert!(entry.remaining(1_000).is_some());
    }

    #[test]
    fn test_hit_rate_without_observations() {
        assert_eq!(hit_rate(0, 0), 0.0);
        assert_eq!(hit_rate(3, 1), 0.75);
    }
}
