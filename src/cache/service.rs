//! The request-facing AI response cache.
//!
//! `CacheService` wraps every expensive provider call: callers look up a
//! payload first, perform the upstream call on a miss, then hand the result
//! back with `set`. Hit/miss/saved-cost counters are kept per provider+model,
//! per provider, and globally so stats can be read at any granularity.
//!
//! Caching is an optimization, never a correctness dependency: every store
//! failure or timeout is logged and degrades to "miss" (for reads) or "no-op"
//! (for writes). Only key derivation errors, which are caller bugs, surface.

use crate::cache::cost::CostTable;
use crate::cache::key::{build_key, provider_segment, scope_prefix, stats_key, CACHE_PREFIX, STATS_PREFIX};
use crate::cache::models::{CacheEntry, CacheInfo, CacheOptions, CacheStats, ContentCategory, Provider};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::metrics;
use crate::store::{CounterValue, Store};
use crate::utils::logging::short_key;
use futures::future::try_join_all;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Counter field names inside a usage counter record.
pub const HITS_FIELD: &str = "hits";
pub const MISSES_FIELD: &str = "misses";
pub const SAVED_COST_FIELD: &str = "saved_cost";

/// Longest TTL handed to a store; larger requested or configured TTLs are capped.
pub const MAX_TTL: Duration = Duration::from_secs(10 * 365 * 24 * 60 * 60);

pub struct CacheService {
    store: Arc<dyn Store>,
    config: CacheConfig,
    costs: CostTable,
    store_timeout: Duration,
}

impl CacheService {
    pub fn new(store: Arc<dyn Store>, config: CacheConfig) -> Self {
        Self {
            store,
            costs: CostTable::new(config.cost_estimates.clone()),
            store_timeout: Duration::from_millis(config.store_timeout_ms),
            config,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn cost_table(&self) -> &CostTable {
        &self.costs
    }

    pub fn store_name(&self) -> &'static str {
        self.store.name()
    }

    /// TTL applied by `set` when the caller doesn't pass one.
    pub fn default_ttl(&self, category: ContentCategory) -> Duration {
        let seconds = match category {
            ContentCategory::Generation => self.config.generation_ttl_seconds,
            ContentCategory::Chat => self.config.chat_ttl_seconds,
            ContentCategory::Transcription => self.config.transcription_ttl_seconds,
        };
        Duration::from_secs(seconds).min(MAX_TTL)
    }

    /// Look up a cached result for `payload`.
    ///
    /// Returns `Ok(None)` on a miss, when `skip_cache` is set, and whenever the
    /// store fails. A hit bumps the entry's hit count, rewrites it with its
    /// remaining TTL and credits the estimated call cost to `saved_cost`.
    ///
    /// # Errors
    ///
    /// Only `CacheError::Serialization` when the payload cannot be keyed.
    pub async fn get<P, T>(&self, payload: &P, options: &CacheOptions) -> Result<Option<T>>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        if options.skip_cache || !self.config.enabled {
            metrics::record_cache_operation("skip", options.provider);
            return Ok(None);
        }

        let key = build_key(payload, options.provider, &options.model)?;

        match self.lookup(&key, options).await {
            Ok(found) => Ok(found),
            Err(e) => {
                error!("Cache lookup failed for {}, treating as miss: {}", short_key(&key), e);
                metrics::record_cache_operation("error", options.provider);
                Ok(None)
            }
        }
    }

    /// Store an upstream result for `payload`.
    ///
    /// The TTL is `options.ttl` if given, else the default for `options.category`.
    /// Store failures are logged and swallowed: the upstream call already succeeded.
    ///
    /// # Errors
    ///
    /// Only `CacheError::Serialization` when the payload cannot be keyed.
    pub async fn set<P, R>(&self, payload: &P, result: &R, options: &CacheOptions) -> Result<()>
    where
        P: Serialize + ?Sized,
        R: Serialize + ?Sized,
    {
        if options.skip_cache || !self.config.enabled {
            metrics::record_cache_operation("skip", options.provider);
            return Ok(());
        }

        let key = build_key(payload, options.provider, &options.model)?;

        let ttl = options
            .ttl
            .unwrap_or_else(|| self.default_ttl(options.category))
            .min(MAX_TTL);
        if ttl.is_zero() {
            debug!("Zero TTL for {}, not caching", short_key(&key));
            return Ok(());
        }

        let value = match serde_json::to_value(result) {
            Ok(v) => v,
            Err(e) => {
                warn!("Result for {} is not cacheable: {}", short_key(&key), e);
                return Ok(());
            }
        };

        let entry = CacheEntry::new(key.clone(), value, now_ms(), ttl);
        let bytes = match serde_json::to_vec(&entry) {
            Ok(b) => b,
            Err(e) => {
                warn!("Failed to encode cache entry {}: {}", short_key(&key), e);
                return Ok(());
            }
        };

        match self.guarded("set", self.store.set(&key, bytes, ttl)).await {
            Ok(()) => {
                debug!("Cached {} for {}s", short_key(&key), ttl.as_secs());
                metrics::record_cache_operation("set", options.provider);
            }
            Err(e) => {
                error!("Failed to cache {}: {}", short_key(&key), e);
                metrics::record_cache_operation("error", options.provider);
            }
        }

        Ok(())
    }

    /// Hit/miss statistics for a scope: global without a provider, provider-wide
    /// without a model, otherwise provider+model.
    pub async fn get_stats(&self, provider: Option<Provider>, model: Option<&str>) -> CacheStats {
        let key = stats_key(provider, model);
        match self.guarded("read_counters", self.store.read_counter_fields(&key)).await {
            Ok(fields) => stats_from_fields(&fields),
            Err(e) => {
                error!("Failed to read stats {}: {}", key, e);
                CacheStats::default()
            }
        }
    }

    /// Delete every entry for the scope. Returns how many were removed.
    pub async fn clear_cache(&self, provider: Option<Provider>, model: Option<&str>) -> usize {
        let prefix = scope_prefix(provider, model);
        match self.guarded("delete_by_prefix", self.store.delete_by_prefix(&prefix)).await {
            Ok(removed) => {
                debug!("Cleared {} cache entries under {}", removed, prefix);
                removed
            }
            Err(e) => {
                error!("Failed to clear cache under {}: {}", prefix, e);
                0
            }
        }
    }

    /// Delete every usage counter record. Returns how many were removed.
    pub async fn reset_stats(&self) -> usize {
        match self.guarded("delete_by_prefix", self.store.delete_by_prefix(STATS_PREFIX)).await {
            Ok(removed) => {
                debug!("Reset {} usage counters", removed);
                removed
            }
            Err(e) => {
                error!("Failed to reset usage counters: {}", e);
                0
            }
        }
    }

    /// One bounded round-trip to the store. Unlike the cache operations this
    /// reports the failure, for health checks.
    pub async fn ping(&self) -> Result<()> {
        self.guarded("ping", self.store.read_counter_fields(&stats_key(None, None)))
            .await
            .map(|_| ())
    }

    /// Count live entries in the cache namespace, per provider.
    pub async fn get_cache_info(&self) -> CacheInfo {
        let keys = match self.guarded("keys", self.store.keys_with_prefix(CACHE_PREFIX)).await {
            Ok(keys) => keys,
            Err(e) => {
                error!("Failed to enumerate cache keys: {}", e);
                return CacheInfo::default();
            }
        };

        let memory_usage = self
            .guarded("memory_usage", self.store.memory_usage())
            .await
            .unwrap_or_else(|e| {
                warn!("Failed to read store memory usage: {}", e);
                0
            });

        let mut info = CacheInfo {
            total_keys: keys.len(),
            memory_usage,
            ..CacheInfo::default()
        };
        for key in &keys {
            if let Some(provider) = provider_segment(key) {
                *info.providers.entry(provider.to_string()).or_insert(0) += 1;
            }
        }
        for provider in Provider::ALL {
            let count = info.providers.get(provider.as_str()).copied().unwrap_or(0);
            metrics::update_cache_entries(provider.as_str(), count);
        }

        info
    }

    async fn lookup<T: DeserializeOwned>(&self, key: &str, options: &CacheOptions) -> Result<Option<T>> {
        let Some(raw) = self.guarded("get", self.store.get(key)).await? else {
            debug!("Cache miss: {}", short_key(key));
            self.record_miss(options).await?;
            return Ok(None);
        };

        let mut entry: CacheEntry = match serde_json::from_slice(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Discarding undecodable entry {}: {}", short_key(key), e);
                self.guarded("delete", self.store.delete(key)).await?;
                self.record_miss(options).await?;
                return Ok(None);
            }
        };

        // The store enforces TTL too; an entry past its expiry is never served.
        let now = now_ms();
        let Some(remaining) = entry.remaining(now) else {
            debug!("Expired entry: {}", short_key(key));
            metrics::record_cache_operation("expired", options.provider);
            self.guarded("delete", self.store.delete(key)).await?;
            self.record_miss(options).await?;
            return Ok(None);
        };

        let value: T = match serde_json::from_value(entry.payload.clone()) {
            Ok(value) => value,
            Err(e) => {
                warn!("Cached payload {} has an unexpected shape: {}", short_key(key), e);
                self.record_miss(options).await?;
                return Ok(None);
            }
        };

        entry.hit_count += 1;
        let bytes = serde_json::to_vec(&entry)?;
        self.guarded("set", self.store.set(key, bytes, remaining)).await?;

        debug!("Cache hit: {} (hit #{})", short_key(key), entry.hit_count);
        self.record_hit(options).await?;
        Ok(Some(value))
    }

    async fn record_miss(&self, options: &CacheOptions) -> Result<()> {
        metrics::record_cache_operation("miss", options.provider);
        self.increment_scopes(options, MISSES_FIELD).await
    }

    async fn record_hit(&self, options: &CacheOptions) -> Result<()> {
        metrics::record_cache_operation("hit", options.provider);
        self.increment_scopes(options, HITS_FIELD).await?;

        match self.costs.estimate(options.provider, &options.model) {
            Some(cost) => {
                let keys = scope_keys(options);
                try_join_all(keys.iter().map(|k| {
                    self.guarded("incr_float", self.store.incr_float(k, SAVED_COST_FIELD, cost))
                }))
                .await?;
                metrics::record_saved_cost(options.provider, cost);
            }
            None => {
                debug!(
                    "No cost estimate for {}/{}, hit not counted toward savings",
                    options.provider, options.model
                );
            }
        }

        Ok(())
    }

    async fn increment_scopes(&self, options: &CacheOptions, field: &'static str) -> Result<()> {
        let keys = scope_keys(options);
        try_join_all(
            keys.iter()
                .map(|k| self.guarded("incr_int", self.store.incr_int(k, field, 1))),
        )
        .await?;
        Ok(())
    }

    /// Bound a store round-trip by the configured timeout.
    async fn guarded<T, F>(&self, operation: &'static str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let result = match tokio::time::timeout(self.store_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(CacheError::StoreTimeout {
                operation,
                timeout_ms: self.store_timeout.as_millis() as u64,
            }),
        };
        if result.is_err() {
            metrics::record_store_error(operation);
        }
        result
    }
}

/// Global, provider and provider+model counter records touched by one lookup.
fn scope_keys(options: &CacheOptions) -> [String; 3] {
    [
        stats_key(None, None),
        stats_key(Some(options.provider), None),
        stats_key(Some(options.provider), Some(&options.model)),
    ]
}

fn stats_from_fields(fields: &HashMap<String, CounterValue>) -> CacheStats {
    let read = |name: &str| fields.get(name).copied();
    CacheStats::new(
        read(HITS_FIELD).map(|v| v.as_u64()).unwrap_or(0),
        read(MISSES_FIELD).map(|v| v.as_u64()).unwrap_or(0),
        read(SAVED_COST_FIELD).map(|v| v.as_f64()).unwrap_or(0.0),
    )
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn service() -> CacheService {
        CacheService::new(Arc::new(MemoryStore::new(100)), CacheConfig::default())
    }

    #[test]
    fn test_default_ttl_by_category() {
        let service = service();
        assert_eq!(service.default_ttl(ContentCategory::Generation), Duration::from_secs(604_800));
        assert_eq!(service.default_ttl(ContentCategory::Chat), Duration::from_secs(3600));
        assert_eq!(service.default_ttl(ContentCategory::Transcription), Duration::from_secs(7200));
    }

    #[tokio::test]
    async fn test_huge_ttl_is_capped() {
        let store = Arc::new(MemoryStore::new(100));
        let config = CacheConfig {
            generation_ttl_seconds: u64::MAX,
            ..CacheConfig::default()
        };
        let service = CacheService::new(store.clone(), config);
        assert_eq!(service.default_ttl(ContentCategory::Generation), MAX_TTL);

        let generation = CacheOptions::new(Provider::Replicate, "meta/musicgen").category(ContentCategory::Generation);
        service.set("beat", "audio", &generation).await.unwrap();

        let explicit = CacheOptions::new(Provider::OpenAi, "gpt-4o").ttl(Duration::from_secs(u64::MAX));
        service.set("p", "r", &explicit).await.unwrap();
        let hit: Option<String> = service.get("p", &explicit).await.unwrap();
        assert_eq!(hit.as_deref(), Some("r"));

        let key = build_key("p", Provider::OpenAi, "gpt-4o").unwrap();
        let raw = store.get(&key).await.unwrap().unwrap();
        let entry: CacheEntry = serde_json::from_slice(&raw).unwrap();
        assert_eq!(entry.expires_at - entry.cached_at, MAX_TTL.as_millis() as i64);
    }

    #[test]
    fn test_stats_from_fields() {
        let mut fields = HashMap::new();
        fields.insert(HITS_FIELD.to_string(), CounterValue::Int(3));
        fields.insert(MISSES_FIELD.to_string(), CounterValue::Int(1));
        fields.insert(SAVED_COST_FIELD.to_string(), CounterValue::Float(0.45));

        let stats = stats_from_fields(&fields);
        assert_eq!(stats.hits, 3);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hit_rate, 0.75);
        assert_eq!(stats_from_fields(&HashMap::new()), CacheStats::default());
    }

    #[tokio::test]
    async fn test_entry_records_hit_count() {
        let store = Arc::new(MemoryStore::new(100));
        let service = CacheService::new(store.clone(), CacheConfig::default());
        let options = CacheOptions::new(Provider::OpenAi, "gpt-4o");

        service.set("hello", "world", &options).await.unwrap();
        for _ in 0..3 {
            let hit: Option<String> = service.get("hello", &options).await.unwrap();
            assert_eq!(hit.as_deref(), Some("world"));
        }

        let key = build_key("hello", Provider::OpenAi, "gpt-4o").unwrap();
        let raw = store.get(&key).await.unwrap().unwrap();
        let entry: CacheEntry = serde_json::from_slice(&raw).unwrap();
        assert_eq!(entry.hit_count, 3);
        assert_eq!(entry.key, key);
        assert_eq!(entry.expires_at - entry.cached_at, 3_600_000);
    }

    #[tokio::test]
    async fn test_disabled_cache_bypasses_store() {
        let store = Arc::new(MemoryStore::new(100));
        let config = CacheConfig {
            enabled: false,
            ..CacheConfig::default()
        };
        let service = CacheService::new(store.clone(), config);
        let options = CacheOptions::new(Provider::OpenAi, "gpt-4o");

        service.set("hello", "world", &options).await.unwrap();
        let hit: Option<String> = service.get("hello", &options).await.unwrap();
        assert!(hit.is_none());
        assert!(store.is_empty());
        assert_eq!(service.get_stats(None, None).await, CacheStats::default());
    }
}
