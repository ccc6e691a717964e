//! Key-value store abstraction behind the AI response cache.
//!
//! The cache never talks to a backend directly: everything goes through the
//! [`Store`] trait, which offers per-entry TTL, prefix scans for scoped clears,
//! and atomic counter increments on named fields of a counter record.
//!
//! # Backends
//!
//! - [`MemoryStore`]: in-process, LRU bounded. Default, and what tests use.
//! - `RedisStore`: shared across instances (feature `cache-redis`).

mod memory;
#[cfg(feature = "cache-redis")]
mod redis;

pub use memory::MemoryStore;
#[cfg(feature = "cache-redis")]
pub use self::redis::RedisStore;

use crate::config::StoreConfig;
use crate::error::{CacheError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Value of one counter field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CounterValue {
    Int(i64),
    Float(f64),
}

impl CounterValue {
    pub fn as_f64(&self) -> f64 {
        match self {
            CounterValue::Int(v) => *v as f64,
            CounterValue::Float(v) => *v,
        }
    }

    pub fn as_u64(&self) -> u64 {
        match self {
            CounterValue::Int(v) => (*v).max(0) as u64,
            CounterValue::Float(v) => v.max(0.0) as u64,
        }
    }

    /// Parse the textual form a remote store returns.
    pub fn parse(raw: &str) -> Option<Self> {
        raw.parse::<i64>()
            .map(CounterValue::Int)
            .or_else(|_| raw.parse::<f64>().map(CounterValue::Float))
            .ok()
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Raw value at `key`; never returns an expired value.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` until `now + ttl`, overwriting unconditionally.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<bool>;

    /// Remove every entry and counter record whose key starts with `prefix`.
    async fn delete_by_prefix(&self, prefix: &str) -> Result<usize>;

    /// Live entry keys starting with `prefix`.
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;

    /// Atomically add `amount` to an integer field, creating it at zero.
    async fn incr_int(&self, key: &str, field: &str, amount: i64) -> Result<i64>;

    /// Atomically add `amount` to a float field, creating it at zero.
    async fn incr_float(&self, key: &str, field: &str, amount: f64) -> Result<f64>;

    /// All fields of a counter record; empty if it doesn't exist.
    async fn read_counter_fields(&self, key: &str) -> Result<HashMap<String, CounterValue>>;

    /// Approximate bytes used by the store.
    async fn memory_usage(&self) -> Result<u64>;

    fn name(&self) -> &'static str;
}

/// Build the store selected by configuration.
pub async fn connect(config: &StoreConfig) -> Result<Arc<dyn Store>> {
    match config.backend.as_str() {
        "memory" => {
            info!("Using in-memory store (max {} entries)", config.max_entries);
            Ok(Arc::new(MemoryStore::new(config.max_entries)))
        }
        #[cfg(feature = "cache-redis")]
        "redis" => {
            let url = config.url.clone();
            let store = crate::utils::retry::with_retry("redis connect", || {
                let url = url.clone();
                async move { RedisStore::connect(&url).await }
            })
            .await?;
            info!("Connected to redis store");
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "cache-redis"))]
        "redis" => Err(CacheError::Config(
            "store backend 'redis' requires the cache-redis feature".to_string(),
        )),
        other => Err(CacheError::Config(format!(
            "Unknown store backend: {}. Supported backends: memory, redis",
            other
        ))),
    }
}
