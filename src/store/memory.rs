// In-process store: LRU-bounded entries, unbounded counter records

use super::{CounterValue, Store};
use crate::error::Result;
use async_trait::async_trait;
use lru::LruCache;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};
use tracing::debug;

/// Deadline used when `now + ttl` does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

struct StoredValue {
    data: Vec<u8>,
    expires_at: Instant,
}

impl StoredValue {
    fn is_expired(&self, now: Instant) -> bool {
        now > self.expires_at
    }
}

/// In-memory [`Store`]. Entries beyond `max_entries` evict least-recently-used first.
pub struct MemoryStore {
    entries: Mutex<LruCache<String, StoredValue>>,
    counters: Mutex<HashMap<String, HashMap<String, CounterValue>>>,
}

impl MemoryStore {
    pub fn new(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            counters: Mutex::new(HashMap::new()),
        }
    }

    /// Number of entries physically held, expired or not.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut entries = self.entries.lock();
        let now = Instant::now();
        let expired = match entries.get(key) {
            Some(value) if !value.is_expired(now) => return Ok(Some(value.data.clone())),
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        let now = Instant::now();
        let stored = StoredValue {
            data: value,
            expires_at: now
                .checked_add(ttl)
                .or_else(|| now.checked_add(FAR_FUTURE))
                .unwrap_or(now),
        };
        if let Some((evicted, _)) = self.entries.lock().push(key.to_string(), stored) {
            if evicted != key {
                debug!("Evicted least recently used entry");
            }
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let removed_entry = self.entries.lock().pop(key).is_some();
        let removed_counter = self.counters.lock().remove(key).is_some();
        Ok(removed_entry || removed_counter)
    }

    async fn delete_by_prefix(&self, prefix: &str) -> Result<usize> {
        let mut removed = 0;

        {
            let mut entries = self.entries.lock();
            let keys: Vec<String> = entries
                .iter()
                .filter(|(k, _)| k.starts_with(prefix))
                .map(|(k, _)| k.clone())
                .collect();
            for key in keys {
                entries.pop(&key);
                removed += 1;
            }
        }

        let mut counters = self.counters.lock();
        let before = counters.len();
        counters.retain(|k, _| !k.starts_with(prefix));
        removed += before - counters.len();

        Ok(removed)
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let now = Instant::now();
        let entries = self.entries.lock();
        Ok(entries
            .iter()
            .filter(|(k, v)| k.starts_with(prefix) && !v.is_expired(now))
            .map(|(k, _)| k.clone())
            .collect())
    }

    async fn incr_int(&self, key: &str, field: &str, amount: i64) -> Result<i64> {
        let mut counters = self.counters.lock();
        let slot = counters
            .entry(key.to_string())
            .or_default()
            .entry(field.to_string())
            .or_insert(CounterValue::Int(0));
        *slot = match *slot {
            CounterValue::Int(v) => CounterValue::Int(v + amount),
            CounterValue::Float(v) => CounterValue::Float(v + amount as f64),
        };
        Ok(slot.as_f64() as i64)
    }

    async fn incr_float(&self, key: &str, field: &str, amount: f64) -> Result<f64> {
        let mut counters = self.counters.lock();
        let slot = counters
            .entry(key.to_string())
            .or_default()
            .entry(field.to_string())
            .or_insert(CounterValue::Float(0.0));
        let next = slot.as_f64() + amount;
        *slot = CounterValue::Float(next);
        Ok(next)
    }

    async fn read_counter_fields(&self, key: &str) -> Result<HashMap<String, CounterValue>> {
        Ok(self.counters.lock().get(key).cloned().unwrap_or_default())
    }

    async fn memory_usage(&self) -> Result<u64> {
        let entries: usize = self
            .entries
            .lock()
            .iter()
            .map(|(k, v)| k.len() + v.data.len())
            .sum();
        let counters: usize = self
            .counters
            .lock()
            .iter()
            .map(|(k, fields)| k.len() + fields.keys().map(|f| f.len() + 8).sum::<usize>())
            .sum();
        Ok((entries + counters) as u64)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
