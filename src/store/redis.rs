// Redis-backed store for sharing the cache across server instances

use super::{CounterValue, Store};
use crate::error::Result;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

const SCAN_BATCH: usize = 500;

/// Upper bound for `SET PX`; redis rejects expiries that overflow its clock.
const MAX_PX_MILLIS: u64 = 100 * 365 * 24 * 60 * 60 * 1000;

/// [`Store`] over a redis connection manager (reconnects transparently).
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }

    async fn scan(&self, prefix: &str) -> Result<Vec<String>> {
        let mut conn = self.conn.clone();
        let pattern = format!("{}*", escape_glob(prefix));
        let mut cursor: u64 = 0;
        let mut keys = Vec::new();

        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        Ok(keys)
    }
}

#[async_trait]
impl Store for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn.clone();
        let value: Option<Vec<u8>> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        let mut conn = self.conn.clone();
        let millis = u64::try_from(ttl.as_millis())
            .unwrap_or(u64::MAX)
            .clamp(1, MAX_PX_MILLIS);
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("PX")
            .arg(millis)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        let removed: i64 = conn.del(key).await?;
        Ok(removed > 0)
    }

    async fn delete_by_prefix(&self, prefix: &str) -> Result<usize> {
        let keys = self.scan(prefix).await?;
        let mut conn = self.conn.clone();
        let mut removed = 0usize;
        for chunk in keys.chunks(SCAN_BATCH) {
            let n: i64 = conn.del(chunk.to_vec()).await?;
            removed += n.max(0) as usize;
        }
        debug!("Deleted {} redis keys under {}", removed, prefix);
        Ok(removed)
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        self.scan(prefix).await
    }

    async fn incr_int(&self, key: &str, field: &str, amount: i64) -> Result<i64> {
        let mut conn = self.conn.clone();
        let value: i64 = redis::cmd("HINCRBY")
            .arg(key)
            .arg(field)
            .arg(amount)
            .query_async(&mut conn)
            .await?;
        Ok(value)
    }

    async fn incr_float(&self, key: &str, field: &str, amount: f64) -> Result<f64> {
        let mut conn = self.conn.clone();
        let value: f64 = redis::cmd("HINCRBYFLOAT")
            .arg(key)
            .arg(field)
            .arg(amount)
            .query_async(&mut conn)
            .await?;
        Ok(value)
    }

    async fn read_counter_fields(&self, key: &str) -> Result<HashMap<String, CounterValue>> {
        let mut conn = self.conn.clone();
        let raw: HashMap<String, String> = redis::cmd("HGETALL")
            .arg(key)
            .query_async(&mut conn)
            .await?;
        Ok(raw
            .into_iter()
            .filter_map(|(field, value)| CounterValue::parse(&value).map(|v| (field, v)))
            .collect())
    }

    async fn memory_usage(&self) -> Result<u64> {
        let mut conn = self.conn.clone();
        let info: String = redis::cmd("INFO").arg("memory").query_async(&mut conn).await?;
        Ok(parse_used_memory(&info).unwrap_or(0))
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

/// Escape `SCAN MATCH` glob metacharacters so a prefix only matches literally.
fn escape_glob(prefix: &str) -> String {
    let mut out = String::with_capacity(prefix.len());
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Extract `used_memory:<bytes>` from an `INFO memory` reply.
fn parse_used_memory(info: &str) -> Option<u64> {
    info.lines()
        .find_map(|line| line.trim().strip_prefix("used_memory:"))
        .and_then(|v| v.trim().parse().ok())
}
