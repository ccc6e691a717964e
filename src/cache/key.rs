// Cache key derivation - canonical JSON + SHA-256

use crate::cache::models::Provider;
use crate::error::{CacheError, Result};
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Namespace shared by every cache entry key.
pub const CACHE_PREFIX: &str = "ai:cache:";

/// Namespace shared by every usage counter record.
pub const STATS_PREFIX: &str = "ai:stats:";

/// Build the cache key for a request payload.
///
/// The payload is canonicalized (object keys sorted at every depth) so the same
/// logical value always yields the same key, then hashed together with the
/// provider and model: `ai:cache:{provider}:{model}:{sha256hex}`.
///
/// # Errors
///
/// Returns `CacheError::Serialization` if the payload cannot be represented as JSON.
pub fn build_key<P: Serialize + ?Sized>(payload: &P, provider: Provider, model: &str) -> Result<String> {
    let value = serde_json::to_value(payload)
        .map_err(|e| CacheError::Serialization(e.to_string()))?;

    let mut canonical = String::new();
    write_canonical(&value, &mut canonical)?;

    let mut hasher = Sha256::new();
    hasher.update(provider.as_str().as_bytes());
    hasher.update(b":");
    hasher.update(model.as_bytes());
    hasher.update(b":");
    hasher.update(canonical.as_bytes());

    Ok(format!(
        "{}{}:{}:{}",
        CACHE_PREFIX,
        provider,
        model_segment(model),
        hex::encode(hasher.finalize())
    ))
}

/// Prefix matching every entry for a provider, or for a provider+model pair.
pub fn scope_prefix(provider: Option<Provider>, model: Option<&str>) -> String {
    match (provider, model) {
        (None, _) => CACHE_PREFIX.to_string(),
        (Some(p), None) => format!("{}{}:", CACHE_PREFIX, p),
        (Some(p), Some(m)) => format!("{}{}:{}:", CACHE_PREFIX, p, model_segment(m)),
    }
}

/// Counter record key for a stats scope.
pub fn stats_key(provider: Option<Provider>, model: Option<&str>) -> String {
    match (provider, model) {
        (None, _) => format!("{}global", STATS_PREFIX),
        (Some(p), None) => format!("{}{}", STATS_PREFIX, p),
        (Some(p), Some(m)) => format!("{}{}:{}", STATS_PREFIX, p, model_segment(m)),
    }
}

/// Model name as a key segment: `%` and `:` are percent-escaped so a model
/// can never be read as a prefix of another (`owner/name` vs `owner/name:version`).
pub fn model_segment(model: &str) -> String {
    let mut out = String::with_capacity(model.len());
    for c in model.chars() {
        match c {
            '%' => out.push_str("%25"),
            ':' => out.push_str("%3A"),
            other => out.push(other),
        }
    }
    out
}

/// Provider segment of a cache key (`ai:cache:{provider}:...`).
pub fn provider_segment(key: &str) -> Option<&str> {
    key.strip_prefix(CACHE_PREFIX)?.split(':').next()
}

fn write_canonical(value: &Value, out: &mut String) -> Result<()> {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));

            out.push('{');
            for (i, (k, v)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&serde_json::to_string(k)?);
                out.push(':');
                write_canonical(v, out)?;
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out)?;
            }
            out.push(']');
        }
        scalar => out.push_str(&serde_json::to_string(scalar)?),
    }
    Ok(())
}
