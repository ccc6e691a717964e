// Metrics module for Prometheus observability

mod registry;

pub use registry::{
    gather_metrics, CACHE_ENTRIES, CACHE_OPERATIONS, CACHE_SAVED_COST, STORE_ERRORS,
    VOICE_MATCHES,
};

use crate::cache::Provider;

/// Helper to record cache operations (hit, miss, set, skip, expired, error)
pub fn record_cache_operation(operation: &str, provider: Provider) {
    CACHE_OPERATIONS
        .with_label_values(&[operation, provider.as_str()])
        .inc();
}

/// Helper to record the estimated cost avoided by a hit
pub fn record_saved_cost(provider: Provider, cost: f64) {
    if cost > 0.0 {
        CACHE_SAVED_COST
            .with_label_values(&[provider.as_str()])
            .inc_by(cost);
    }
}

pub fn update_cache_entries(provider: &str, count: usize) {
    CACHE_ENTRIES.with_label_values(&[provider]).set(count as f64);
}

/// Helper to record failed or timed out store calls
pub fn record_store_error(operation: &str) {
    STORE_ERRORS.with_label_values(&[operation]).inc();
}

/// Helper to record voice pattern lookups by tier
pub fn record_voice_match(tier: &str) {
    VOICE_MATCHES.with_label_values(&[tier]).inc();
}
