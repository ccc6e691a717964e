// Prometheus metrics registry and collectors

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec_with_registry, register_gauge_vec_with_registry, CounterVec, Encoder,
    GaugeVec, Opts, Registry, TextEncoder,
};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // ============================================================================
    // CACHE METRICS
    // ============================================================================

    /// Cache operations
    pub static ref CACHE_OPERATIONS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("ai_cache_operations_total", "Total AI cache operations"),
        &["operation", "provider"], // operation: hit, miss, set, skip, expired, error
        REGISTRY
    ).unwrap();

    /// Estimated spend avoided by cache hits
    pub static ref CACHE_SAVED_COST: CounterVec = register_counter_vec_with_registry!(
        Opts::new("ai_cache_saved_cost_total", "Estimated upstream cost avoided by cache hits"),
        &["provider"],
        REGISTRY
    ).unwrap();

    /// Current cache entries
    pub static ref CACHE_ENTRIES: GaugeVec = register_gauge_vec_with_registry!(
        Opts::new("ai_cache_entries_current", "Current number of cache entries"),
        &["provider"],
        REGISTRY
    ).unwrap();

    // ============================================================================
    // STORE METRICS
    // ============================================================================

    /// Failed or timed out store round-trips
    pub static ref STORE_ERRORS: CounterVec = register_counter_vec_with_registry!(
        Opts::new("store_errors_total", "Total failed store operations"),
        &["operation"],
        REGISTRY
    ).unwrap();

    // ============================================================================
    // VOICE METRICS
    // ============================================================================

    /// Voice command shortcut lookups
    pub static ref VOICE_MATCHES: CounterVec = register_counter_vec_with_registry!(
        Opts::new("voice_pattern_matches_total", "Voice command pattern lookups"),
        &["tier"], // tier: exact, substring, fuzzy, none
        REGISTRY
    ).unwrap();
}

/// Gather all metrics and return as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}
