// Admin HTTP routes configuration

use super::handlers::{
    add_pattern_handler, analytics_handler, cache_info_handler, clear_cache_handler,
    efficiency_handler, health_handler, list_patterns_handler, metrics_handler,
    recommendations_handler, reset_stats_handler, stats_handler, voice_match_handler,
};
use super::middleware::request_id_layers;
use crate::analytics::AnalyticsAggregator;
use crate::cache::CacheService;
use crate::voice::VoiceCommandResolver;
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<CacheService>,
    pub analytics: Arc<AnalyticsAggregator>,
    pub voice: Arc<VoiceCommandResolver>,
}

pub fn create_router(state: AppState) -> Router {
    let (set_request_id, propagate_request_id) = request_id_layers();

    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/cache", delete(clear_cache_handler))
        .route("/cache/info", get(cache_info_handler))
        .route("/cache/stats", get(stats_handler))
        .route("/cache/stats/reset", post(reset_stats_handler))
        .route("/analytics", get(analytics_handler))
        .route("/analytics/efficiency", get(efficiency_handler))
        .route("/analytics/recommendations", get(recommendations_handler))
        .route("/voice/match", post(voice_match_handler))
        .route("/voice/patterns", get(list_patterns_handler).post(add_pattern_handler))
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id)
        .layer(set_request_id)
        .with_state(state)
}
