// Admin HTTP request handlers

use super::routes::AppState;
use crate::analytics::CacheAnalytics;
use crate::cache::{CacheInfo, CacheStats, Provider};
use crate::error::{CacheError, Result};
use crate::voice::{VoicePattern, VoiceResolution};
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub store: String,
    pub message: String,
    pub timestamp: String,
}

/// Optional `provider` / `model` scope shared by stats and clear endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ScopeQuery {
    pub provider: Option<String>,
    pub model: Option<String>,
}

impl ScopeQuery {
    fn provider(&self) -> Result<Option<Provider>> {
        self.provider.as_deref().map(|p| p.parse::<Provider>()).transpose()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RemovedResponse {
    pub removed: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EfficiencyResponse {
    pub score: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct VoiceMatchRequest {
    pub text: String,
}

/// Caching degrades silently, so a store outage is "degraded", never an error status.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let (status, message) = match state.cache.ping().await {
        Ok(()) => (HealthStatus::Healthy, "Store reachable".to_string()),
        Err(e) => (HealthStatus::Degraded, format!("Cache bypassed: {}", e)),
    };

    Json(HealthResponse {
        status,
        store: state.cache.store_name().to_string(),
        message,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

pub async fn metrics_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        crate::metrics::gather_metrics(),
    )
}

pub async fn stats_handler(
    State(state): State<AppState>,
    Query(scope): Query<ScopeQuery>,
) -> Result<Json<CacheStats>> {
    let provider = scope.provider()?;
    Ok(Json(state.cache.get_stats(provider, scope.model.as_deref()).await))
}

pub async fn reset_stats_handler(State(state): State<AppState>) -> Json<RemovedResponse> {
    let removed = state.cache.reset_stats().await;
    info!("Usage counters reset ({} records)", removed);
    Json(RemovedResponse { removed })
}

pub async fn cache_info_handler(State(state): State<AppState>) -> Json<CacheInfo> {
    Json(state.cache.get_cache_info().await)
}

pub async fn clear_cache_handler(
    State(state): State<AppState>,
    Query(scope): Query<ScopeQuery>,
) -> Result<Json<RemovedResponse>> {
    let provider = scope.provider()?;
    if provider.is_none() && scope.model.is_some() {
        return Err(CacheError::InvalidRequest(
            "model scope requires a provider".to_string(),
        ));
    }

    let removed = state.cache.clear_cache(provider, scope.model.as_deref()).await;
    info!(
        "Cleared {} cache entries (provider={:?}, model={:?})",
        removed, scope.provider, scope.model
    );
    Ok(Json(RemovedResponse { removed }))
}

pub async fn analytics_handler(State(state): State<AppState>) -> Json<CacheAnalytics> {
    Json(state.analytics.get_analytics().await)
}

pub async fn efficiency_handler(State(state): State<AppState>) -> Json<EfficiencyResponse> {
    Json(EfficiencyResponse {
        score: state.analytics.get_efficiency_score().await,
    })
}

pub async fn recommendations_handler(State(state): State<AppState>) -> Json<RecommendationsResponse> {
    Json(RecommendationsResponse {
        recommendations: state.analytics.get_recommendations().await,
    })
}

pub async fn voice_match_handler(
    State(state): State<AppState>,
    Json(req): Json<VoiceMatchRequest>,
) -> Result<Json<VoiceResolution>> {
    if req.text.trim().is_empty() {
        return Err(CacheError::InvalidRequest("text must not be empty".to_string()));
    }
    Ok(Json(state.voice.resolve(&req.text).await?))
}

pub async fn list_patterns_handler(State(state): State<AppState>) -> Json<Vec<VoicePattern>> {
    Json(state.voice.matcher().patterns())
}

pub async fn add_pattern_handler(
    State(state): State<AppState>,
    Json(pattern): Json<VoicePattern>,
) -> Result<StatusCode> {
    if pattern.action.trim().is_empty() || !state.voice.matcher().add_pattern(&pattern.phrase, &pattern.action) {
        return Err(CacheError::InvalidRequest(
            "phrase and action must not be empty".to_string(),
        ));
    }
    Ok(StatusCode::CREATED)
}
