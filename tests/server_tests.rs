// Admin HTTP surface tests

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use studio_cache::analytics::AnalyticsAggregator;
use studio_cache::cache::{CacheOptions, CacheService, Provider};
use studio_cache::config::AppConfig;
use studio_cache::server::{create_router, AppState};
use studio_cache::store::MemoryStore;
use studio_cache::voice::{PatternMatcher, VoiceCommandResolver};
use tower::ServiceExt;

fn app() -> (Arc<CacheService>, Router) {
    let config = AppConfig::default();
    let cache = Arc::new(CacheService::new(
        Arc::new(MemoryStore::new(config.store.max_entries)),
        config.cache.clone(),
    ));
    let analytics = Arc::new(AnalyticsAggregator::new(cache.clone(), &config.analytics));
    let voice = Arc::new(VoiceCommandResolver::new(
        Arc::new(PatternMatcher::new()),
        cache.clone(),
        config.voice.intent_model.clone(),
    ));
    let router = create_router(AppState {
        cache: cache.clone(),
        analytics,
        voice,
    });
    (cache, router)
}

async fn send(router: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = router.oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn test_health_reports_store() {
    let (_, router) = app();
    let (status, body) = send(router, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"], "memory");
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let (_, router) = app();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_stats_scopes() {
    let (cache, router) = app();
    let options = CacheOptions::new(Provider::OpenAi, "gpt-4o");
    cache.set("p", "r", &options).await.unwrap();
    let _: Option<String> = cache.get("p", &options).await.unwrap();

    let (status, body) = send(router.clone(), Method::GET, "/cache/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["hits"], 1);

    let (_, body) = send(router.clone(), Method::GET, "/cache/stats?provider=anthropic", None).await;
    assert_eq!(body["hits"], 0);

    let (status, _) = send(router, Method::GET, "/cache/stats?provider=cohere", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_clear_cache_endpoint() {
    let (cache, router) = app();
    cache
        .set("p", "r", &CacheOptions::new(Provider::OpenAi, "gpt-4o"))
        .await
        .unwrap();
    cache
        .set("p", "r", &CacheOptions::new(Provider::Replicate, "riffusion"))
        .await
        .unwrap();

    let (status, _) = send(router.clone(), Method::DELETE, "/cache?model=gpt-4o", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(router.clone(), Method::DELETE, "/cache?provider=openai", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 1);

    let (_, body) = send(router, Method::GET, "/cache/info", None).await;
    assert_eq!(body["total_keys"], 1);
    assert_eq!(body["providers"]["replicate"], 1);
}

#[tokio::test]
async fn test_reset_stats_endpoint() {
    let (cache, router) = app();
    let _: Option<String> = cache
        .get("p", &CacheOptions::new(Provider::OpenAi, "gpt-4o"))
        .await
        .unwrap();

    let (status, body) = send(router.clone(), Method::POST, "/cache/stats/reset", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 3);

    let (_, body) = send(router, Method::GET, "/cache/stats", None).await;
    assert_eq!(body["misses"], 0);
}

#[tokio::test]
async fn test_analytics_endpoints() {
    let (_, router) = app();

    let (status, body) = send(router.clone(), Method::GET, "/analytics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_hits"], 0);
    assert!(body["by_provider"]["openai"].is_object());

    let (_, body) = send(router.clone(), Method::GET, "/analytics/efficiency", None).await;
    assert_eq!(body["score"], 0.0);

    let (_, body) = send(router, Method::GET, "/analytics/recommendations", None).await;
    assert_eq!(body["recommendations"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_voice_match_endpoint() {
    let (_, router) = app();

    let (status, body) = send(
        router.clone(),
        Method::POST,
        "/voice/match",
        Some(json!({"text": "create a trap beat at 140 BPM"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "pattern");
    assert_eq!(body["action"], "generation:beat");
    assert_eq!(body["parameters"]["bpm"], 140);

    let (_, body) = send(
        router.clone(),
        Method::POST,
        "/voice/match",
        Some(json!({"text": "please compose a symphony in D minor about autumn"})),
    )
    .await;
    assert_eq!(body["source"], "unresolved");

    let (status, _) = send(router, Method::POST, "/voice/match", Some(json!({"text": "  "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_voice_patterns_endpoint() {
    let (_, router) = app();

    let (status, _) = send(
        router.clone(),
        Method::POST,
        "/voice/patterns",
        Some(json!({"phrase": "Drop The Bass", "action": "effects:bass_drop"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = send(router.clone(), Method::GET, "/voice/patterns", None).await;
    let listed = body
        .as_array()
        .unwrap()
        .iter()
        .any(|p| p["phrase"] == "drop the bass" && p["action"] == "effects:bass_drop");
    assert!(listed);

    let (status, _) = send(
        router,
        Method::POST,
        "/voice/patterns",
        Some(json!({"phrase": "", "action": "noop"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (cache, router) = app();
    let _: Option<String> = cache
        .get("p", &CacheOptions::new(Provider::OpenAi, "gpt-4o"))
        .await
        .unwrap();

    let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("ai_cache_operations_total"));
}
