// Error types for studio-cache

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    /// Payload could not be canonicalized into a cache key. Caller bug.
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Store operation '{operation}' timed out after {timeout_ms}ms")]
    StoreTimeout {
        operation: &'static str,
        timeout_ms: u64,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parsing error: {0}")]
    ConfigParsing(#[from] config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CacheError {
    /// Whether the error came from the backing store (and must degrade to "no cache").
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            CacheError::StoreUnavailable(_) | CacheError::StoreTimeout { .. }
        )
    }
}

#[cfg(feature = "cache-redis")]
impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError::StoreUnavailable(err.to_string())
    }
}

// Convert CacheError to HTTP responses for the admin API
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let (status, error_type) = match self {
            CacheError::InvalidRequest(_) | CacheError::Serialization(_) => {
                (StatusCode::BAD_REQUEST, "invalid_request_error")
            }
            CacheError::StoreUnavailable(_) | CacheError::StoreTimeout { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, "store_error")
            }
            CacheError::Config(_) | CacheError::ConfigParsing(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error")
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "api_error"),
        };

        let body = json!({
            "type": "error",
            "error": {
                "type": error_type,
                "message": self.to_string(),
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, CacheError>;
