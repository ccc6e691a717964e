// Retry logic for store connections

use crate::error::{CacheError, Result};
use backoff::ExponentialBackoff;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Create exponential backoff configuration for connection attempts
pub fn create_backoff() -> ExponentialBackoff {
    ExponentialBackoff {
        current_interval: Duration::from_millis(250),
        initial_interval: Duration::from_millis(250),
        randomization_factor: 0.3,
        multiplier: 2.0,
        max_interval: Duration::from_secs(5),
        max_elapsed_time: Some(Duration::from_secs(30)),
        ..Default::default()
    }
}

/// Whether an error is worth another attempt
pub fn is_retryable(error: &CacheError) -> bool {
    error.is_store_failure()
}

/// Run `operation` until it succeeds, fails permanently, or the backoff gives up.
pub async fn with_retry<F, Fut, T>(operation_name: &str, operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    with_backoff(operation_name, create_backoff(), operation).await
}

pub async fn with_backoff<F, Fut, T>(
    operation_name: &str,
    backoff: ExponentialBackoff,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    backoff::future::retry_notify(
        backoff,
        || {
            let attempt = operation();
            async move {
                attempt.await.map_err(|e| {
                    if is_retryable(&e) {
                        backoff::Error::transient(e)
                    } else {
                        backoff::Error::permanent(e)
                    }
                })
            }
        },
        |e: CacheError, wait: Duration| {
            warn!("{} failed ({}), retrying in {}ms", operation_name, e, wait.as_millis());
        },
    )
    .await
}
