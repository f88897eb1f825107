//! Retry with exponential back-off and jitter for routing-service calls.
//!
//! [`retry_with_backoff`] wraps any fallible async operation and retries on
//! transient errors (network failures, 5xx). API-level and deserialization
//! errors are returned immediately — retrying won't fix them.

use std::future::Future;
use std::time::Duration;

use crate::error::RoutingError;

/// Returns `true` for errors that are worth retrying after a back-off delay.
pub(crate) fn is_retriable(err: &RoutingError) -> bool {
    match err {
        RoutingError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        RoutingError::ApiError(_)
        | RoutingError::Deserialize { .. }
        | RoutingError::EmptyResponse(_) => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on
/// transient errors. Delay doubles per attempt from `backoff_base_ms`,
/// capped at 30 s, with ±25 % jitter.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, RoutingError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RoutingError>>,
{
    const MAX_DELAY_MS: u64 = 30_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "routing service transient error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn transient() -> RoutingError {
        // Simulating a reqwest transport error requires a live socket, so
        // tests drive the classifier and combinator with API errors plus a
        // counter; the reqwest arm is covered by the wiremock 500 test.
        RoutingError::ApiError("boom".to_string())
    }

    #[test]
    fn api_errors_are_not_retriable() {
        assert!(!is_retriable(&transient()));
        assert!(!is_retriable(&RoutingError::EmptyResponse("x".into())));
    }

    #[tokio::test]
    async fn non_retriable_error_returns_after_one_attempt() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_with_backoff(3, 1, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(RoutingError::ApiError("bad profile".to_string())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn success_passes_through() {
        let result = retry_with_backoff(3, 1, || async { Ok(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }
}
