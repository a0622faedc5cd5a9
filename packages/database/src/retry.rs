//! Retry with exponential backoff for transient storage errors.
//!
//! Callers wrap a storage operation in [`with_retry`]. Whether an error is
//! retried depends only on [`StoreError::class`], so a 404 fails fast
//! while a timeout, a truncated body, or a 503 gets another attempt.

use std::future::Future;
use std::time::Duration;

use crate::StoreError;

/// Number of retries after the initial attempt.
pub const MAX_RETRIES: u32 = 3;

/// Delay before the first retry. Doubles on every further retry.
pub const BASE_DELAY: Duration = Duration::from_secs(1);

/// How many times to retry and how long to wait between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the initial attempt.
    pub max_retries: u32,
    /// Delay before retry 1; retry `n` waits `base_delay * 2^(n-1)`.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            base_delay: BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Same retry count with no waiting between attempts.
    #[must_use]
    pub const fn immediate() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            base_delay: Duration::ZERO,
        }
    }

    /// Delay before retry number `retry` (1-based): 1s, 2s, 4s, ...
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        let shift = retry.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1u32 << shift)
    }
}

/// Runs `operation`, retrying transient failures per `policy`.
///
/// `label` names the operation in log lines.
///
/// # Errors
///
/// Returns the first fatal error, or the last transient error once the
/// retries are used up.
pub async fn with_retry<T, F, Fut>(
    policy: RetryPolicy,
    label: &str,
    mut operation: F,
) -> Result<T, StoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    let mut retry = 0;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && retry < policy.max_retries => {
                retry += 1;
                let delay = policy.delay_for(retry);
                log::warn!(
                    "{label}: transient error: {e} (retry {retry}/{} in {delay:?})",
                    policy.max_retries
                );
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
            Err(e) => {
                if e.is_transient() {
                    log::warn!(
                        "{label}: giving up after {} retries: {e}",
                        policy.max_retries
                    );
                }
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn unavailable() -> StoreError {
        StoreError::Status {
            status: 503,
            body: "upstream unavailable".to_string(),
        }
    }

    #[test]
    fn backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for(3), Duration::from_secs(4));
    }

    #[tokio::test]
    async fn recovers_after_transient_failures() {
        let calls = &AtomicU32::new(0);
        let result = with_retry(RetryPolicy::immediate(), "test", || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(unavailable())
            } else {
                Ok(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn stops_after_max_retries() {
        let calls = &AtomicU32::new(0);
        let result: Result<(), _> = with_retry(RetryPolicy::immediate(), "test", || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(unavailable())
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1 + MAX_RETRIES);
    }

    #[tokio::test]
    async fn fatal_errors_fail_fast() {
        let calls = &AtomicU32::new(0);
        let result: Result<(), _> = with_retry(RetryPolicy::immediate(), "test", || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Status {
                status: 404,
                body: String::new(),
            })
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_between_attempts() {
        let start = tokio::time::Instant::now();
        let result: Result<(), _> =
            with_retry(RetryPolicy::default(), "test", || async move { Err(unavailable()) }).await;

        assert!(result.is_err());
        assert!(start.elapsed() >= Duration::from_secs(7));
    }
}
