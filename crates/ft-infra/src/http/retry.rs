//! Bounded retry for idempotent reads.
//!
//! Mutations (create, start-visit, end-visit, phone patch, OTP dispatch)
//! must never pass through here: a retried create would duplicate the
//! backend record. The API clients only wrap their read paths.

use std::future::Future;
use std::time::Duration;

use ft_core::ApiError;
use tracing::{error, warn};

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Additional attempts after the first one.
    pub retries: u32,
    pub backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 1,
            backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Fail on the first error. For callers that want the shared code
    /// path without any retry behavior.
    pub fn none() -> Self {
        Self {
            retries: 0,
            ..Self::default()
        }
    }

    fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.backoff.saturating_mul(factor).min(self.max_backoff)
    }
}

/// Runs `operation` until it succeeds or the retry budget is spent.
///
/// Only transport failures (`Network`, `Timeout`) are retried. A server
/// verdict, however unwelcome, is final: retrying a `Validation` or
/// `Unauthorized` response would just repeat the same answer.
pub async fn retry_idempotent<T, F, Fut>(
    operation_name: &str,
    policy: RetryPolicy,
    mut operation: F,
) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < policy.retries => {
                let delay = policy.backoff_for(attempt);
                warn!(
                    operation = operation_name,
                    attempt = attempt + 1,
                    error = %err,
                    delay_ms = delay.as_millis() as u64,
                    "transport failure; retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => {
                error!(
                    operation = operation_name,
                    attempts = attempt + 1,
                    error = %err,
                    "request failed"
                );
                return Err(err);
            }
        }
    }
}
