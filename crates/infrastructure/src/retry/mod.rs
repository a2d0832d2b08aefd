//! Retry-with-backoff for transient external failures. No teacher crate in
//! this codebase pulls in a dedicated backoff crate; this mirrors the
//! manual retry loop used for batch sentiment analysis, generalized into a
//! standalone policy plus a generic `retry` driver.

use std::time::Duration;

use rand::Rng;
use tracing::warn;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 250,
        }
    }
}

impl RetryPolicy {
    /// Exponential backoff with +/-25% jitter, attempt 0 is the first retry.
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exp = self.base_delay_ms.saturating_mul(1u64 << attempt.min(10));
        let jitter_factor = rand::thread_rng().gen_range(0.75..1.25);
        Duration::from_millis((exp as f64 * jitter_factor) as u64)
    }
}

/// Whether a failure should be retried. Implementations classify their own
/// errors (5xx/429/timeout transient, 4xx permanent).
pub trait Transient {
    fn is_transient(&self) -> bool;
}

/// Runs `op` up to `policy.max_attempts` times, sleeping with backoff
/// between transient failures. Returns the last error if every attempt
/// fails, or the first permanent failure immediately.
pub async fn retry<T, E, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, E>
where
    E: Transient + std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if !err.is_transient() => {
                return Err(err);
            }
            Err(err) => {
                if attempt + 1 >= policy.max_attempts {
                    warn!("retry attempts exhausted: {err}");
                    return Err(err);
                }
                warn!("transient failure on attempt {}: {err}, retrying", attempt + 1);
                tokio::time::sleep(policy.delay_for_attempt(attempt)).await;
                attempt += 1;
            }
        }
    }
}
