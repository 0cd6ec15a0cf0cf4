use std::future::Future;
use std::time::Duration;

use crate::constants::retry::{GROWTH_FACTOR, INITIAL_DELAY_MS, MAX_ATTEMPTS};

/// Errors that can tell whether they are a rate-limit signal
pub trait IsRateLimited {
    fn is_rate_limited(&self) -> bool;
}

/// HTTP status codes that mean "slow down"
pub fn is_rate_limit_status(status: u16) -> bool {
    status == 429
}

/// Recognize rate-limit markers in provider error text
pub fn has_rate_limit_marker(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("resource_exhausted")
        || lower.contains("resource exhausted")
        || lower.contains("rate limit")
        || lower.contains("too many requests")
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts including the first call
    pub max_attempts: u32,
    /// Delay before the first retry; grows by 1.5x after each
    pub initial_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            initial_delay: Duration::from_millis(INITIAL_DELAY_MS),
        }
    }
}

/// Run `operation`, retrying rate-limited failures with growing delay.
///
/// Any other failure, or the failure of the last attempt, is returned
/// unchanged.
pub async fn with_retry<T, E, F, Fut>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRateLimited + std::fmt::Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut delay = config.initial_delay;
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_rate_limited() && attempt < max_attempts => {
                tracing::warn!(
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Rate limited, backing off"
                );
                tokio::time::sleep(delay).await;
                delay = delay.mul_f64(GROWTH_FACTOR);
                attempt += 1;
            }
            Err(err) => {
                if err.is_rate_limited() {
                    tracing::error!(attempt, "Rate limit retries exhausted");
                }
                return Err(err);
            }
        }
    }
}
