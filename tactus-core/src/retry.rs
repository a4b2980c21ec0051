//! Bounded retry with a fixed delay between attempts.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// How many times to attempt an operation and how long to pause between
/// attempts. Both the camera capture path and the HTTP fallback send use
/// this through [`retry`], so attempt accounting works the same way
/// everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Clamped to at least 1.
    pub max_attempts: u32,
    /// Pause between consecutive attempts. No pause after the last one.
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn from_millis(max_attempts: u32, delay_ms: u64) -> Self {
        Self::new(max_attempts, Duration::from_millis(delay_ms))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, Duration::from_millis(500))
    }
}

/// Runs `op` up to `policy.max_attempts` times, sleeping `policy.delay`
/// between attempts. Every failure is logged with its attempt number; the
/// caller only sees the final outcome, with the last error returned when
/// all attempts are spent.
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, what: &str, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                warn!("{} failed (attempt {}/{}): {}", what, attempt, attempts, e);
                if attempt >= attempts {
                    return Err(e);
                }
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
        }
    }
}
