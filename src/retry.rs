//! Bounded retry with a fixed delay between attempts.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

/// Number of retries made for the token request after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Fixed pause between token requests.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Retry budget: `max_retries` further attempts after the first, separated by
/// `delay`. There is no backoff.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RetryPolicy {
    max_retries: u32,
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY)
    }
}

/// Returned when every attempt allowed by a [`RetryPolicy`] failed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RetryExhausted<E> {
    /// Number of attempts made.
    pub attempts: u32,
    /// Error produced by the final attempt.
    pub last_error: E,
}

impl RetryPolicy {
    /// Creates a policy.
    #[must_use]
    pub const fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// Total attempts allowed, including the first.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay between attempts.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Runs `operation` until it succeeds or the budget is spent. The closure
    /// receives the 1-based attempt number. No delay follows the final
    /// attempt.
    ///
    /// # Errors
    ///
    /// Returns [`RetryExhausted`] with the last error once every attempt has
    /// failed.
    pub async fn run<T, E, F, Fut>(&self, mut operation: F) -> Result<T, RetryExhausted<E>>
    where
        E: Display,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max_attempts = self.max_attempts();
        let mut attempt = 1;
        loop {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) if attempt >= max_attempts => {
                    return Err(RetryExhausted {
                        attempts: attempt,
                        last_error: err,
                    });
                }
                Err(err) => {
                    warn!(
                        attempt,
                        max_attempts,
                        delay_secs = self.delay.as_secs(),
                        error = %err,
                        "attempt failed; retrying after delay"
                    );
                    sleep(self.delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
