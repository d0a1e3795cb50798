//! Linear-backoff retry policy for transient transport failures.

use std::time::Duration;

use crate::error::ApiError;

/// Configuration for the retry policy.
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (not counting the first try).
    pub max_retries: u32,
    /// Base delay; attempt `k` (1-indexed) waits `base_delay * k`.
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

/// Stateless retry policy — decides eligibility from the failure's shape and
/// computes the backoff for a given attempt number.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Returns `true` if this failure class is worth retrying at all.
    ///
    /// Responseless network failures qualify, CORS failures never do (a
    /// retried CORS request cannot succeed and only burns the budget), and
    /// protocol errors qualify only for `>= 500`, `429` and `408`.
    pub fn should_retry(&self, error: &ApiError) -> bool {
        error.is_retryable()
    }

    /// Returns the delay before the `attempt`-th retry (1-based), or `None`
    /// once the budget is exhausted.
    pub fn next_delay(&self, attempt: u32) -> Option<Duration> {
        if attempt > self.config.max_retries {
            return None;
        }
        Some(self.config.base_delay * attempt)
    }
}
