//! Retry policy for failed enrichment fetches.
//!
//! Implements exponential backoff with configurable parameters.

use std::thread;
use std::time::Duration;

use tracing::warn;

use super::EnrichmentError;
use crate::config::RetrySettings;

/// Retry policy implementing exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
    /// Initial backoff duration in milliseconds.
    pub initial_backoff_ms: u64,
    /// Maximum backoff duration in milliseconds (cap for exponential growth).
    pub max_backoff_ms: u64,
    /// Multiplier applied to backoff after each retry.
    pub backoff_multiplier: f64,
}

impl RetryPolicy {
    /// Create a new RetryPolicy from configuration settings.
    pub fn new(config: &RetrySettings) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_backoff_ms: config.initial_backoff_ms,
            max_backoff_ms: config.max_backoff_ms,
            backoff_multiplier: config.backoff_multiplier,
        }
    }

    /// A policy that gives up after the first failure.
    pub fn no_retries() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Check if an error should be retried given the current retry count.
    ///
    /// Returns true if:
    /// - The error kind is retryable (e.g., not NotFound)
    /// - The retry count is less than max_retries
    pub fn should_retry(&self, error: &EnrichmentError, retry_count: u32) -> bool {
        error.is_retryable() && retry_count < self.max_retries
    }

    /// Backoff before retry number `retry_count + 1`.
    ///
    /// Uses exponential backoff: `initial_backoff * multiplier^retry_count`,
    /// capped at `max_backoff_ms`.
    pub fn backoff(&self, retry_count: u32) -> Duration {
        let backoff = self.initial_backoff_ms as f64 * self.backoff_multiplier.powi(retry_count as i32);
        Duration::from_millis(backoff.min(self.max_backoff_ms as f64) as u64)
    }

    /// Runs `op` until it succeeds, fails with a non-retryable error, or the
    /// retry budget is spent. Sleeps between attempts.
    pub fn run<T, F>(&self, what: &str, mut op: F) -> Result<T, EnrichmentError>
    where
        F: FnMut() -> Result<T, EnrichmentError>,
    {
        let mut retry_count = 0;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(err) if self.should_retry(&err, retry_count) => {
                    let backoff = self.backoff(retry_count);
                    warn!(
                        "{} failed ({}), retry {}/{} in {}ms",
                        what,
                        err,
                        retry_count + 1,
                        self.max_retries,
                        backoff.as_millis()
                    );
                    thread::sleep(backoff);
                    retry_count += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(&RetrySettings::default())
    }
}
