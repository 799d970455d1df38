//! Retry logic with exponential backoff
//!
//! Each endpoint gets a bounded number of tries. Between failed tries the caller
//! waits `initial_delay * backoff_multiplier^attempt_index` (1s, 2s, 4s, ... with
//! the defaults), capped at `max_delay`. No wait follows the final try.
//!
//! Waiting goes through the [`Sleeper`] trait so tests can observe backoff without
//! spending wall-clock time.
//!
//! # Example
//!
//! ```no_run
//! use ifsc_ledger::retry::{IsRetryable, TokioSleeper, retry_with_backoff};
//! use ifsc_ledger::config::RetryConfig;
//!
//! #[derive(Debug)]
//! enum MyError {
//!     Transient,
//!     Permanent,
//! }
//!
//! impl std::fmt::Display for MyError {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         write!(f, "{self:?}")
//!     }
//! }
//!
//! impl IsRetryable for MyError {
//!     fn is_retryable(&self) -> bool {
//!         matches!(self, MyError::Transient)
//!     }
//! }
//!
//! # async fn example() -> Result<(), MyError> {
//! let config = RetryConfig::default();
//! let _value = retry_with_backoff(&config, &TokioSleeper, |_attempt| async {
//!     Ok::<_, MyError>(42)
//! })
//! .await?;
//! # Ok(())
//! # }
//! ```

use crate::config::RetryConfig;
use crate::error::FetchError;
use async_trait::async_trait;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Trait for errors that can be classified as retryable or not
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for FetchError {
    fn is_retryable(&self) -> bool {
        match self {
            // Provider outages, slow responses and garbage bodies may clear up
            FetchError::Timeout { .. }
            | FetchError::Connect { .. }
            | FetchError::Status { .. }
            | FetchError::Transport { .. }
            | FetchError::InvalidBody { .. } => true,
            // The same template will produce the same broken URL every time
            FetchError::InvalidUrl { .. } => false,
        }
    }
}

/// Waits out a backoff delay
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Suspend the current resolution for `delay`
    async fn sleep(&self, delay: Duration);
}

/// [`Sleeper`] backed by the Tokio timer
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

/// Backoff delay that follows the failed try with the given zero-based index
///
/// Jitter is not applied here; see [`retry_with_backoff`].
pub fn backoff_delay(config: &RetryConfig, attempt_index: u32) -> Duration {
    let exponent = i32::try_from(attempt_index).unwrap_or(i32::MAX);
    let secs = config.initial_delay.as_secs_f64() * config.backoff_multiplier.powi(exponent);
    Duration::try_from_secs_f64(secs)
        .unwrap_or(config.max_delay)
        .min(config.max_delay)
}

/// Run `operation` until it succeeds, fails permanently, or runs out of tries
///
/// `operation` receives the zero-based attempt index. At most
/// `config.max_attempts` calls are made (at least one). Returns the successful
/// value or the last error.
pub async fn retry_with_backoff<F, Fut, T, E>(
    config: &RetryConfig,
    sleeper: &dyn Sleeper,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + std::fmt::Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match operation(attempt).await {
            Ok(result) => {
                if attempt > 0 {
                    tracing::info!(attempts = attempt + 1, "Operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) if e.is_retryable() && attempt + 1 < max_attempts => {
                let delay = backoff_delay(config, attempt);
                let delay = if config.jitter {
                    add_jitter(delay, config.max_delay)
                } else {
                    delay
                };

                tracing::warn!(
                    error = %e,
                    attempt = attempt + 1,
                    max_attempts,
                    delay_ms = delay.as_millis(),
                    "Operation failed, retrying"
                );

                sleeper.sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                if e.is_retryable() {
                    tracing::warn!(
                        error = %e,
                        attempts = attempt + 1,
                        "Operation failed after all retry attempts exhausted"
                    );
                } else {
                    tracing::warn!(error = %e, "Operation failed with non-retryable error");
                }
                return Err(e);
            }
        }
    }
}

/// Add random jitter to a delay
///
/// The result lies between `delay` and `2 * delay`, and never exceeds `max`
/// unless `delay` already does.
fn add_jitter(delay: Duration, max: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_factor: f64 = rng.gen_range(0.0..=1.0);
    Duration::try_from_secs_f64(delay.as_secs_f64() * (1.0 + jitter_factor))
        .unwrap_or(delay)
        .min(max.max(delay))
}

/// Test doubles shared by resolver and retry tests
#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Records requested delays instead of waiting
    #[derive(Debug, Default)]
    pub(crate) struct RecordingSleeper {
        delays: Mutex<Vec<Duration>>,
    }

    impl RecordingSleeper {
        pub(crate) fn delays(&self) -> Vec<Duration> {
            self.delays.lock().map(|d| d.clone()).unwrap_or_default()
        }

        pub(crate) fn total(&self) -> Duration {
            self.delays().iter().sum()
        }
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, delay: Duration) {
            if let Ok(mut delays) = self.delays.lock() {
                delays.push(delay);
            }
        }
    }
}
