//! Retry logic.
//!
//! # Responsibilities
//! - Decide whether a failure is retryable (transient) or final
//! - Execute retries with exponential backoff + optional jitter
//! - Bound the number of attempts and honor cancellation between them
//!
//! # Design Decisions
//! - Never retry a synchronous rejection; only transient failures
//! - The operation receives the attempt number so it can do its own
//!   idempotency check before repeating a side effect

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use crate::config::RetryConfig;
use crate::lifecycle::ShutdownSignal;
use crate::resilience::backoff::calculate_backoff;
use crate::resilience::timeouts::sleep_unless_cancelled;

/// Failures that know whether repeating the call could help.
pub trait Retryable {
    fn is_transient(&self) -> bool;
}

/// Bounded retry policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter: bool,
}

impl RetryPolicy {
    /// Delay to wait after `attempt` attempts have failed.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        calculate_backoff(attempt, self.base_delay_ms, self.max_delay_ms, self.jitter)
    }

    /// The waits between attempts when every attempt fails, without jitter.
    pub fn schedule(&self) -> Vec<Duration> {
        (1..self.max_attempts.max(1))
            .map(|attempt| calculate_backoff(attempt, self.base_delay_ms, self.max_delay_ms, false))
            .collect()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            base_delay_ms: config.base_delay_ms,
            max_delay_ms: config.max_delay_ms,
            jitter: config.jitter,
        }
    }
}

/// Why a retried operation gave up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryError<E> {
    /// A non-retryable failure; returned on the attempt it occurred.
    Permanent(E),
    /// Every attempt failed transiently.
    Exhausted { attempts: u32, last: E },
    /// Cancellation fired before or during an attempt or a backoff wait.
    Cancelled { attempts: u32 },
}

/// Run `operation` until it succeeds, fails permanently, runs out of
/// attempts, or `shutdown` fires.
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: &RetryPolicy,
    shutdown: &ShutdownSignal,
    operation: &'static str,
    mut f: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        if shutdown.is_cancelled() {
            return Err(RetryError::Cancelled { attempts: attempt });
        }
        attempt += 1;

        let result = tokio::select! {
            result = f(attempt) => result,
            _ = shutdown.cancelled() => return Err(RetryError::Cancelled { attempts: attempt }),
        };

        match result {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(operation, attempt, "Succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) if !e.is_transient() => return Err(RetryError::Permanent(e)),
            Err(e) if attempt >= max_attempts => {
                tracing::warn!(operation, attempts = attempt, error = %e, "Retries exhausted");
                return Err(RetryError::Exhausted { attempts: attempt, last: e });
            }
            Err(e) => {
                let delay = policy.delay_after(attempt);
                tracing::warn!(
                    operation,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Transient failure, backing off"
                );
                if sleep_unless_cancelled(delay, shutdown).await.is_err() {
                    return Err(RetryError::Cancelled { attempts: attempt });
                }
            }
        }
    }
}
