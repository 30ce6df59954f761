/*!
 * Bounded exponential backoff for provider calls.
 *
 * Only throttling failures (429, resource exhausted, quota) are retried. Every
 * other provider error is returned on the first occurrence. Waiting goes through
 * a `Sleeper` so tests can observe delays without spending wall-clock time.
 */

use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::warn;
use parking_lot::Mutex;

use crate::errors::{ProviderError, TranslationError};

/// Retry settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Wait before the second attempt
    pub initial_backoff: Duration,
    /// Factor applied to the wait after every retry
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(2000),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    /// Policy with the given attempt count and initial backoff in milliseconds
    pub fn new(max_attempts: u32, initial_backoff_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff: Duration::from_millis(initial_backoff_ms),
            multiplier: 2,
        }
    }

    /// Waits between attempts, in order: 2000ms, 4000ms with the defaults
    pub fn schedule(&self) -> Vec<Duration> {
        let mut backoff = self.initial_backoff;
        (1..self.max_attempts)
            .map(|_| {
                let current = backoff;
                backoff = backoff.saturating_mul(self.multiplier);
                current
            })
            .collect()
    }
}

/// Something that can wait
#[async_trait]
pub trait Sleeper: Send + Sync + Debug {
    /// Suspend for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Waits on the tokio timer
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Records requested waits and returns immediately
#[derive(Debug, Default, Clone)]
pub struct RecordingSleeper {
    waits: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits requested so far
    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().clone()
    }

    /// Sum of all requested waits
    pub fn total(&self) -> Duration {
        self.waits.lock().iter().sum()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.waits.lock().push(duration);
        tokio::task::yield_now().await;
    }
}

/// Runs provider operations under a `RetryPolicy`
#[derive(Debug, Clone)]
pub struct RetryingInvoker {
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl Default for RetryingInvoker {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

impl RetryingInvoker {
    /// Invoker that waits on the tokio timer
    pub fn new(policy: RetryPolicy) -> Self {
        Self::with_sleeper(policy, Arc::new(TokioSleeper))
    }

    /// Invoker with a custom sleeper
    pub fn with_sleeper(policy: RetryPolicy, sleeper: Arc<dyn Sleeper>) -> Self {
        Self { policy, sleeper }
    }

    /// Active policy
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `operation` until it succeeds, fails fatally, or the attempts run out.
    ///
    /// # Errors
    /// * `TranslationError::Provider` for the first non-throttling failure
    /// * `TranslationError::RetriesExhausted` when every attempt was throttled
    pub async fn invoke<T, F, Fut>(&self, label: &str, mut operation: F) -> Result<T, TranslationError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut backoff = self.policy.initial_backoff;
        let mut attempt = 1;

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) if !error.is_rate_limited() => return Err(TranslationError::Provider(error)),
                Err(error) if attempt >= max_attempts => {
                    return Err(TranslationError::RetriesExhausted {
                        attempts: attempt,
                        last: error,
                    });
                }
                Err(error) => {
                    warn!(
                        "{}: rate limited on attempt {}/{}, retrying in {}ms ({})",
                        label,
                        attempt,
                        max_attempts,
                        backoff.as_millis(),
                        error
                    );
                    self.sleeper.sleep(backoff).await;
                    backoff = backoff.saturating_mul(self.policy.multiplier);
                    attempt += 1;
                }
            }
        }
    }
}
