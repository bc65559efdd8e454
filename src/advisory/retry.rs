// Retry logic with exponential backoff
//
// The delay schedule bounds the number of attempts: one attempt per delay,
// each failure followed by its delay, so a full outage waits exactly the sum
// of the schedule and never calls again after the last delay. Sleeping goes
// through `Sleeper` so tests can skip the wall clock, and every wait races
// the session's cancellation token.

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Default backoff schedule in milliseconds.
pub const DEFAULT_DELAYS_MS: [u64; 4] = [1000, 2000, 4000, 8000];

/// Ordered delays between attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    delays: Vec<Duration>,
}

impl RetryPolicy {
    pub fn new(delays: Vec<Duration>) -> Self {
        Self { delays }
    }

    pub fn from_millis(delays_ms: &[u64]) -> Self {
        Self::new(delays_ms.iter().map(|ms| Duration::from_millis(*ms)).collect())
    }

    /// Single attempt, no retries and no wait.
    pub fn no_retry() -> Self {
        Self::new(Vec::new())
    }

    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }

    /// Maximum number of calls made before giving up.
    pub fn max_attempts(&self) -> usize {
        self.delays.len().max(1)
    }

    /// Time spent waiting when every attempt fails.
    pub fn total_delay(&self) -> Duration {
        self.delays.iter().sum()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_millis(&DEFAULT_DELAYS_MS)
    }
}

/// Suspends the retry loop between attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real sleeper backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Why a retried operation gave up.
#[derive(Debug)]
pub enum RetryError {
    /// Every attempt failed; holds the attempt count and the last error.
    Exhausted {
        attempts: usize,
        last_error: anyhow::Error,
    },
    /// The cancellation token fired.
    Cancelled,
}

/// Execute `f` until it succeeds, the schedule runs out, or `cancel` fires.
pub async fn with_retry<F, Fut, T>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    cancel: &CancellationToken,
    f: F,
) -> std::result::Result<T, RetryError>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts();
    let mut attempt = 0;

    loop {
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RetryError::Cancelled),
            outcome = f() => outcome,
        };
        attempt += 1;

        let error = match outcome {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        let exhausted = attempt >= max_attempts;
        if let Some(delay) = policy.delays().get(attempt - 1).copied() {
            if exhausted {
                tracing::warn!(
                    "Request failed (attempt {}/{}), giving up after {:?}: {}",
                    attempt,
                    max_attempts,
                    delay,
                    error
                );
            } else {
                tracing::warn!(
                    "Request failed (attempt {}/{}), retrying in {:?}: {}",
                    attempt,
                    max_attempts,
                    delay,
                    error
                );
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(RetryError::Cancelled),
                _ = sleeper.sleep(delay) => {}
            }
        }

        if exhausted {
            return Err(RetryError::Exhausted {
                attempts: attempt,
                last_error: error,
            });
        }
    }
}
