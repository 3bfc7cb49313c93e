//! Bounded retry with backoff, shared by every collaborator.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{ClientError, ClientResult};

/// How the delay grows between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Same delay before every retry.
    Fixed,
    /// `base_delay * attempt` before retry number `attempt`.
    Linear,
}

/// Retry policy: how many attempts and how long to wait between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one (at least 1).
    pub max_attempts: u32,

    /// Delay unit.
    pub base_delay: Duration,

    /// Growth strategy.
    pub backoff: Backoff,
}

impl RetryPolicy {
    /// Fixed delay between attempts.
    #[must_use]
    pub const fn fixed(max_attempts: u32, base_delay: Duration) -> Self {
        Self { max_attempts, base_delay, backoff: Backoff::Fixed }
    }

    /// Linearly increasing delay between attempts.
    #[must_use]
    pub const fn linear(max_attempts: u32, base_delay: Duration) -> Self {
        Self { max_attempts, base_delay, backoff: Backoff::Linear }
    }

    /// Same policy with all delays removed (tests).
    #[must_use]
    pub const fn without_delay(self) -> Self {
        Self { base_delay: Duration::ZERO, ..self }
    }

    /// Delay to wait after the given failed attempt (1-based).
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.base_delay,
            Backoff::Linear => self.base_delay.saturating_mul(attempt),
        }
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or
    /// the attempts are used up.
    pub async fn run<T, F, Fut>(&self, label: &str, op: F) -> ClientResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ClientResult<T>>,
    {
        self.run_if(label, ClientError::is_retryable, op).await
    }

    /// Like [`run`](Self::run) with a caller-supplied retry predicate.
    pub async fn run_if<T, F, Fut, P>(&self, label: &str, should_retry: P, mut op: F) -> ClientResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ClientResult<T>>,
        P: Fn(&ClientError) -> bool,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < max_attempts && should_retry(&err) => {
                    let delay = self.delay_after(attempt);
                    warn!(
                        label,
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    debug!(label, attempt, error = %err, "giving up");
                    return Err(err);
                }
            }
        }
    }
}
