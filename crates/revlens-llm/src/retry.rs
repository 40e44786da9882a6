//! Bounded retry with linear back-off for remote generation calls.
//!
//! [`RequestExecutor::execute`] retries only [`FailureKind::Network`]
//! failures. Rate-limit and invalid-key failures are returned on the first
//! occurrence so the caller can rotate or drop the credential.

use std::future::Future;
use std::time::Duration;

use revlens_core::AppConfig;

use crate::classify::FailureKind;
use crate::error::{ExecuteError, LlmError};

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BACKOFF_BASE: Duration = Duration::from_millis(1_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total invocations allowed, including the first. Zero is treated as one.
    pub max_attempts: u32,
    /// Sleep before attempt `n + 1` is `backoff_base × n`.
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_base: DEFAULT_BACKOFF_BASE,
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_attempts: config.llm_max_attempts,
            backoff_base: Duration::from_millis(config.llm_retry_backoff_base_ms),
        }
    }

    /// Delay after the `completed`-th failed attempt.
    ///
    /// | Completed | Sleep (base = 1 000 ms) |
    /// |-----------|-------------------------|
    /// | 1         | 1 000 ms                |
    /// | 2         | 2 000 ms                |
    #[must_use]
    pub fn delay_after(&self, completed: u32) -> Duration {
        self.backoff_base.saturating_mul(completed)
    }

    fn effective_max_attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Runs fallible remote operations under a [`RetryPolicy`].
#[derive(Debug, Clone, Default)]
pub struct RequestExecutor {
    policy: RetryPolicy,
}

impl RequestExecutor {
    #[must_use]
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    #[must_use]
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Invoke `operation` until it succeeds, fails with a non-network
    /// classification, or the attempt budget is spent.
    ///
    /// No sleep follows the final attempt.
    ///
    /// # Errors
    ///
    /// Returns [`ExecuteError`] carrying the classification, the number of
    /// invocations made, and the last underlying [`LlmError`].
    pub async fn execute<T, F, Fut>(&self, mut operation: F) -> Result<T, ExecuteError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LlmError>>,
    {
        let max_attempts = self.policy.effective_max_attempts();
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let err = match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            let kind = err.failure_kind();
            if !kind.is_retriable() {
                tracing::debug!(attempt, kind = %kind, error = %err, "LLM call failed; not retriable");
                return Err(ExecuteError {
                    kind,
                    attempts: attempt,
                    source: err,
                });
            }
            if attempt >= max_attempts {
                tracing::warn!(attempt, max_attempts, error = %err, "LLM call failed; retries exhausted");
                return Err(ExecuteError {
                    kind: FailureKind::Network,
                    attempts: attempt,
                    source: err,
                });
            }

            let delay = self.policy.delay_after(attempt);
            tracing::warn!(
                attempt,
                max_attempts,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %err,
                "transient LLM error; retrying after back-off"
            );
            tokio::time::sleep(delay).await;
        }
    }
}
