//! Bounded exponential backoff for transport failures

use crate::error::{ActfetchError, ActfetchResult};
use std::future::Future;
use std::time::{Duration, Instant};
use tokio_retry::RetryIf;
use tracing::warn;

/// How often and how long to retry a transient failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Wait before the second attempt; doubles after each failure
    pub initial_interval: Duration,
    /// Cap for a single wait
    pub max_interval: Duration,
    /// No new attempt is started once this much time has passed
    pub max_elapsed: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_interval: Duration::from_secs(1),
            max_interval: Duration::from_secs(5),
            max_elapsed: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// A single attempt, no waiting
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Waits between consecutive attempts
    pub fn delays(&self) -> impl Iterator<Item = Duration> {
        let max_interval = self.max_interval;
        let mut next = self.initial_interval;
        std::iter::repeat_with(move || {
            let delay = next.min(max_interval);
            next = next.saturating_mul(2);
            delay
        })
        .take(self.max_attempts.saturating_sub(1) as usize)
    }
}

/// Run `op` until it succeeds, fails with a non-retryable error, or the
/// policy is exhausted. The last error is returned.
pub async fn retry_transient<F, Fut, T>(policy: &RetryPolicy, op: F) -> ActfetchResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ActfetchResult<T>>,
{
    let started = Instant::now();
    let max_elapsed = policy.max_elapsed;
    let mut failures = 0u32;

    RetryIf::start(policy.delays(), op, |err: &ActfetchError| {
        failures += 1;
        let retry = err.is_retryable() && started.elapsed() < max_elapsed;
        if retry {
            warn!("attempt {} failed, retrying: {}", failures, err);
        }
        retry
    })
    .await
}
