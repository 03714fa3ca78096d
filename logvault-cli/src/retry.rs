//! Caller-level retry for whole queries.
//!
//! The client and pager never retry; the CLI re-runs a complete query with a
//! fixed delay when the failure looks transient.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::CliError;

/// Fixed-delay retry policy.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    retries: u32,
    delay: Duration,
}

impl RetryPolicy {
    pub fn new(retries: u32, delay: Duration) -> Self {
        Self { retries, delay }
    }

    /// No retries.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Runs `op` until it succeeds, fails with a non-retryable error, or the
    /// retry budget is spent. Cancellation during the delay ends the loop
    /// with [`CliError::Interrupted`].
    pub async fn run<T, F, Fut>(&self, cancel: &CancellationToken, mut op: F) -> Result<T, CliError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CliError>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.retries && e.is_retryable() => {
                    attempt += 1;
                    warn!(
                        attempt,
                        max_retries = self.retries,
                        delay_ms = u64::try_from(self.delay.as_millis()).unwrap_or(u64::MAX),
                        error = %e,
                        "retrying query"
                    );
                    tokio::select! {
                        _ = cancel.cancelled() => return Err(CliError::Interrupted),
                        _ = tokio::time::sleep(self.delay) => {}
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use logvault_client::ClientError;

    fn transient() -> CliError {
        CliError::Client(ClientError::Transport {
            path: "/api/v1/events".to_owned(),
            reason: "connection reset".to_owned(),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn retries_transient_errors_until_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(3, Duration::from_millis(200));
        let cancel = CancellationToken::new();

        let counter = Arc::clone(&calls);
        let result = policy
            .run(&cancel, || {
                let counter = Arc::clone(&counter);
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(transient())
                    } else {
                        Ok("done")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_budget() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(2, Duration::from_millis(50));
        let cancel = CancellationToken::new();

        let counter = Arc::clone(&calls);
        let result: Result<(), _> = policy
            .run(&cancel, || {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(transient())
                }
            })
            .await;

        assert!(result.unwrap_err().is_retryable());
        // initial attempt + 2 retries
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_errors_are_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(5, Duration::from_millis(1));
        let cancel = CancellationToken::new();

        let counter = Arc::clone(&calls);
        let result: Result<(), _> = policy
            .run(&cancel, || {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(CliError::Client(ClientError::Api {
                        status: 400,
                        message: "bad selector".to_owned(),
                    }))
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancellation_during_delay_interrupts() {
        let policy = RetryPolicy::new(3, Duration::from_secs(3600));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result: Result<(), _> = policy.run(&cancel, || async { Err(transient()) }).await;
        assert!(matches!(result, Err(CliError::Interrupted)));
    }

    #[tokio::test]
    async fn none_policy_runs_once() {
        let cancel = CancellationToken::new();
        let result: Result<(), _> = RetryPolicy::none()
            .run(&cancel, || async { Err(transient()) })
            .await;
        assert!(result.unwrap_err().is_retryable());
    }
}
