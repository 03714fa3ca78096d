//! Command handlers -- one module per subcommand

pub mod audit;
pub mod benchmarks;
pub mod config;
pub mod flows;
pub mod logs;
pub mod reports;
pub mod threatfeeds;

use logvault_client::{CancellationToken, Client, HttpRestClient};
use logvault_compliance::StoreStream;
use logvault_compliance::flows::time_range;
use logvault_core::config::QueryConfig;
use logvault_core::query::TimeRange;

use crate::cli::WindowArgs;
use crate::error::CliError;
use crate::retry::RetryPolicy;

/// Everything a query command needs besides its own arguments.
pub struct QueryContext<C = HttpRestClient> {
    pub client: Client<C>,
    pub defaults: QueryConfig,
    pub retry: RetryPolicy,
    pub cancel: CancellationToken,
}

impl<C> QueryContext<C> {
    pub fn new(client: Client<C>, defaults: QueryConfig) -> Self {
        Self {
            client,
            defaults,
            retry: RetryPolicy::none(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Fails with `Interrupted` once the user cancelled, so that a truncated
    /// result is never reported as complete.
    pub(crate) fn check_cancelled(&self) -> Result<(), CliError> {
        if self.cancel.is_cancelled() {
            return Err(CliError::Interrupted);
        }
        Ok(())
    }
}

/// Collects a store stream. An error is always the last element and is returned.
pub(crate) async fn drain<T>(mut rx: StoreStream<T>) -> Result<Vec<T>, CliError> {
    let mut out = Vec::new();
    while let Some(item) = rx.recv().await {
        out.push(item?);
    }
    Ok(out)
}

/// Store time range for a window. An open start means the epoch, an open end means now.
pub(crate) fn window_range(window: &WindowArgs) -> Option<TimeRange> {
    time_range(window.from, window.to)
}
