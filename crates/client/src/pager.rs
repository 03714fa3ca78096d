//! Cursor pager: turns a paged list endpoint into a bounded, cancellable,
//! backpressured stream of pages.
//!
//! A spawned producer calls the [`Lister`] with the current cursor, publishes
//! each page through a single-slot channel and follows `after_key` until the
//! store reports no more data, the result cap is reached, or the caller
//! cancels. Memory stays at roughly one page regardless of the result size.
//!
//! The consumer sees one stream of events: zero or more `Ok(page)` followed by
//! at most one `Err(error)`, then the end of the stream. The pager never
//! retries; a failed list call terminates the stream.
//!
//! # Examples
//!
//! ```ignore
//! let cancel = CancellationToken::new();
//! let mut pages = ListPager::new(params)
//!     .with_max_results(500)
//!     .stream(&cancel, client.l3_flows("cluster-a"));
//! while let Some(event) = pages.next().await {
//!     let page = event?;
//!     // ...
//! }
//! ```

use std::future::{Future, poll_fn};
use std::pin::Pin;
use std::task::{Context, Poll};

use logvault_core::metrics::{PAGER_ERRORS_TOTAL, PAGER_ITEMS_TOTAL, PAGER_PAGES_TOTAL};
use logvault_core::page::Page;
use logvault_core::query::{AfterKey, ListParams};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::Stream;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, warn};

use crate::error::ClientError;
use crate::resource::Lister;

/// One event of a page stream.
pub type PageEvent<T> = Result<Page<T>, ClientError>;

/// Pager configuration for one query.
#[derive(Debug, Clone)]
pub struct ListPager<P> {
    params: P,
    max_results: usize,
}

impl<P: ListParams> ListPager<P> {
    /// Creates a pager over `params`. The caller's cursor, if any, is the
    /// starting point.
    pub fn new(params: P) -> Self {
        Self {
            params,
            max_results: 0,
        }
    }

    /// Caps the total number of items delivered. `0` disables the cap.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// Starts the producer and returns the consumer side.
    ///
    /// Cancelling `cancel` (or dropping the returned stream) stops the
    /// producer at its next suspension point.
    pub fn stream<T, L>(self, cancel: &CancellationToken, lister: L) -> PageStream<T>
    where
        T: Send + 'static,
        L: Lister<P, T>,
    {
        let (tx, rx) = mpsc::channel(1);
        let token = cancel.child_token();
        let handle = tokio::spawn(produce(self, lister, tx, token.clone()));
        PageStream {
            rx,
            handle: Some(handle),
            guard: Some(token.drop_guard()),
        }
    }
}

/// Producer-owned state of one stream invocation.
struct StreamState {
    after_key: Option<AfterKey>,
    consumed: usize,
    pages: usize,
}

impl StreamState {
    /// Items still allowed under the cap, or `None` when uncapped.
    fn remaining(&self, max_results: usize) -> Option<usize> {
        (max_results > 0).then(|| max_results.saturating_sub(self.consumed))
    }
}

async fn produce<P, T, L>(
    pager: ListPager<P>,
    lister: L,
    tx: mpsc::Sender<PageEvent<T>>,
    cancel: CancellationToken,
) where
    P: ListParams,
    T: Send + 'static,
    L: Lister<P, T>,
{
    let ListPager {
        params,
        max_results,
    } = pager;
    let mut state = StreamState {
        after_key: params.query().after_key.clone(),
        consumed: 0,
        pages: 0,
    };

    loop {
        let mut request = params.clone();
        request.set_after_key(state.after_key.take());

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(pages = state.pages, "pager cancelled during list call");
                return;
            }
            result = lister.list(request) => result,
        };

        let mut page = match result {
            Ok(page) => page,
            Err(e) => {
                metrics::counter!(PAGER_ERRORS_TOTAL).increment(1);
                warn!(
                    error = %e,
                    pages = state.pages,
                    consumed = state.consumed,
                    "list call failed, ending page stream"
                );
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {}
                    _ = tx.send(Err(e)) => {}
                }
                return;
            }
        };

        let truncated = state
            .remaining(max_results)
            .is_some_and(|remaining| page.truncate(remaining));
        state.consumed += page.len();
        state.pages += 1;
        let next = page.after_key.clone();

        metrics::counter!(PAGER_PAGES_TOTAL).increment(1);
        metrics::counter!(PAGER_ITEMS_TOTAL).increment(page.len() as u64);
        debug!(
            page = state.pages,
            items = page.len(),
            total_hits = page.total_hits,
            truncated,
            "page received"
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(pages = state.pages, "pager cancelled while publishing");
                return;
            }
            sent = tx.send(Ok(page)) => {
                if sent.is_err() {
                    debug!("page stream consumer went away");
                    return;
                }
            }
        }

        let budget_exhausted = state.remaining(max_results) == Some(0);
        match next {
            Some(key) if !truncated && !budget_exhausted => state.after_key = Some(key),
            _ => return,
        }
    }
}

/// Consumer side of a pager.
///
/// Yields `Ok(page)` events in request order, then at most one `Err`, then
/// `None`. Dropping the stream cancels the producer. A panic in the producer
/// is re-raised here once the stream closes.
pub struct PageStream<T> {
    rx: mpsc::Receiver<PageEvent<T>>,
    handle: Option<JoinHandle<()>>,
    guard: Option<DropGuard>,
}

impl<T> PageStream<T> {
    /// Waits for the next event. Returns `None` once the stream is done.
    pub async fn next(&mut self) -> Option<PageEvent<T>> {
        poll_fn(|cx| Pin::new(&mut *self).poll_next(cx)).await
    }

    /// Stops the producer and waits for it to exit.
    ///
    /// Undelivered pages are discarded.
    pub async fn finish(mut self) {
        drop(self.guard.take());
        self.rx.close();
        while self.next().await.is_some() {}
    }
}

impl<T> Stream for PageStream<T> {
    type Item = PageEvent<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match this.rx.poll_recv(cx) {
            Poll::Ready(None) => {}
            other => return other,
        }

        let Some(handle) = this.handle.as_mut() else {
            return Poll::Ready(None);
        };
        match Pin::new(handle).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(joined) => {
                this.handle = None;
                if let Err(e) = joined {
                    if e.is_panic() {
                        std::panic::resume_unwind(e.into_panic());
                    }
                }
                Poll::Ready(None)
            }
        }
    }
}
