//! # logvault-client
//!
//! Typed client for the multi-tenant log store.
//!
//! - [`rest`]: request builder, transport trait and reply classification
//! - [`http`]: HTTPS transport (`reqwest`, optional mutual TLS, tenant header)
//! - [`resource`]: one generic list/bulk client per resource kind
//! - [`pager`]: cursor-following, cancellable, backpressured page stream
//! - [`bulk`]: NDJSON bodies for bulk create/delete
//! - `mock`: canned-reply transport for tests (`mock` feature)
//!
//! Typical use:
//!
//! ```ignore
//! let client = Client::from_config(&config.client)?;
//! let cancel = CancellationToken::new();
//! let mut pages = ListPager::new(QueryParams::new().with_max_page_size(100))
//!     .stream(&cancel, client.dns_logs("cluster-a"));
//! while let Some(page) = pages.next().await {
//!     for log in page?.items { /* ... */ }
//! }
//! ```

pub mod bulk;
pub mod client;
pub mod error;
pub mod http;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod pager;
pub mod resource;
pub mod rest;

pub use client::{Client, ComplianceClients, ThreatFeedClients};
pub use error::ClientError;
pub use http::{HttpRestClient, RestConfig, TokenSource};
pub use pager::{ListPager, PageEvent, PageStream};
pub use resource::{BulkResource, Lister, Resource, ResourceClient, kinds, list_fn};
pub use rest::{RawResponse, Request, RestInterface};

pub use tokio_util::sync::CancellationToken;
