//! Per-resource capability.
//!
//! Every log/event kind is a zero-sized marker implementing [`Resource`]; one
//! generic [`ResourceClient`] provides list, bulk create and bulk delete for
//! all of them. Kinds that accept writes also implement [`BulkResource`].

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use logvault_core::metrics::CLIENT_BULK_FAILED_ITEMS_TOTAL;
use logvault_core::page::{BulkResponse, Page};
use logvault_core::query::{ListParams, QueryParams};
use logvault_core::resources::{
    AuditLog, AuditLogParams, Benchmarks, BenchmarksParams, DnsLog, DomainNameSetThreatFeed,
    Event, FlowLog, IpSetThreatFeed, L3Flow, L3FlowParams, ReportData, ReportDataParams,
    Snapshot, SnapshotParams, ThreatFeedParams, WafLog,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::bulk::{self, DeleteRequest};
use crate::error::ClientError;
use crate::rest::{CONTENT_TYPE_NDJSON, Request, RestInterface};

/// A log/event kind served by the store.
pub trait Resource: Send + Sync + 'static {
    type Item: Serialize + DeserializeOwned + Send + Sync + 'static;
    type Params: ListParams + Default;

    /// Human-readable name used in logs.
    const NAME: &'static str;

    /// Path of the paged list endpoint, relative to `/api/v1`.
    const LIST_PATH: &'static str;
}

/// A resource that accepts bulk create/delete.
pub trait BulkResource: Resource {
    const BULK_PATH: &'static str;
}

/// Something that can fetch one page given parameters carrying the cursor.
///
/// The pager depends only on this capability, never on a concrete resource.
pub trait Lister<P, T>: Send + Sync + 'static {
    fn list(&self, params: P) -> impl Future<Output = Result<Page<T>, ClientError>> + Send;
}

/// Adapts an async closure into a [`Lister`].
pub struct FnLister<F>(F);

/// Wraps `f` so it can drive a pager.
pub fn list_fn<F>(f: F) -> FnLister<F> {
    FnLister(f)
}

impl<P, T, F, Fut> Lister<P, T> for FnLister<F>
where
    F: Fn(P) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Page<T>, ClientError>> + Send,
{
    fn list(&self, params: P) -> impl Future<Output = Result<Page<T>, ClientError>> + Send {
        (self.0)(params)
    }
}

/// Cluster-scoped client for one resource kind.
pub struct ResourceClient<K, C> {
    rest: Arc<C>,
    cluster: String,
    _kind: PhantomData<fn() -> K>,
}

impl<K, C> Clone for ResourceClient<K, C> {
    fn clone(&self) -> Self {
        Self {
            rest: Arc::clone(&self.rest),
            cluster: self.cluster.clone(),
            _kind: PhantomData,
        }
    }
}

impl<K: Resource, C: RestInterface> ResourceClient<K, C> {
    pub fn new(rest: Arc<C>, cluster: impl Into<String>) -> Self {
        Self {
            rest,
            cluster: cluster.into(),
            _kind: PhantomData,
        }
    }

    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    /// Fetches a single page.
    pub async fn list(&self, params: &K::Params) -> Result<Page<K::Item>, ClientError> {
        Request::post(K::LIST_PATH)
            .cluster(self.cluster.as_str())
            .params(params)
            .send(self.rest.as_ref())
            .await
    }
}

impl<K: BulkResource, C: RestInterface> ResourceClient<K, C> {
    /// Creates items in bulk.
    ///
    /// A response with `failed > 0` is returned as `Ok`; callers decide
    /// whether partial failure is acceptable.
    pub async fn create(&self, items: &[K::Item]) -> Result<BulkResponse, ClientError> {
        let body = bulk::encode(items)?;
        let resp: BulkResponse = Request::post(K::BULK_PATH)
            .cluster(self.cluster.as_str())
            .content_type(CONTENT_TYPE_NDJSON)
            .body(body)
            .send(self.rest.as_ref())
            .await?;
        record_bulk_failures(K::NAME, "create", &resp);
        Ok(resp)
    }

    /// Deletes items by id in bulk.
    pub async fn delete(&self, ids: &[&str]) -> Result<BulkResponse, ClientError> {
        let lines: Vec<DeleteRequest<'_>> = ids.iter().map(|id| DeleteRequest { id: *id }).collect();
        let body = bulk::encode(&lines)?;
        let resp: BulkResponse = Request::delete(K::BULK_PATH)
            .cluster(self.cluster.as_str())
            .content_type(CONTENT_TYPE_NDJSON)
            .body(body)
            .send(self.rest.as_ref())
            .await?;
        record_bulk_failures(K::NAME, "delete", &resp);
        Ok(resp)
    }
}

fn record_bulk_failures(resource: &'static str, operation: &'static str, resp: &BulkResponse) {
    if resp.failed > 0 {
        metrics::counter!(CLIENT_BULK_FAILED_ITEMS_TOTAL)
            .increment(u64::try_from(resp.failed).unwrap_or(0));
        warn!(
            resource,
            operation,
            total = resp.total,
            failed = resp.failed,
            "bulk request partially rejected"
        );
    }
}

impl<K: Resource, C: RestInterface> Lister<K::Params, K::Item> for ResourceClient<K, C> {
    fn list(
        &self,
        params: K::Params,
    ) -> impl Future<Output = Result<Page<K::Item>, ClientError>> + Send {
        let this = self.clone();
        async move { ResourceClient::list(&this, &params).await }
    }
}

macro_rules! resource {
    ($marker:ident, $item:ty, $params:ty, $name:literal, $list:literal) => {
        #[derive(Debug, Clone, Copy)]
        pub struct $marker;

        impl Resource for $marker {
            type Item = $item;
            type Params = $params;
            const NAME: &'static str = $name;
            const LIST_PATH: &'static str = $list;
        }
    };
    ($marker:ident, $item:ty, $params:ty, $name:literal, $list:literal, $bulk:literal) => {
        resource!($marker, $item, $params, $name, $list);

        impl BulkResource for $marker {
            const BULK_PATH: &'static str = $bulk;
        }
    };
}

/// Resource kind markers.
pub mod kinds {
    use super::*;

    resource!(L3Flows, L3Flow, L3FlowParams, "l3 flows", "/flows");
    resource!(FlowLogs, FlowLog, QueryParams, "flow logs", "/flows/logs", "/flows/logs/bulk");
    resource!(DnsLogs, DnsLog, QueryParams, "dns logs", "/dns/logs", "/dns/logs/bulk");
    resource!(WafLogs, WafLog, QueryParams, "waf logs", "/waf/logs", "/waf/logs/bulk");
    resource!(AuditLogs, AuditLog, AuditLogParams, "audit logs", "/audit/logs/ee", "/audit/logs/bulk");
    resource!(Events, Event, QueryParams, "events", "/events", "/events/bulk");
    resource!(
        BenchmarkSets,
        Benchmarks,
        BenchmarksParams,
        "benchmarks",
        "/compliance/benchmarks",
        "/compliance/benchmarks/bulk"
    );
    resource!(
        Reports,
        ReportData,
        ReportDataParams,
        "report data",
        "/compliance/reports",
        "/compliance/reports/bulk"
    );
    resource!(
        Snapshots,
        Snapshot,
        SnapshotParams,
        "snapshots",
        "/compliance/snapshots",
        "/compliance/snapshots/bulk"
    );
    resource!(
        IpSetFeeds,
        IpSetThreatFeed,
        ThreatFeedParams,
        "ip set threat feeds",
        "/threatfeeds/ipset",
        "/threatfeeds/ipset/bulk"
    );
    resource!(
        DomainNameSetFeeds,
        DomainNameSetThreatFeed,
        ThreatFeedParams,
        "domain set threat feeds",
        "/threatfeeds/domainnameset",
        "/threatfeeds/domainnameset/bulk"
    );
}
