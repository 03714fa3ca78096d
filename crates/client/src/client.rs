//! Top-level client facade.
//!
//! [`Client`] owns one shared transport and hands out cluster-scoped
//! [`ResourceClient`]s for each resource kind.

use std::sync::Arc;

use logvault_core::config::ClientConfig;

use crate::error::ClientError;
use crate::http::{HttpRestClient, RestConfig};
use crate::resource::kinds::{
    AuditLogs, BenchmarkSets, DnsLogs, DomainNameSetFeeds, Events, FlowLogs, IpSetFeeds, L3Flows,
    Reports, Snapshots, WafLogs,
};
use crate::resource::{Resource, ResourceClient};
use crate::rest::RestInterface;

/// Entry point for talking to the log store.
pub struct Client<C = HttpRestClient> {
    rest: Arc<C>,
}

impl<C> Clone for Client<C> {
    fn clone(&self) -> Self {
        Self {
            rest: Arc::clone(&self.rest),
        }
    }
}

impl Client<HttpRestClient> {
    /// Builds an HTTPS client from the `[client]` config section.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        let rest = HttpRestClient::new(RestConfig::from(config))?;
        Ok(Self::new(rest))
    }
}

impl<C: RestInterface> Client<C> {
    pub fn new(rest: C) -> Self {
        Self {
            rest: Arc::new(rest),
        }
    }

    /// Wraps an already shared transport (tests keep a handle to inspect it).
    pub fn with_shared(rest: Arc<C>) -> Self {
        Self { rest }
    }

    pub fn rest(&self) -> &Arc<C> {
        &self.rest
    }

    /// Generic accessor for any resource kind.
    pub fn resource<K: Resource>(&self, cluster: &str) -> ResourceClient<K, C> {
        ResourceClient::new(Arc::clone(&self.rest), cluster)
    }

    pub fn l3_flows(&self, cluster: &str) -> ResourceClient<L3Flows, C> {
        self.resource(cluster)
    }

    pub fn flow_logs(&self, cluster: &str) -> ResourceClient<FlowLogs, C> {
        self.resource(cluster)
    }

    pub fn dns_logs(&self, cluster: &str) -> ResourceClient<DnsLogs, C> {
        self.resource(cluster)
    }

    pub fn waf_logs(&self, cluster: &str) -> ResourceClient<WafLogs, C> {
        self.resource(cluster)
    }

    pub fn audit_logs(&self, cluster: &str) -> ResourceClient<AuditLogs, C> {
        self.resource(cluster)
    }

    pub fn events(&self, cluster: &str) -> ResourceClient<Events, C> {
        self.resource(cluster)
    }

    pub fn compliance(&self, cluster: &str) -> ComplianceClients<C> {
        ComplianceClients {
            benchmarks: self.resource(cluster),
            report_data: self.resource(cluster),
            snapshots: self.resource(cluster),
        }
    }

    pub fn threat_feeds(&self, cluster: &str) -> ThreatFeedClients<C> {
        ThreatFeedClients {
            ip_set: self.resource(cluster),
            domain_name_set: self.resource(cluster),
        }
    }
}

/// Compliance resources for one cluster.
pub struct ComplianceClients<C> {
    pub benchmarks: ResourceClient<BenchmarkSets, C>,
    pub report_data: ResourceClient<Reports, C>,
    pub snapshots: ResourceClient<Snapshots, C>,
}

impl<C> Clone for ComplianceClients<C> {
    fn clone(&self) -> Self {
        Self {
            benchmarks: self.benchmarks.clone(),
            report_data: self.report_data.clone(),
            snapshots: self.snapshots.clone(),
        }
    }
}

/// Threat feed resources for one cluster.
pub struct ThreatFeedClients<C> {
    pub ip_set: ResourceClient<IpSetFeeds, C>,
    pub domain_name_set: ResourceClient<DomainNameSetFeeds, C>,
}
