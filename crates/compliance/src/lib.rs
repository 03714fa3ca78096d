//! # logvault-compliance
//!
//! Compliance reporting on top of the log store client: stream reducers over
//! paged queries plus single-record lookups and writes.
//!
//! # Module Structure
//!
//! - [`error`]: Domain error type (`StoreError`)
//! - [`flows`]: Flow deduplication (`FlowDeduplicator`, `EndpointsReportFlow`)
//! - [`benchmarks`]: Latest benchmark per node with success precedence (`LatestBenchmarks`)
//! - [`reports`]: Offset-emulated report pagination (`ReportQuery`, `ArchivedReportSummaries`)
//! - [`audit`]: Configuration-change audit query (`AuditEventsSelection`)
//! - [`store`]: Cluster-scoped operations (`ComplianceStore`)

pub mod audit;
pub mod benchmarks;
pub mod error;
pub mod flows;
pub mod reports;
pub mod store;

// --- Public API Re-exports ---

pub use error::StoreError;
pub use store::{ComplianceStore, STREAM_CAPACITY, StoreStream};

pub use audit::AuditEventsSelection;
pub use benchmarks::LatestBenchmarks;
pub use flows::{EndpointsReportFlow, FlowDeduplicator, FlowEndpoint};
pub use reports::{ArchivedReportSummaries, ReportQuery, ReportSortBy, ReportTypeAndName};
