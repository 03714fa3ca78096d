//! 로그 스토어 리소스 타입 -- 각 로그/이벤트 종류의 레코드와 조회 파라미터
//!
//! 레코드는 이 코어가 실제로 사용하는 필드만 타입으로 정의하고,
//! 나머지 필드는 `extra`에 그대로 보존하여 재전송 시 손실이 없도록 합니다.

pub mod benchmarks;
pub mod flows;
pub mod logs;
pub mod reports;
pub mod snapshots;
pub mod threatfeeds;

pub use benchmarks::{BenchmarkTest, BenchmarkType, Benchmarks, BenchmarksFilter, BenchmarksParams};
pub use flows::{
    Endpoint, EndpointType, L3Flow, L3FlowKey, L3FlowParams, LogStats, MatchType,
    NamespaceMatch, TrafficStats,
};
pub use logs::{
    AuditLog, AuditLogParams, AuditLogType, DnsLog, Event, FlowLog, ObjectReference, WafLog,
};
pub use reports::{ReportData, ReportDataParams, ReportMatch};
pub use snapshots::{ResourceList, Snapshot, SnapshotParams, TypeMeta};
pub use threatfeeds::{
    DomainNameSetData, DomainNameSetThreatFeed, IpSetData, IpSetThreatFeed, ThreatFeedParams,
};
