//! 플로우 중복 제거 리듀서
//!
//! 로그 스토어는 reporter(src/dst)와 action별로 플로우를 따로 집계하지만
//! 컴플라이언스 리포트는 그 구분이 필요 없습니다. [`FlowDeduplicator`]는
//! (소스 엔드포인트, 목적지 엔드포인트, 프로토콜) 조합을 한 번만 내보냅니다.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use logvault_core::metrics::COMPLIANCE_FLOWS_DEDUPLICATED_TOTAL;
use logvault_core::query::{QueryParams, TimeRange};
use logvault_core::resources::{
    Endpoint, EndpointType, L3Flow, L3FlowParams, MatchType, NamespaceMatch,
};
use serde::{Deserialize, Serialize};
use tracing::error;

/// 컴플라이언스 조회 기본 페이지 크기
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// 엔드포인트 종류 이름
pub const KIND_HOST_ENDPOINT: &str = "HostEndpoint";
pub const KIND_POD: &str = "Pod";
pub const KIND_GLOBAL_NETWORK_SET: &str = "GlobalNetworkSet";
pub const KIND_FLOW_PUBLIC: &str = "FlowPublic";
pub const KIND_FLOW_PRIVATE: &str = "FlowPrivate";

/// 외부 네트워크 엔드포인트의 집계 이름
const NETWORK_PUBLIC: &str = "pub";
const NETWORK_PRIVATE: &str = "pvt";

/// 리포트에 기록되는 플로우 엔드포인트
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowEndpoint {
    pub kind: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    /// `name`이 개별 이름이 아니라 집계 접두사인지 여부
    #[serde(default)]
    pub name_is_aggregation_prefix: bool,
}

impl FlowEndpoint {
    /// 스토어의 엔드포인트를 리포트 표현으로 변환합니다.
    pub fn from_endpoint(ep: &Endpoint) -> Self {
        let (name, aggregated) = endpoint_name(&ep.name, &ep.aggregated_name);
        Self {
            kind: endpoint_kind(ep.kind, name).to_owned(),
            name: name.to_owned(),
            namespace: ep.namespace.clone(),
            name_is_aggregation_prefix: aggregated,
        }
    }
}

/// 중복 제거 단위가 되는 리포트 플로우
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EndpointsReportFlow {
    pub source: FlowEndpoint,
    pub destination: FlowEndpoint,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub protocol: String,
}

impl From<&L3Flow> for EndpointsReportFlow {
    fn from(flow: &L3Flow) -> Self {
        Self {
            source: FlowEndpoint::from_endpoint(&flow.key.source),
            destination: FlowEndpoint::from_endpoint(&flow.key.destination),
            protocol: flow.key.protocol.clone(),
        }
    }
}

/// `""`/`"-"` 이름은 집계 이름으로 대체하고 집계 여부를 함께 반환합니다.
pub fn endpoint_name<'a>(name: &'a str, aggregated_name: &'a str) -> (&'a str, bool) {
    if name.is_empty() || name == "-" {
        (aggregated_name, true)
    } else {
        (name, false)
    }
}

/// 엔드포인트 종류를 리포트 kind 이름으로 매핑합니다.
///
/// 알 수 없는 조합은 에러 로그를 남기고 빈 문자열을 반환합니다.
pub fn endpoint_kind(kind: EndpointType, name: &str) -> &'static str {
    match kind {
        EndpointType::Hep => KIND_HOST_ENDPOINT,
        EndpointType::Wep => KIND_POD,
        EndpointType::Ns => KIND_GLOBAL_NETWORK_SET,
        EndpointType::Net => match name {
            NETWORK_PUBLIC => KIND_FLOW_PUBLIC,
            NETWORK_PRIVATE => KIND_FLOW_PRIVATE,
            _ => {
                error!(endpoint_type = ?kind, name, "unknown network endpoint name");
                ""
            }
        },
        EndpointType::Unknown => {
            error!(endpoint_type = ?kind, name, "unknown endpoint type");
            ""
        }
    }
}

/// 이미 내보낸 플로우를 기억하여 이후의 중복을 걸러냅니다.
///
/// 상태는 한 번의 조회(스트림) 동안만 유지되며 페이지 경계를 넘어 공유됩니다.
#[derive(Debug, Default)]
pub struct FlowDeduplicator {
    sent: HashSet<EndpointsReportFlow>,
    duplicates: u64,
}

impl FlowDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 처음 보는 플로우면 `Some`, 이미 내보낸 플로우면 `None`을 반환합니다.
    pub fn push(&mut self, flow: &L3Flow) -> Option<EndpointsReportFlow> {
        let report = EndpointsReportFlow::from(flow);
        if self.sent.contains(&report) {
            self.duplicates += 1;
            metrics::counter!(COMPLIANCE_FLOWS_DEDUPLICATED_TOTAL).increment(1);
            return None;
        }
        self.sent.insert(report.clone());
        Some(report)
    }

    /// 한 페이지를 처리하여 새 플로우만 순서대로 반환합니다.
    pub fn push_page<'a>(
        &mut self,
        flows: impl IntoIterator<Item = &'a L3Flow>,
    ) -> Vec<EndpointsReportFlow> {
        flows.into_iter().filter_map(|f| self.push(f)).collect()
    }

    /// 지금까지 내보낸 고유 플로우 수
    pub fn unique(&self) -> usize {
        self.sent.len()
    }

    /// 걸러낸 중복 수
    pub fn duplicates(&self) -> u64 {
        self.duplicates
    }
}

/// 시작/종료 시각 중 하나라도 있으면 시간 범위를 만듭니다.
///
/// 시작이 없으면 epoch, 종료가 없으면 현재 시각을 사용합니다.
pub fn time_range(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Option<TimeRange> {
    if start.is_none() && end.is_none() {
        return None;
    }
    Some(TimeRange::new(
        start.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
        end.unwrap_or_else(Utc::now),
    ))
}

/// 네임스페이스(소스/목적지 무관)와 시간 범위로 플로우 조회 조건을 만듭니다.
pub fn build_flow_query(
    namespaces: &[String],
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> L3FlowParams {
    let mut query = QueryParams::new().with_max_page_size(DEFAULT_PAGE_SIZE);
    query.time_range = time_range(start, end);

    let mut params = L3FlowParams {
        query,
        namespace_matches: Vec::new(),
    };
    if !namespaces.is_empty() {
        params.namespace_matches.push(NamespaceMatch {
            kind: MatchType::Any,
            namespaces: namespaces.to_vec(),
        });
    }
    params
}
