//! L3 플로우 -- 소스/목적지 엔드포인트 쌍 단위로 집계된 플로우 레코드

use serde::{Deserialize, Serialize};

use crate::impl_list_params;
use crate::query::QueryParams;

/// 엔드포인트 종류
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointType {
    /// 워크로드 엔드포인트 (Pod)
    Wep,
    /// 호스트 엔드포인트
    Hep,
    /// 네트워크 셋
    Ns,
    /// 외부 네트워크 (`pub` / `pvt`)
    Net,
    #[default]
    #[serde(other)]
    Unknown,
}

/// 플로우의 한쪽 엔드포인트
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoint {
    #[serde(rename = "type")]
    pub kind: EndpointType,
    pub name: String,
    pub aggregated_name: String,
    pub namespace: String,
    pub port: i64,
}

/// 플로우 집계 키
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct L3FlowKey {
    pub action: String,
    pub reporter: String,
    pub protocol: String,
    pub source: Endpoint,
    pub destination: Endpoint,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogStats {
    pub log_count: i64,
    pub flow_log_count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrafficStats {
    pub bytes_in: i64,
    pub bytes_out: i64,
    pub packets_in: i64,
    pub packets_out: i64,
}

/// L3 플로우 레코드
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct L3Flow {
    pub key: L3FlowKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_stats: Option<LogStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traffic_stats: Option<TrafficStats>,
}

/// 네임스페이스 매칭 방향
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    #[default]
    Any,
    Source,
    Destination,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceMatch {
    #[serde(rename = "type")]
    pub kind: MatchType,
    pub namespaces: Vec<String>,
}

/// L3 플로우 조회 파라미터
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct L3FlowParams {
    #[serde(flatten)]
    pub query: QueryParams,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub namespace_matches: Vec<NamespaceMatch>,
}

impl_list_params!(L3FlowParams);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_endpoint_type_decodes_to_unknown() {
        let ep: Endpoint = serde_json::from_value(json!({"type": "svc", "name": "x"})).unwrap();
        assert_eq!(ep.kind, EndpointType::Unknown);
    }

    #[test]
    fn flow_params_flatten_query_fields() {
        let params = L3FlowParams {
            query: QueryParams::new().with_max_page_size(100),
            namespace_matches: vec![NamespaceMatch {
                kind: MatchType::Any,
                namespaces: vec!["default".to_owned()],
            }],
        };
        let encoded = serde_json::to_value(&params).unwrap();
        assert_eq!(
            encoded,
            json!({
                "max_page_size": 100,
                "namespace_matches": [{"type": "any", "namespaces": ["default"]}]
            })
        );
    }
}
