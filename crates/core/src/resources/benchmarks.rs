//! 벤치마크 -- 노드별 CIS 벤치마크 실행 결과

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_list_params;
use crate::query::QueryParams;

/// 벤치마크 종류
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BenchmarkType {
    #[default]
    #[serde(rename = "kube")]
    Kubernetes,
}

impl std::fmt::Display for BenchmarkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Kubernetes => f.write_str("kube"),
        }
    }
}

/// 개별 벤치마크 테스트 결과
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkTest {
    pub section: String,
    pub section_desc: String,
    pub test_number: String,
    pub test_desc: String,
    pub test_info: String,
    pub status: String,
    pub scored: bool,
}

/// 한 노드의 벤치마크 실행 결과 묶음
///
/// `error`가 비어 있지 않으면 실행이 실패한 레코드입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Benchmarks {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub kubernetes_version: String,
    #[serde(rename = "type", default)]
    pub kind: BenchmarkType,
    pub node_name: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
    #[serde(default)]
    pub tests: Vec<BenchmarkTest>,
}

impl Benchmarks {
    /// 실행이 성공한 레코드인지 여부
    pub fn succeeded(&self) -> bool {
        self.error.is_empty()
    }

    /// 저장소 식별자 (`<timestamp>::<type>::<node>`)
    pub fn uid(&self) -> String {
        if !self.id.is_empty() {
            return self.id.clone();
        }
        format!(
            "{}::{}::{}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.kind,
            self.node_name
        )
    }
}

/// 버전/노드 필터
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarksFilter {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub node_names: Vec<String>,
}

/// 벤치마크 조회 파라미터
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchmarksParams {
    #[serde(flatten)]
    pub query: QueryParams,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<BenchmarkType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<BenchmarksFilter>,
}

impl_list_params!(BenchmarksParams);

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Benchmarks {
        Benchmarks {
            id: String::new(),
            version: "1.6".to_owned(),
            kubernetes_version: "1.29".to_owned(),
            kind: BenchmarkType::Kubernetes,
            node_name: "node-a".to_owned(),
            timestamp: Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap(),
            error: String::new(),
            tests: Vec::new(),
        }
    }

    #[test]
    fn uid_is_derived_when_id_missing() {
        assert_eq!(sample().uid(), "2026-05-01T12:00:00Z::kube::node-a");
    }

    #[test]
    fn uid_prefers_stored_id() {
        let mut b = sample();
        b.id = "stored".to_owned();
        assert_eq!(b.uid(), "stored");
    }

    #[test]
    fn errored_record_is_not_succeeded() {
        let mut b = sample();
        b.error = "kube-bench exited 1".to_owned();
        assert!(!b.succeeded());
        let encoded = serde_json::to_value(&b).unwrap();
        assert_eq!(encoded["type"], "kube");
        assert_eq!(encoded["error"], "kube-bench exited 1");
    }
}
