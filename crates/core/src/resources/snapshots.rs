//! 리소스 목록 스냅샷 -- 특정 시점에 수집한 Kubernetes 리소스 목록

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::impl_list_params;
use crate::query::QueryParams;

/// 리소스 종류 식별자
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeMeta {
    pub kind: String,
    pub api_version: String,
}

impl std::fmt::Display for TypeMeta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.kind, self.api_version)
    }
}

/// 수집 시각이 기록된 리소스 목록
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceList {
    #[serde(flatten)]
    pub type_meta: TypeMeta,
    pub request_started_timestamp: DateTime<Utc>,
    pub request_completed_timestamp: DateTime<Utc>,
    #[serde(default)]
    pub items: Vec<Value>,
}

impl ResourceList {
    /// 스냅샷 식별자 (`<kind>(<apiVersion>)-<completed>`)
    pub fn id(&self) -> String {
        format!(
            "{}-{}",
            self.type_meta,
            self.request_completed_timestamp
                .to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }
}

/// 저장된 스냅샷
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub resource_list: ResourceList,
}

impl Snapshot {
    pub fn new(resource_list: ResourceList) -> Self {
        Self {
            id: resource_list.id(),
            resource_list,
        }
    }
}

/// 스냅샷 조회 파라미터
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotParams {
    #[serde(flatten)]
    pub query: QueryParams,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_match: Option<TypeMeta>,
}

impl_list_params!(SnapshotParams);

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn snapshot_id_derives_from_kind_and_completion_time() {
        let list = ResourceList {
            type_meta: TypeMeta {
                kind: "Pod".to_owned(),
                api_version: "v1".to_owned(),
            },
            request_started_timestamp: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            request_completed_timestamp: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 5).unwrap(),
            items: Vec::new(),
        };
        let snap = Snapshot::new(list);
        assert_eq!(snap.id, "Pod(v1)-2026-01-01T00:00:05Z");
        let encoded = serde_json::to_value(&snap).unwrap();
        assert_eq!(encoded["resource_list"]["kind"], "Pod");
        assert_eq!(encoded["resource_list"]["apiVersion"], "v1");
    }
}
