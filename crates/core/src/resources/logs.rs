//! 원시 로그/이벤트 레코드 -- 감사 로그, 보안 이벤트, DNS/WAF/플로우 로그
//!
//! 대부분의 필드는 스토어 스키마를 따르며, 타입으로 정의하지 않은 필드는
//! `extra`에 보존됩니다. 조회 파라미터가 공통 쿼리만 필요한 리소스는
//! [`QueryParams`](crate::query::QueryParams)를 그대로 사용합니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::impl_list_params;
use crate::query::QueryParams;

/// Kubernetes 감사 이벤트의 객체 참조
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObjectReference {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub resource: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_group: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_version: String,
}

/// 감사 로그 레코드
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuditLog {
    #[serde(rename = "auditID")]
    pub audit_id: String,
    pub stage: String,
    pub verb: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_ref: Option<ObjectReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_received_timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage_timestamp: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 감사 로그 종류
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditLogType {
    #[default]
    Any,
    Ee,
    Kube,
}

/// 감사 로그 조회 파라미터
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditLogParams {
    #[serde(flatten)]
    pub query: QueryParams,
    #[serde(rename = "type", default)]
    pub kind: AuditLogType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stages: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub verbs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub object_refs: Vec<ObjectReference>,
}

impl_list_params!(AuditLogParams);

/// 보안 이벤트
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Event {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub time: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub severity: i64,
    pub origin: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub source_namespace: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub source_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub dest_namespace: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub dest_name: String,
    pub dismissed: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// DNS 로그
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DnsLog {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub client_name: String,
    pub client_namespace: String,
    pub qname: String,
    pub qtype: String,
    pub rcode: String,
    pub count: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// WAF 로그
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WafLog {
    #[serde(rename = "@timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
    pub level: String,
    pub msg: String,
    pub request_id: String,
    pub host: String,
    pub path: String,
    pub method: String,
    pub protocol: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 원시 플로우 로그
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowLog {
    pub start_time: i64,
    pub end_time: i64,
    pub source_name_aggr: String,
    pub source_namespace: String,
    pub dest_name_aggr: String,
    pub dest_namespace: String,
    pub dest_port: Option<i64>,
    pub proto: String,
    pub action: String,
    pub reporter: String,
    pub bytes_in: i64,
    pub bytes_out: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
