//! 위협 피드 -- IP 셋 / 도메인 셋

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_list_params;
use crate::query::QueryParams;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpSetData {
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub ips: Vec<String>,
}

/// IP 셋 위협 피드
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpSetThreatFeed {
    pub id: String,
    pub data: IpSetData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainNameSetData {
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub domains: Vec<String>,
}

/// 도메인 셋 위협 피드
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainNameSetThreatFeed {
    pub id: String,
    pub data: DomainNameSetData,
}

/// 위협 피드 조회 파라미터
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThreatFeedParams {
    #[serde(flatten)]
    pub query: QueryParams,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
}

impl_list_params!(ThreatFeedParams);
