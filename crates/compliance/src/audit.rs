//! 감사 이벤트 조회 조건
//!
//! 컴플라이언스 리포트는 설정 변경 이벤트만 필요하므로 정보가 가장 많은
//! `ResponseComplete` 단계와 설정 변경 동사(create/update/patch/delete)로 한정합니다.

use chrono::{DateTime, Utc};
use logvault_core::resources::{AuditLogParams, AuditLogType, ObjectReference};
use serde::{Deserialize, Serialize};

use crate::flows::{DEFAULT_PAGE_SIZE, time_range};

/// 조회 대상 감사 단계
pub const STAGE_RESPONSE_COMPLETE: &str = "ResponseComplete";

/// 설정 변경으로 간주하는 동사
pub const CONFIGURATION_VERBS: [&str; 4] = ["create", "update", "patch", "delete"];

/// 감사 이벤트 대상 리소스 선택
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEventsSelection {
    #[serde(default)]
    pub resources: Vec<ObjectReference>,
}

pub fn build_audit_query(
    filter: Option<&AuditEventsSelection>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> AuditLogParams {
    let mut params = AuditLogParams {
        kind: AuditLogType::Any,
        stages: vec![STAGE_RESPONSE_COMPLETE.to_owned()],
        verbs: CONFIGURATION_VERBS.iter().map(|v| (*v).to_owned()).collect(),
        ..AuditLogParams::default()
    };
    params.query.max_page_size = DEFAULT_PAGE_SIZE;
    params.query.time_range = time_range(start, end);
    if let Some(filter) = filter {
        params.object_refs = filter.resources.clone();
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn unfiltered_query_limits_stage_and_verbs() {
        let params = build_audit_query(None, None, None);
        assert_eq!(params.stages, vec!["ResponseComplete"]);
        assert_eq!(params.verbs, vec!["create", "update", "patch", "delete"]);
        assert!(params.object_refs.is_empty());
        assert!(params.query.time_range.is_none());
        assert_eq!(params.query.max_page_size, 100);
    }

    #[test]
    fn filter_resources_become_object_refs() {
        let filter = AuditEventsSelection {
            resources: vec![ObjectReference {
                resource: "networkpolicies".to_owned(),
                namespace: "default".to_owned(),
                ..ObjectReference::default()
            }],
        };
        let end = Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap();
        let params = build_audit_query(Some(&filter), None, Some(end));
        assert_eq!(params.object_refs[0].resource, "networkpolicies");
        let range = params.query.time_range.unwrap();
        assert_eq!(range.to, end);
        assert_eq!(range.from, DateTime::<Utc>::UNIX_EPOCH);
    }
}
