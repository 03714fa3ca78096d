//! 컴플라이언스 리포트 아카이브

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::impl_list_params;
use crate::query::QueryParams;

/// 아카이브된 리포트 데이터
///
/// 요약/상세 본문은 해석하지 않고 JSON 값 그대로 보존합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub report_name: String,
    pub report_type_name: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub report_spec: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub report_type_spec: Value,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub endpoints_summary: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub namespaces_summary: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub services_summary: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub audit_summary: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub ui_summary: Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub endpoints: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub namespaces: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub audit_events: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flows: Vec<Value>,
}

impl ReportData {
    /// 저장소 식별자 (`<name>_<start>_<end>`)
    pub fn uid(&self) -> String {
        if !self.id.is_empty() {
            return self.id.clone();
        }
        format!(
            "{}_{}_{}",
            self.report_name,
            self.start_time.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.end_time.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }

    /// 목록 화면용 요약본을 만듭니다. 상세 레코드(엔드포인트, 플로우 등)는 제외됩니다.
    pub fn summary(&self) -> Self {
        Self {
            id: self.id.clone(),
            report_name: self.report_name.clone(),
            report_type_name: self.report_type_name.clone(),
            report_spec: self.report_spec.clone(),
            report_type_spec: self.report_type_spec.clone(),
            start_time: self.start_time,
            end_time: self.end_time,
            generation_time: self.generation_time,
            endpoints_summary: self.endpoints_summary.clone(),
            namespaces_summary: self.namespaces_summary.clone(),
            services_summary: self.services_summary.clone(),
            audit_summary: self.audit_summary.clone(),
            ui_summary: self.ui_summary.clone(),
            endpoints: Vec::new(),
            namespaces: Vec::new(),
            services: Vec::new(),
            audit_events: Vec::new(),
            flows: Vec::new(),
        }
    }
}

/// 리포트 이름/종류 매칭 조건
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMatch {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub report_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub report_type_name: String,
}

/// 리포트 조회 파라미터
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportDataParams {
    #[serde(flatten)]
    pub query: QueryParams,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub report_matches: Vec<ReportMatch>,
}

impl_list_params!(ReportDataParams);

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn report() -> ReportData {
        serde_json::from_value(json!({
            "reportName": "weekly-cis",
            "reportTypeName": "cis-benchmark",
            "startTime": "2026-04-01T00:00:00Z",
            "endTime": "2026-04-08T00:00:00Z",
            "uiSummary": {"passed": 10},
            "flows": [{"src": "a"}],
            "endpoints": [{"name": "pod-a"}]
        }))
        .unwrap()
    }

    #[test]
    fn summary_drops_detail_records() {
        let summary = report().summary();
        assert!(summary.flows.is_empty());
        assert!(summary.endpoints.is_empty());
        assert_eq!(summary.ui_summary, json!({"passed": 10}));
        assert_eq!(summary.report_name, "weekly-cis");
    }

    #[test]
    fn uid_uses_name_and_window() {
        let r = report();
        assert_eq!(
            r.uid(),
            "weekly-cis_2026-04-01T00:00:00Z_2026-04-08T00:00:00Z"
        );
        assert_eq!(r.end_time, Utc.with_ymd_and_hms(2026, 4, 8, 0, 0, 0).unwrap());
    }
}
