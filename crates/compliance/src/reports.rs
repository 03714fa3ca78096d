//! 아카이브 리포트 페이지네이션 (오프셋 에뮬레이션)
//!
//! 리포트 목록 화면은 "N번째 페이지" 방식으로 조회하지만 로그 스토어는 커서만
//! 지원합니다. [`ReportQuery`]는 페이지 번호와 페이지 크기로 합성 커서
//! `{"startFrom": offset}`를 만들고, 정렬 필드 뒤에 `id` 타이브레이크를 붙여
//! 요청마다 같은 순서가 나오도록 합니다.

use chrono::{DateTime, Utc};
use logvault_core::page::Page;
use logvault_core::query::AfterKey;
use logvault_core::resources::{ReportData, ReportDataParams, ReportMatch};
use logvault_core::sort::{DEFAULT_TIEBREAK_FIELD, SortBy, SortChain};
use serde::{Deserialize, Serialize};
use serde_json::{Map, json};

use crate::error::StoreError;
use crate::flows::DEFAULT_PAGE_SIZE;

/// 합성 커서의 오프셋 키
pub const START_FROM_KEY: &str = "startFrom";

/// 리포트 이름/종류 쌍
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportTypeAndName {
    pub report_name: String,
    pub report_type_name: String,
}

/// 리포트 정렬 조건 (API 표현은 오름차순 플래그)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSortBy {
    pub field: String,
    #[serde(default)]
    pub ascending: bool,
}

impl ReportSortBy {
    pub fn new(field: impl Into<String>, ascending: bool) -> Self {
        Self {
            field: field.into(),
            ascending,
        }
    }
}

/// 아카이브 리포트 목록 조회 조건
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportQuery {
    /// 이름/종류 매칭 (비어 있으면 전체)
    pub reports: Vec<ReportTypeAndName>,
    /// RFC3339 시작 시각
    pub from_time: String,
    /// RFC3339 종료 시각 (시작만 주어지면 현재 시각)
    pub to_time: String,
    /// 0부터 시작하는 페이지 번호
    pub page: usize,
    /// 페이지 크기 상한 겸 전체 결과 상한
    pub max_items: Option<usize>,
    pub sort_by: Vec<ReportSortBy>,
}

impl ReportQuery {
    /// 오프셋 계산에 쓰이는 실제 페이지 크기
    ///
    /// `max_items`가 0이 아니면 `min(기본 페이지 크기, max_items)`입니다.
    pub fn effective_page_size(&self) -> usize {
        match self.max_items {
            Some(max) if max != 0 => DEFAULT_PAGE_SIZE.min(max),
            _ => DEFAULT_PAGE_SIZE,
        }
    }

    /// `page > 0`이면 합성 커서를 만듭니다.
    ///
    /// # Errors
    ///
    /// 오프셋이 `usize` 범위를 넘으면 [`StoreError::InvalidQuery`]를 반환합니다.
    pub fn offset_cursor(&self) -> Result<Option<AfterKey>, StoreError> {
        if self.page == 0 {
            return Ok(None);
        }
        let offset = self
            .page
            .checked_mul(self.effective_page_size())
            .ok_or_else(|| StoreError::InvalidQuery {
                field: "page".to_owned(),
                reason: format!("page {} is out of range", self.page),
            })?;
        let mut map = Map::new();
        map.insert(START_FROM_KEY.to_owned(), json!(offset));
        Ok(Some(AfterKey::new(map)))
    }

    /// 결정적 정렬 체인 (호출자 필드 순서 + `id` 오름차순)
    pub fn sort_chain(&self) -> SortChain {
        SortChain::new(
            self.sort_by
                .iter()
                .map(|s| SortBy {
                    field: s.field.clone(),
                    descending: !s.ascending,
                })
                .collect(),
        )
        .with_tiebreak(DEFAULT_TIEBREAK_FIELD)
    }

    /// 스토어 조회 파라미터와 페이저 결과 상한을 만듭니다.
    ///
    /// # Errors
    ///
    /// 시각 문자열이 RFC3339가 아니거나 페이지 번호가 너무 크면
    /// [`StoreError::InvalidQuery`]를 반환합니다.
    pub fn to_params(&self, now: DateTime<Utc>) -> Result<(ReportDataParams, usize), StoreError> {
        let mut params = ReportDataParams::default();
        params.query.sort = self.sort_chain().into_fields();

        if !self.from_time.is_empty() || !self.to_time.is_empty() {
            let from = if self.from_time.is_empty() {
                DateTime::<Utc>::UNIX_EPOCH
            } else {
                parse_time("from_time", &self.from_time)?
            };
            let to = if self.to_time.is_empty() {
                now
            } else {
                parse_time("to_time", &self.to_time)?
            };
            params.query.time_range = Some(logvault_core::query::TimeRange::new(from, to));
        }

        params.report_matches = self
            .reports
            .iter()
            .map(|r| ReportMatch {
                report_name: r.report_name.clone(),
                report_type_name: r.report_type_name.clone(),
            })
            .collect();

        params.query.max_page_size = DEFAULT_PAGE_SIZE;
        params.query.after_key = self.offset_cursor()?;

        let max_results = self.max_items.unwrap_or(0);
        if let Some(max) = self.max_items {
            if max < params.query.max_page_size {
                params.query.max_page_size = max;
            }
        }
        Ok((params, max_results))
    }
}

fn parse_time(field: &str, value: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StoreError::InvalidQuery {
            field: field.to_owned(),
            reason: format!("'{value}' is not RFC3339: {e}"),
        })
}

/// 리포트 요약 목록과 전체 일치 건수
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArchivedReportSummaries {
    /// 스토어가 보고한 전체 일치 건수 (마지막 페이지 기준)
    pub count: i64,
    pub reports: Vec<ReportData>,
}

impl ArchivedReportSummaries {
    /// 페이지 하나를 요약본으로 접어 넣습니다.
    pub fn fold_page(&mut self, page: &Page<ReportData>) {
        self.count = page.total_hits;
        self.reports.extend(page.items.iter().map(ReportData::summary));
    }

    pub fn type_and_names(&self) -> Vec<ReportTypeAndName> {
        self.reports
            .iter()
            .map(|r| ReportTypeAndName {
                report_name: r.report_name.clone(),
                report_type_name: r.report_type_name.clone(),
            })
            .collect()
    }
}
