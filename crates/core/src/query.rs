//! 쿼리 파라미터 모델 -- 시간 범위, 타임아웃, 페이지 크기, 정렬, 셀렉터, 커서
//!
//! 모든 리소스의 list 요청은 [`QueryParams`]를 공통으로 포함합니다.
//! 리소스별 파라미터 타입은 `#[serde(flatten)]`으로 이를 내장하고
//! [`ListParams`] trait을 구현하여 페이저가 커서를 설정할 수 있도록 합니다.
//!
//! # 와이어 형식
//!
//! ```json
//! {
//!   "time_range": {"from": "2026-01-01T00:00:00Z", "to": "2026-01-02T00:00:00Z"},
//!   "timeout": "60s",
//!   "max_page_size": 100,
//!   "after_key": {"startFrom": 200},
//!   "sort": [{"field": "endTime", "descending": true}],
//!   "selector": "source_namespace = \"default\""
//! }
//! ```

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::sort::SortBy;

/// 조회 시간 범위
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeRange {
    /// 주어진 시작/종료 시각으로 범위를 생성합니다.
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }
}

/// 불투명 페이지 커서 (after_key)
///
/// 스토어가 정의하는 JSON 객체이며 클라이언트는 내용을 해석하지 않고
/// 다음 요청에 그대로 돌려보냅니다. 키 순서와 중첩된 숫자 타입이 보존됩니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AfterKey(Map<String, Value>);

impl AfterKey {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for AfterKey {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// 모든 list 요청이 공유하는 쿼리 파라미터
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryParams {
    /// 조회 시간 범위
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeRange>,

    /// 스토어 측 쿼리 타임아웃 (권고값, 클라이언트는 강제하지 않음)
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "timeout_format"
    )]
    pub timeout: Option<Duration>,

    /// 한 페이지의 최대 항목 수 (0이면 스토어 기본값)
    #[serde(default, skip_serializing_if = "is_zero")]
    pub max_page_size: usize,

    /// 다음 페이지 커서
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_key: Option<AfterKey>,

    /// 정렬 조건 (앞쪽 필드가 우선)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<SortBy>,

    /// 자유 형식 셀렉터 식
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub selector: String,
}

fn is_zero(v: &usize) -> bool {
    *v == 0
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_time_range(mut self, range: TimeRange) -> Self {
        self.time_range = Some(range);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_max_page_size(mut self, size: usize) -> Self {
        self.max_page_size = size;
        self
    }

    pub fn with_sort(mut self, sort: Vec<SortBy>) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = selector.into();
        self
    }

    pub fn with_after_key(mut self, key: AfterKey) -> Self {
        self.after_key = Some(key);
        self
    }
}

/// 페이지 단위로 조회 가능한 파라미터 타입
///
/// 페이저는 이 trait만 알면 되므로 도메인 타입과 무관하게 재사용됩니다.
/// 페이저는 호출마다 파라미터를 복제하여 커서를 설정하므로 호출자의 값은 변경되지 않습니다.
pub trait ListParams: Clone + Serialize + Send + Sync + 'static {
    fn query(&self) -> &QueryParams;

    fn query_mut(&mut self) -> &mut QueryParams;

    fn set_after_key(&mut self, key: Option<AfterKey>) {
        self.query_mut().after_key = key;
    }

    fn max_page_size(&self) -> usize {
        self.query().max_page_size
    }
}

impl ListParams for QueryParams {
    fn query(&self) -> &QueryParams {
        self
    }

    fn query_mut(&mut self) -> &mut QueryParams {
        self
    }
}

/// 리소스별 파라미터 타입에 `ListParams`를 구현합니다.
///
/// 대상 타입은 `query: QueryParams` 필드를 가져야 합니다.
#[macro_export]
macro_rules! impl_list_params {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::query::ListParams for $ty {
                fn query(&self) -> &$crate::query::QueryParams {
                    &self.query
                }

                fn query_mut(&mut self) -> &mut $crate::query::QueryParams {
                    &mut self.query
                }
            }
        )+
    };
}

/// 기간 문자열 파싱 (`"60s"`, `"1m30s"`, `"500ms"`, `"2h"`)
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("empty duration".to_owned());
    }
    if input == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total = Duration::ZERO;
    let mut rest = input;
    while !rest.is_empty() {
        let digits = rest
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| format!("missing unit in duration '{input}'"))?;
        if digits == 0 {
            return Err(format!("expected number in duration '{input}'"));
        }
        let value: u64 = rest[..digits]
            .parse()
            .map_err(|e| format!("invalid number in duration '{input}': {e}"))?;
        rest = &rest[digits..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(rest.len());
        let unit = &rest[..unit_len];
        rest = &rest[unit_len..];

        total += match unit {
            "h" => Duration::from_secs(value * 3600),
            "m" => Duration::from_secs(value * 60),
            "s" => Duration::from_secs(value),
            "ms" => Duration::from_millis(value),
            other => return Err(format!("unknown unit '{other}' in duration '{input}'")),
        };
    }
    Ok(total)
}

/// 기간을 와이어 문자열로 변환합니다. 초 단위로 떨어지지 않으면 밀리초로 표기합니다.
pub fn format_duration(d: Duration) -> String {
    if d.subsec_millis() == 0 {
        format!("{}s", d.as_secs())
    } else {
        format!("{}ms", d.as_millis())
    }
}

mod timeout_format {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_str(&super::format_duration(*d)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        raw.map(|s| super::parse_duration(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
