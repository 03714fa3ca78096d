//! 정렬 조건 및 결정적 타이브레이크 체인
//!
//! 오프셋 기반 페이지네이션은 동일한 정렬 값을 가진 항목들이 요청마다
//! 같은 순서로 나와야 안전합니다. [`SortChain`]은 호출자의 정렬 필드 뒤에
//! 고유 필드(기본값 `id`)를 덧붙여 전체 순서를 결정적으로 만듭니다.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 단일 필드 정렬 조건
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortBy {
    pub field: String,
    #[serde(default)]
    pub descending: bool,
}

impl SortBy {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }
}

/// 기본 타이브레이크 필드
pub const DEFAULT_TIEBREAK_FIELD: &str = "id";

/// 다중 필드 정렬 체인
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortChain {
    fields: Vec<SortBy>,
}

impl SortChain {
    pub fn new(fields: Vec<SortBy>) -> Self {
        Self { fields }
    }

    /// 체인에 아직 없는 경우에만 오름차순 타이브레이크 필드를 추가합니다.
    pub fn with_tiebreak(mut self, field: &str) -> Self {
        if !self.fields.iter().any(|s| s.field == field) {
            self.fields.push(SortBy::asc(field));
        }
        self
    }

    pub fn fields(&self) -> &[SortBy] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<SortBy> {
        self.fields
    }

    /// 두 JSON 레코드를 체인 순서대로 비교합니다.
    ///
    /// 필드가 없으면 `null`로 취급하며 `null`은 모든 값보다 앞섭니다.
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        for sort in &self.fields {
            let left = a.get(&sort.field).unwrap_or(&Value::Null);
            let right = b.get(&sort.field).unwrap_or(&Value::Null);
            let ord = compare_values(left, right);
            let ord = if sort.descending { ord.reverse() } else { ord };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => {
                let x = x.as_f64().unwrap_or(f64::NAN);
                let y = y.as_f64().unwrap_or(f64::NAN);
                x.total_cmp(&y)
            }
        },
        // RFC3339 UTC 타임스탬프는 사전식 비교로 시간 순서가 유지됨
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tiebreak_is_appended_once() {
        let chain = SortChain::new(vec![SortBy::desc("endTime")])
            .with_tiebreak("id")
            .with_tiebreak("id");
        assert_eq!(chain.fields().len(), 2);
        assert_eq!(chain.fields()[1], SortBy::asc("id"));
    }

    #[test]
    fn tiebreak_not_added_when_caller_sorts_by_it() {
        let chain = SortChain::new(vec![SortBy::desc("id")]).with_tiebreak("id");
        assert_eq!(chain.into_fields(), vec![SortBy::desc("id")]);
    }

    #[test]
    fn compare_uses_direction_per_field() {
        let chain = SortChain::new(vec![SortBy::asc("name"), SortBy::desc("endTime")]);
        let a = json!({"name": "cis", "endTime": "2026-01-02T00:00:00Z"});
        let b = json!({"name": "cis", "endTime": "2026-01-01T00:00:00Z"});
        // name이 같으므로 endTime 내림차순으로 a가 앞
        assert_eq!(chain.compare(&a, &b), Ordering::Less);
    }

    #[test]
    fn compare_falls_through_to_tiebreak() {
        let chain = SortChain::new(vec![SortBy::desc("score")]).with_tiebreak("id");
        let mut rows = vec![
            json!({"id": "c", "score": 1}),
            json!({"id": "a", "score": 1}),
            json!({"id": "b", "score": 2}),
        ];
        rows.sort_by(|a, b| chain.compare(a, b));
        let ids: Vec<_> = rows.iter().map(|r| r["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn missing_field_sorts_first() {
        let chain = SortChain::new(vec![SortBy::asc("n")]);
        assert_eq!(chain.compare(&json!({}), &json!({"n": 0})), Ordering::Less);
    }

    #[test]
    fn mixed_numbers_compare_numerically() {
        let chain = SortChain::new(vec![SortBy::asc("n")]);
        assert_eq!(
            chain.compare(&json!({"n": 2}), &json!({"n": 10.5})),
            Ordering::Less
        );
    }
}
