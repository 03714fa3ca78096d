//! 응답 봉투 -- 페이지 목록 응답과 벌크 응답

use serde::{Deserialize, Serialize};

use crate::query::AfterKey;

/// 한 번의 list 호출이 반환하는 페이지
///
/// `after_key`가 `None`이면 더 이상 페이지가 없습니다.
/// `total_hits`는 쿼리 전체의 일치 건수이며 단일 페이지의 항목 수보다 클 수 있습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub after_key: Option<AfterKey>,
    #[serde(default)]
    pub total_hits: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, after_key: Option<AfterKey>, total_hits: i64) -> Self {
        Self {
            items,
            after_key,
            total_hits,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 다음 페이지 커서가 있는지 여부
    pub fn has_more(&self) -> bool {
        self.after_key.is_some()
    }

    /// 항목을 `max`개로 자릅니다. 실제로 잘렸으면 `true`를 반환합니다.
    pub fn truncate(&mut self, max: usize) -> bool {
        if self.items.len() > max {
            self.items.truncate(max);
            true
        } else {
            false
        }
    }
}

/// 벌크 생성/삭제 응답
///
/// `failed > 0`은 프로토콜 에러가 아니며 호출자가 확인해야 합니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkResponse {
    #[serde(default)]
    pub total: i64,
    #[serde(default)]
    pub succeeded: i64,
    #[serde(default)]
    pub failed: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<BulkError>,
}

impl BulkResponse {
    /// 모든 항목이 성공했는지 여부
    pub fn is_complete(&self) -> bool {
        self.failed == 0 && self.succeeded == self.total
    }
}

/// 벌크 항목별 실패 정보
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkError {
    #[serde(default)]
    pub resource: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub reason: String,
}
