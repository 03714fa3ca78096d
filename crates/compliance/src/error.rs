//! 컴플라이언스 스토어 에러 타입
//!
//! [`StoreError`]는 스토어 연산에서 발생하는 모든 에러를 표현합니다.
//! `From<StoreError> for LogvaultError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 전파할 수 있습니다.

use logvault_client::ClientError;
use logvault_core::error::LogvaultError;
use logvault_core::page::BulkResponse;

/// 컴플라이언스 스토어 도메인 에러
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// 로그 스토어 호출 실패
    #[error(transparent)]
    Client(#[from] ClientError),

    /// 잘못된 조회 조건 (예: RFC3339가 아닌 시각 문자열)
    #[error("invalid query: {field}: {reason}")]
    InvalidQuery {
        /// 문제가 된 필드명
        field: String,
        /// 사유
        reason: String,
    },

    /// 조건에 맞는 레코드 없음
    #[error("{resource} not found: {identifier}")]
    NotFound {
        /// 리소스 종류
        resource: &'static str,
        /// 조회에 사용한 식별자
        identifier: String,
    },

    /// 단건 조회가 예상과 다른 개수를 반환
    #[error("unexpected number of {resource} results: {count}")]
    UnexpectedCount { resource: &'static str, count: usize },

    /// 벌크 쓰기 일부/전체 거부
    #[error("bulk write rejected: {succeeded}/{total} succeeded, {failed} failed")]
    BulkRejected {
        total: i64,
        succeeded: i64,
        failed: i64,
    },
}

impl StoreError {
    pub(crate) fn bulk_rejected(resp: &BulkResponse) -> Self {
        Self::BulkRejected {
            total: resp.total,
            succeeded: resp.succeeded,
            failed: resp.failed,
        }
    }

    /// 조회 결과가 없는 경우인지 여부 (스토어의 404 포함)
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Client(e) => e.is_not_found(),
            _ => false,
        }
    }
}

impl From<StoreError> for LogvaultError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Client(e) => e.into(),
            other => LogvaultError::Store(other.to_string()),
        }
    }
}
