//! logvault 공통 크레이트
//!
//! 로그 스토어 클라이언트, 컴플라이언스 리듀서, CLI가 공유하는
//! 쿼리 모델, 응답 봉투, 리소스 레코드, 에러, 설정, 메트릭 이름을 정의합니다.

pub mod config;
pub mod error;
pub mod metrics;
pub mod page;
pub mod query;
pub mod resources;
pub mod sort;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, LogvaultError, ProtocolError};

// 설정
pub use config::LogvaultConfig;

// 쿼리 모델
pub use page::{BulkError, BulkResponse, Page};
pub use query::{AfterKey, ListParams, QueryParams, TimeRange};
pub use sort::{SortBy, SortChain};
