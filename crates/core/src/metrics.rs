//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 크레이트는 이 상수를 사용하여 `metrics::counter!()`, `metrics::histogram!()`
//! 매크로를 호출합니다. 레코더가 설치되지 않으면 호출은 아무 일도 하지 않습니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `logvault_`
//! - 모듈명: `client_`, `pager_`, `compliance_`
//! - 접미어: `_total` (counter), `_seconds` (histogram/latency)

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 결과 레이블 키 (success, not_found, api_error, unstructured, transport, decode)
pub const LABEL_RESULT: &str = "result";

/// 리소스 레이블 키 (요청 경로)
pub const LABEL_RESOURCE: &str = "resource";

// ─── Client 메트릭 ──────────────────────────────────────────────────

/// Client: 전송한 요청 수 (counter, labels: resource, result)
pub const CLIENT_REQUESTS_TOTAL: &str = "logvault_client_requests_total";

/// Client: 요청 지연 시간 (histogram, 초)
pub const CLIENT_REQUEST_DURATION_SECONDS: &str = "logvault_client_request_duration_seconds";

/// Client: 벌크 요청에서 실패한 항목 수 (counter)
pub const CLIENT_BULK_FAILED_ITEMS_TOTAL: &str = "logvault_client_bulk_failed_items_total";

// ─── Pager 메트릭 ───────────────────────────────────────────────────

/// Pager: 전달된 페이지 수 (counter)
pub const PAGER_PAGES_TOTAL: &str = "logvault_pager_pages_total";

/// Pager: 전달된 항목 수 (counter)
pub const PAGER_ITEMS_TOTAL: &str = "logvault_pager_items_total";

/// Pager: 에러로 종료된 스트림 수 (counter)
pub const PAGER_ERRORS_TOTAL: &str = "logvault_pager_errors_total";

// ─── Compliance 메트릭 ──────────────────────────────────────────────

/// Compliance: 중복으로 제거된 플로우 수 (counter)
pub const COMPLIANCE_FLOWS_DEDUPLICATED_TOTAL: &str =
    "logvault_compliance_flows_deduplicated_total";

/// Compliance: 성공 레코드에 의해 억제된 실패 벤치마크 수 (counter)
pub const COMPLIANCE_BENCHMARKS_SUPPRESSED_TOTAL: &str =
    "logvault_compliance_benchmarks_suppressed_total";

// ─── 히스토그램 버킷 ────────────────────────────────────────────────

/// 요청 지연 버킷 (초)
pub const REQUEST_DURATION_BUCKETS: [f64; 9] = [0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 5.0, 30.0];

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_histogram};

    // Client
    describe_counter!(
        CLIENT_REQUESTS_TOTAL,
        "Total number of requests sent to the log store"
    );
    describe_histogram!(
        CLIENT_REQUEST_DURATION_SECONDS,
        "Log store request latency in seconds"
    );
    describe_counter!(
        CLIENT_BULK_FAILED_ITEMS_TOTAL,
        "Total number of items rejected inside bulk create/delete responses"
    );

    // Pager
    describe_counter!(PAGER_PAGES_TOTAL, "Total number of pages delivered by pagers");
    describe_counter!(PAGER_ITEMS_TOTAL, "Total number of items delivered by pagers");
    describe_counter!(
        PAGER_ERRORS_TOTAL,
        "Total number of page streams terminated by an error"
    );

    // Compliance
    describe_counter!(
        COMPLIANCE_FLOWS_DEDUPLICATED_TOTAL,
        "Total number of duplicate flows dropped by the flow search"
    );
    describe_counter!(
        COMPLIANCE_BENCHMARKS_SUPPRESSED_TOTAL,
        "Total number of errored benchmark sets suppressed by a successful one"
    );
}
