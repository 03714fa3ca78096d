//! 에러 타입 -- 도메인별 에러 정의

/// logvault 최상위 에러 타입
///
/// 각 크레이트는 자체 에러 타입을 정의하고 `From` 구현을 통해 이 타입으로 변환합니다.
#[derive(Debug, thiserror::Error)]
pub enum LogvaultError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 로그 스토어 프로토콜 에러
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 컴플라이언스 스토어 에러
    #[error("store error: {0}")]
    Store(String),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 프로토콜 에러 분류
///
/// 클라이언트 크레이트의 세부 에러를 요약한 형태입니다.
/// 응답 본문은 상태 코드가 구조화되지 않은 경우에만 보존됩니다.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// 연결/전송 실패
    #[error("transport failure: {0}")]
    Transport(String),

    /// 리소스 없음 (HTTP 404)
    #[error("resource not found: {path}")]
    NotFound { path: String },

    /// 구조화된 API 에러 (`{"msg", "status"}`)
    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// 구조화되지 않은 에러 응답
    #[error("unexpected response (status {status}): {body}")]
    Unstructured { status: u16, body: String },

    /// 인코딩/디코딩 실패
    #[error("codec error: {0}")]
    Codec(String),

    /// 잘못된 요청 구성 (I/O 이전에 감지)
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}
