//! 설정 관리 -- logvault.toml 파싱 및 런타임 설정
//!
//! [`LogvaultConfig`]는 클라이언트와 CLI가 사용하는 최상위 설정 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`LOGVAULT_CLIENT_BASE_URL=https://...` 형식)
//! 3. 설정 파일 (`logvault.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), logvault_core::error::LogvaultError> {
//! use logvault_core::config::LogvaultConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = LogvaultConfig::load("logvault.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = LogvaultConfig::parse("[client]\ntenant_id = \"acme\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, LogvaultError};

/// 한 페이지 최대 항목 수의 상한
pub const MAX_PAGE_SIZE_LIMIT: usize = 10_000;

/// logvault 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogvaultConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 로그 스토어 연결 설정
    #[serde(default)]
    pub client: ClientConfig,
    /// 쿼리 기본값
    #[serde(default)]
    pub query: QueryConfig,
}

impl LogvaultConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LogvaultError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, LogvaultError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LogvaultError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                LogvaultError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, LogvaultError> {
        toml::from_str(toml_str).map_err(|e| {
            LogvaultError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `LOGVAULT_{SECTION}_{FIELD}`
    /// 예: `LOGVAULT_CLIENT_TENANT_ID=acme`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "LOGVAULT_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "LOGVAULT_GENERAL_LOG_FORMAT");

        // Client
        override_string(&mut self.client.base_url, "LOGVAULT_CLIENT_BASE_URL");
        override_string(&mut self.client.tenant_id, "LOGVAULT_CLIENT_TENANT_ID");
        override_string(&mut self.client.token, "LOGVAULT_CLIENT_TOKEN");
        override_string(&mut self.client.token_path, "LOGVAULT_CLIENT_TOKEN_PATH");
        override_string(&mut self.client.ca_cert_path, "LOGVAULT_CLIENT_CA_CERT_PATH");
        override_string(
            &mut self.client.client_cert_path,
            "LOGVAULT_CLIENT_CLIENT_CERT_PATH",
        );
        override_string(
            &mut self.client.client_key_path,
            "LOGVAULT_CLIENT_CLIENT_KEY_PATH",
        );
        override_u64(&mut self.client.timeout_secs, "LOGVAULT_CLIENT_TIMEOUT_SECS");

        // Query
        override_usize(&mut self.query.page_size, "LOGVAULT_QUERY_PAGE_SIZE");
        override_usize(&mut self.query.max_results, "LOGVAULT_QUERY_MAX_RESULTS");
        override_u64(
            &mut self.query.timeout_secs,
            "LOGVAULT_QUERY_TIMEOUT_SECS",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), LogvaultError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        // base_url 검증
        let url = self.client.base_url.as_str();
        if url.is_empty() {
            return Err(invalid("client.base_url", "must not be empty".to_owned()));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(invalid(
                "client.base_url",
                "must start with http:// or https://".to_owned(),
            ));
        }

        // 토큰은 문자열 또는 파일 중 하나만
        if !self.client.token.is_empty() && !self.client.token_path.is_empty() {
            return Err(invalid(
                "client.token",
                "token and token_path are mutually exclusive".to_owned(),
            ));
        }

        // mTLS 인증서와 키는 함께 지정
        if self.client.client_cert_path.is_empty() != self.client.client_key_path.is_empty() {
            return Err(invalid(
                "client.client_cert_path",
                "client_cert_path and client_key_path must be set together".to_owned(),
            ));
        }

        if self.client.timeout_secs == 0 {
            return Err(invalid(
                "client.timeout_secs",
                "must be greater than 0".to_owned(),
            ));
        }

        if self.query.page_size == 0 || self.query.page_size > MAX_PAGE_SIZE_LIMIT {
            return Err(invalid(
                "query.page_size",
                format!("must be between 1 and {MAX_PAGE_SIZE_LIMIT}"),
            ));
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: String) -> LogvaultError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason,
    }
    .into()
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 로그 스토어 연결 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// 스토어 기본 URL (`/api/v1` 앞부분)
    pub base_url: String,
    /// 테넌트 ID (비어 있으면 헤더 생략)
    pub tenant_id: String,
    /// 정적 Bearer 토큰
    pub token: String,
    /// 토큰 파일 경로 (요청마다 다시 읽음)
    pub token_path: String,
    /// CA 번들 경로 (PEM)
    pub ca_cert_path: String,
    /// mTLS 클라이언트 인증서 경로 (PEM)
    pub client_cert_path: String,
    /// mTLS 클라이언트 키 경로 (PEM)
    pub client_key_path: String,
    /// 요청 타임아웃 (초)
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://localhost:8444".to_owned(),
            tenant_id: String::new(),
            token: String::new(),
            token_path: String::new(),
            ca_cert_path: String::new(),
            client_cert_path: String::new(),
            client_key_path: String::new(),
            timeout_secs: 60,
        }
    }
}

/// 쿼리 기본값
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// 기본 페이지 크기
    pub page_size: usize,
    /// 최대 결과 수 (0이면 제한 없음)
    pub max_results: usize,
    /// 스토어 측 쿼리 타임아웃 (초, 0이면 전송하지 않음)
    pub timeout_secs: u64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            max_results: 0,
            timeout_secs: 60,
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}
