//! HTTPS transport built on `reqwest`.

use std::path::PathBuf;
use std::time::Duration;

use logvault_core::config::ClientConfig;
use reqwest::header::{CONNECTION, CONTENT_TYPE};
use tracing::{debug, warn};

use crate::error::ClientError;
use crate::rest::{HEADER_CLUSTER_ID, HEADER_TENANT_ID, Method, RawResponse, Request, RestInterface};

/// Where the bearer token comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TokenSource {
    #[default]
    None,
    /// A fixed token.
    Static(String),
    /// A token file re-read on every request, so rotated tokens are picked up.
    File(PathBuf),
}

/// Connection settings for [`HttpRestClient`].
#[derive(Debug, Clone)]
pub struct RestConfig {
    pub base_url: String,
    pub tenant_id: String,
    pub token: TokenSource,
    pub ca_cert_path: Option<PathBuf>,
    pub client_cert_path: Option<PathBuf>,
    pub client_key_path: Option<PathBuf>,
    pub timeout: Duration,
}

impl RestConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            tenant_id: String::new(),
            token: TokenSource::None,
            ca_cert_path: None,
            client_cert_path: None,
            client_key_path: None,
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = tenant_id.into();
        self
    }

    pub fn with_token(mut self, token: TokenSource) -> Self {
        self.token = token;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl From<&ClientConfig> for RestConfig {
    fn from(config: &ClientConfig) -> Self {
        let token = if !config.token.is_empty() {
            TokenSource::Static(config.token.clone())
        } else if !config.token_path.is_empty() {
            TokenSource::File(PathBuf::from(&config.token_path))
        } else {
            TokenSource::None
        };
        let path = |p: &str| (!p.is_empty()).then(|| PathBuf::from(p));
        Self {
            base_url: config.base_url.clone(),
            tenant_id: config.tenant_id.clone(),
            token,
            ca_cert_path: path(&config.ca_cert_path),
            client_cert_path: path(&config.client_cert_path),
            client_key_path: path(&config.client_key_path),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// Production transport.
///
/// Idle connections are never kept: the pool holds zero idle connections per
/// host and every request carries `Connection: close`.
pub struct HttpRestClient {
    http: reqwest::Client,
    base_url: String,
    tenant_id: String,
    token: TokenSource,
}

impl HttpRestClient {
    /// Builds the client, loading any configured CA bundle and client identity.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] when the base URL is empty or a
    /// certificate file cannot be read or parsed.
    pub fn new(config: RestConfig) -> Result<Self, ClientError> {
        if config.base_url.is_empty() {
            return Err(ClientError::Config("base_url must not be empty".to_owned()));
        }

        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(0);

        if let Some(ca_path) = &config.ca_cert_path {
            let pem = std::fs::read(ca_path).map_err(|e| {
                ClientError::Config(format!("failed to read CA bundle {}: {e}", ca_path.display()))
            })?;
            let cert = reqwest::Certificate::from_pem(&pem)
                .map_err(|e| ClientError::Config(format!("invalid CA bundle: {e}")))?;
            builder = builder.add_root_certificate(cert);
        }

        match (&config.client_cert_path, &config.client_key_path) {
            (Some(cert_path), Some(key_path)) => {
                let mut pem = std::fs::read(cert_path).map_err(|e| {
                    ClientError::Config(format!(
                        "failed to read client certificate {}: {e}",
                        cert_path.display()
                    ))
                })?;
                let key = std::fs::read(key_path).map_err(|e| {
                    ClientError::Config(format!(
                        "failed to read client key {}: {e}",
                        key_path.display()
                    ))
                })?;
                pem.extend_from_slice(b"\n");
                pem.extend_from_slice(&key);
                let identity = reqwest::Identity::from_pem(&pem)
                    .map_err(|e| ClientError::Config(format!("invalid client identity: {e}")))?;
                builder = builder.identity(identity);
            }
            (None, None) => {}
            _ => {
                return Err(ClientError::Config(
                    "client certificate and key must be configured together".to_owned(),
                ));
            }
        }

        let http = builder
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build http client: {e}")))?;

        debug!(
            base_url = config.base_url.as_str(),
            tenant = config.tenant_id.as_str(),
            "log store client created"
        );

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            tenant_id: config.tenant_id,
            token: config.token,
        })
    }

    async fn bearer_token(&self) -> Result<Option<String>, ClientError> {
        match &self.token {
            TokenSource::None => Ok(None),
            TokenSource::Static(token) => Ok(Some(token.clone())),
            TokenSource::File(path) => {
                let token = tokio::fs::read_to_string(path).await.map_err(|e| {
                    warn!(path = %path.display(), error = %e, "failed to read token file");
                    ClientError::Config(format!(
                        "failed to read token file {}: {e}",
                        path.display()
                    ))
                })?;
                Ok(Some(token.trim().to_owned()))
            }
        }
    }
}

impl RestInterface for HttpRestClient {
    async fn execute(&self, request: Request) -> Result<RawResponse, ClientError> {
        let path = request.url_path();
        let url = format!("{}{}", self.base_url, path);

        let mut builder = match request.method() {
            Method::Post => self.http.post(&url),
            Method::Delete => self.http.delete(&url),
        };
        builder = builder
            .header(HEADER_CLUSTER_ID, request.cluster_header())
            .header(CONTENT_TYPE, request.content_type_header())
            .header(CONNECTION, "close");
        if !self.tenant_id.is_empty() {
            builder = builder.header(HEADER_TENANT_ID, self.tenant_id.as_str());
        }
        if let Some(token) = self.bearer_token().await? {
            builder = builder.bearer_auth(token);
        }
        if let Some(payload) = request.payload() {
            builder = builder.body(payload.clone());
        }

        let response = builder.send().await.map_err(|e| ClientError::Transport {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| ClientError::Transport {
            path: path.clone(),
            reason: format!("failed to read response body: {e}"),
        })?;

        Ok(RawResponse { status, body })
    }
}
