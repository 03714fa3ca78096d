//! Typed request/response protocol.
//!
//! Every call to the log store is a [`Request`] executed by a [`RestInterface`]
//! implementation. The transport only moves bytes; classification of the reply
//! (decode, not-found, structured error, unstructured error) is shared by all
//! implementations through [`decode_response`].
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │  ResourceClient  │
//! └────────┬─────────┘
//!          │ Request
//!          ▼
//!   ┌──────────────┐
//!   │RestInterface │ (trait)
//!   └──────────────┘
//!        │      │
//!        ▼      ▼
//!   ┌──────┐ ┌──────┐
//!   │ Http │ │ Mock │
//!   └──┬───┘ └──────┘
//!      ▼
//!   log store
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use logvault_core::metrics::{
    CLIENT_REQUEST_DURATION_SECONDS, CLIENT_REQUESTS_TOTAL, LABEL_RESOURCE, LABEL_RESULT,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error};

use crate::error::ClientError;

/// Path prefix shared by every resource endpoint.
pub const API_PREFIX: &str = "/api/v1";

/// Cluster id sent when the caller does not name one.
pub const DEFAULT_CLUSTER: &str = "cluster";

pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_NDJSON: &str = "application/x-ndjson";

/// Header carrying the target cluster.
pub const HEADER_CLUSTER_ID: &str = "x-cluster-id";

/// Header carrying the tenant; omitted when no tenant is configured.
pub const HEADER_TENANT_ID: &str = "x-tenant-id";

/// HTTP method of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Post,
    Delete,
}

/// A single request to the log store.
///
/// A request carries either a parameter object (encoded as JSON) or a
/// pre-serialized raw body, never both. Mixing them is reported as
/// [`ClientError::InvalidRequest`] before any I/O happens.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    cluster: String,
    content_type: &'static str,
    params: Option<Bytes>,
    body: Option<Bytes>,
    encode_error: Option<String>,
}

impl Request {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            cluster: String::new(),
            content_type: CONTENT_TYPE_JSON,
            params: None,
            body: None,
            encode_error: None,
        }
    }

    /// Creates a POST request for a resource path such as `/flows`.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// Creates a DELETE request for a resource path.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Sets the target cluster. An empty id falls back to [`DEFAULT_CLUSTER`].
    pub fn cluster(mut self, cluster: impl Into<String>) -> Self {
        self.cluster = cluster.into();
        self
    }

    /// Attaches a parameter object, encoded as the JSON request body.
    pub fn params<P: Serialize>(mut self, params: &P) -> Self {
        match serde_json::to_vec(params) {
            Ok(encoded) => self.params = Some(Bytes::from(encoded)),
            Err(e) => self.encode_error = Some(e.to_string()),
        }
        self
    }

    /// Attaches a pre-serialized body (e.g. NDJSON for bulk operations).
    pub fn body(mut self, body: Bytes) -> Self {
        self.body = Some(body);
        self
    }

    pub fn content_type(mut self, content_type: &'static str) -> Self {
        self.content_type = content_type;
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// Full request path including [`API_PREFIX`].
    pub fn url_path(&self) -> String {
        format!("{API_PREFIX}{}", self.path)
    }

    /// Value of the `x-cluster-id` header.
    pub fn cluster_header(&self) -> &str {
        if self.cluster.is_empty() {
            DEFAULT_CLUSTER
        } else {
            &self.cluster
        }
    }

    pub fn content_type_header(&self) -> &'static str {
        self.content_type
    }

    /// The encoded request body, whichever form was supplied.
    pub fn payload(&self) -> Option<&Bytes> {
        self.params.as_ref().or(self.body.as_ref())
    }

    /// Checks the request is well formed.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.params.is_some() && self.body.is_some() {
            return Err(ClientError::InvalidRequest(format!(
                "{}: params and body are mutually exclusive",
                self.url_path()
            )));
        }
        if let Some(reason) = &self.encode_error {
            return Err(ClientError::Encode(reason.clone()));
        }
        Ok(())
    }

    /// Executes the request and decodes a successful reply into `T`.
    pub async fn send<T, R>(self, rest: &R) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        R: RestInterface,
    {
        self.validate()?;
        let path = self.url_path();
        let started = Instant::now();

        let result = rest
            .execute(self)
            .await
            .and_then(|raw| decode_response(&path, raw));

        let label = match &result {
            Ok(_) => "success",
            Err(e) => e.metric_label(),
        };
        metrics::counter!(CLIENT_REQUESTS_TOTAL, LABEL_RESOURCE => path.clone(), LABEL_RESULT => label)
            .increment(1);
        metrics::histogram!(CLIENT_REQUEST_DURATION_SECONDS)
            .record(started.elapsed().as_secs_f64());
        debug!(path = path.as_str(), result = label, "log store request completed");

        result
    }
}

/// Raw reply from the transport.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Bytes,
}

/// Transport abstraction for the log store.
///
/// # Implementations
///
/// - [`HttpRestClient`](crate::http::HttpRestClient): production HTTPS client
/// - `MockRestClient`: canned replies for tests (`mock` feature)
pub trait RestInterface: Send + Sync + 'static {
    /// Sends the request and returns the raw status and body.
    ///
    /// # Errors
    ///
    /// Only transport failures are errors here; non-200 replies are returned
    /// as [`RawResponse`] and classified by the caller.
    fn execute(
        &self,
        request: Request,
    ) -> impl Future<Output = Result<RawResponse, ClientError>> + Send;
}

impl<R: RestInterface> RestInterface for Arc<R> {
    fn execute(
        &self,
        request: Request,
    ) -> impl Future<Output = Result<RawResponse, ClientError>> + Send {
        (**self).execute(request)
    }
}

/// Structured error body; both lowercase and capitalized keys are accepted.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default, alias = "Msg")]
    msg: String,
    #[serde(default, alias = "Status")]
    status: u16,
}

/// Classifies a raw reply.
///
/// - 200: the body is decoded into `T`
/// - 404: [`ClientError::NotFound`], the body is not parsed
/// - other: [`ClientError::Api`] when the body is `{"msg", "status"}` with a
///   non-empty message, otherwise [`ClientError::Unstructured`]
pub fn decode_response<T: DeserializeOwned>(
    path: &str,
    raw: RawResponse,
) -> Result<T, ClientError> {
    match raw.status {
        200 => serde_json::from_slice(&raw.body).map_err(|e| {
            error!(
                path,
                body = %String::from_utf8_lossy(&raw.body),
                error = %e,
                "failed to decode log store response"
            );
            ClientError::Decode {
                path: path.to_owned(),
                reason: e.to_string(),
            }
        }),
        404 => Err(ClientError::NotFound {
            path: path.to_owned(),
        }),
        status => match serde_json::from_slice::<ApiErrorBody>(&raw.body) {
            Ok(body) if !body.msg.is_empty() => Err(ClientError::Api {
                status: if body.status != 0 { body.status } else { status },
                message: body.msg,
            }),
            _ => Err(ClientError::Unstructured {
                status,
                body: String::from_utf8_lossy(&raw.body).into_owned(),
            }),
        },
    }
}
