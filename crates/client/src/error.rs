//! Client error types.

use logvault_core::error::{LogvaultError, ProtocolError};

/// Errors returned by the log store client.
///
/// Response bodies are only retained for [`ClientError::Unstructured`]; a body
/// that fails to decode is logged and never embedded in the error value.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    /// The request was built incorrectly (e.g. both params and a raw body).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The client could not be constructed from its configuration.
    #[error("invalid client configuration: {0}")]
    Config(String),

    /// Connection, TLS or I/O failure.
    #[error("transport error on {path}: {reason}")]
    Transport { path: String, reason: String },

    /// The store answered 404 for the requested path.
    #[error("not found: {path}")]
    NotFound { path: String },

    /// The store answered with a structured `{"msg", "status"}` error body.
    #[error("log store error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The store answered with an error body that could not be interpreted.
    #[error("unexpected response (status {status}): {body}")]
    Unstructured { status: u16, body: String },

    /// Request parameters or items could not be serialized.
    #[error("failed to encode request: {0}")]
    Encode(String),

    /// A 200 response body did not match the expected type.
    #[error("failed to decode response from {path}: {reason}")]
    Decode { path: String, reason: String },
}

impl ClientError {
    /// HTTP status associated with the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::Api { status, .. } | Self::Unstructured { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Value used for the `result` metric label.
    pub(crate) fn metric_label(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) | Self::Config(_) => "invalid",
            Self::Transport { .. } => "transport",
            Self::NotFound { .. } => "not_found",
            Self::Api { .. } => "api_error",
            Self::Unstructured { .. } => "unstructured",
            Self::Encode(_) => "encode",
            Self::Decode { .. } => "decode",
        }
    }
}

impl From<ClientError> for LogvaultError {
    fn from(err: ClientError) -> Self {
        let protocol = match err {
            ClientError::InvalidRequest(msg) | ClientError::Config(msg) => {
                ProtocolError::InvalidRequest(msg)
            }
            ClientError::Transport { path, reason } => {
                ProtocolError::Transport(format!("{path}: {reason}"))
            }
            ClientError::NotFound { path } => ProtocolError::NotFound { path },
            ClientError::Api { status, message } => ProtocolError::Api { status, message },
            ClientError::Unstructured { status, body } => {
                ProtocolError::Unstructured { status, body }
            }
            ClientError::Encode(msg) => ProtocolError::Codec(msg),
            ClientError::Decode { path, reason } => {
                ProtocolError::Codec(format!("{path}: {reason}"))
            }
        };
        LogvaultError::Protocol(protocol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_exposed_for_http_errors() {
        assert_eq!(
            ClientError::NotFound {
                path: "/api/v1/flows".to_owned()
            }
            .status(),
            Some(404)
        );
        assert_eq!(
            ClientError::Api {
                status: 400,
                message: "bad".to_owned()
            }
            .status(),
            Some(400)
        );
        assert_eq!(ClientError::Encode("x".to_owned()).status(), None);
    }

    #[test]
    fn converts_into_protocol_error() {
        let err: LogvaultError = ClientError::Unstructured {
            status: 502,
            body: "<html>bad gateway</html>".to_owned(),
        }
        .into();
        assert!(matches!(
            err,
            LogvaultError::Protocol(ProtocolError::Unstructured { status: 502, .. })
        ));
    }
}
