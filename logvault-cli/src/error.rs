//! CLI-specific error types and exit code mapping

use logvault_client::ClientError;
use logvault_compliance::StoreError;
use logvault_core::error::{LogvaultError, ProtocolError};

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to standard Unix exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// Log store request failed.
    #[error("{0}")]
    Client(#[from] ClientError),

    /// Compliance store operation failed.
    #[error("{0}")]
    Store(#[from] StoreError),

    /// The query was interrupted (Ctrl-C).
    #[error("interrupted")]
    Interrupted,

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from logvault-core.
    #[error("{0}")]
    Core(#[from] LogvaultError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                               |
    /// |------|---------------------------------------|
    /// | 0    | Success                               |
    /// | 1    | General / command error               |
    /// | 2    | Configuration error                   |
    /// | 3    | Requested record not found            |
    /// | 4    | Log store unreachable                 |
    /// | 5    | Log store rejected the request        |
    /// | 10   | IO error                              |
    /// | 130  | Interrupted                           |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Client(e) => client_exit_code(e),
            Self::Store(StoreError::Client(e)) => client_exit_code(e),
            Self::Store(StoreError::NotFound { .. }) => 3,
            Self::Store(StoreError::BulkRejected { .. }) => 5,
            Self::Store(StoreError::InvalidQuery { .. }) => 2,
            Self::Store(StoreError::UnexpectedCount { .. }) => 1,
            Self::Core(LogvaultError::Config(_)) => 2,
            Self::Core(LogvaultError::Protocol(ProtocolError::NotFound { .. })) => 3,
            Self::Core(LogvaultError::Protocol(ProtocolError::Transport(_))) => 4,
            Self::Core(LogvaultError::Io(_)) | Self::Io(_) => 10,
            Self::Interrupted => 130,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) => 1,
        }
    }

    /// Whether re-running the same query may succeed.
    ///
    /// Only transport failures and 5xx answers qualify.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Client(e) | Self::Store(StoreError::Client(e)) => client_retryable(e),
            _ => false,
        }
    }
}

fn client_exit_code(err: &ClientError) -> i32 {
    match err {
        ClientError::NotFound { .. } => 3,
        ClientError::Transport { .. } => 4,
        ClientError::Api { .. } | ClientError::Unstructured { .. } => 5,
        ClientError::InvalidRequest(_) | ClientError::Config(_) => 2,
        ClientError::Encode(_) | ClientError::Decode { .. } => 1,
    }
}

fn client_retryable(err: &ClientError) -> bool {
    match err {
        ClientError::Transport { .. } => true,
        other => other.status().is_some_and(|s| s >= 500),
    }
}
