use reqwest::StatusCode;
use std::io;
use thiserror::Error as ThisError;

use crate::domain::errors::StorageError;

#[derive(ThisError, Debug)]
pub enum ArtifactoryError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("HTTP error: {status} - {message}")]
    Status { status: StatusCode, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Client setup failed: {0}")]
    Setup(String),

    #[error("Invalid search pattern: {0}")]
    Pattern(#[from] globset::Error),
}

impl ArtifactoryError {
    /// Build a `Status` error from a non-success response, consuming its body
    pub async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status();
        let message = response.text().await.unwrap_or_default();
        ArtifactoryError::Status {
            status,
            message: message.trim().to_string(),
        }
    }

    /// Worth another attempt: connection problems, timeouts, throttling and 5xx
    pub fn is_transient(&self) -> bool {
        match self {
            ArtifactoryError::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            ArtifactoryError::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            ArtifactoryError::Io(e) => matches!(
                e.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionRefused
                    | io::ErrorKind::TimedOut
                    | io::ErrorKind::Interrupted
            ),
            ArtifactoryError::InvalidResponse(_)
            | ArtifactoryError::Setup(_)
            | ArtifactoryError::Pattern(_) => false,
        }
    }

    /// Whether this failure aborts a whole bulk call instead of counting as one failed file
    pub fn is_call_level(&self) -> bool {
        match self {
            ArtifactoryError::Status { status, .. } => {
                *status == StatusCode::UNAUTHORIZED || *status == StatusCode::FORBIDDEN
            }
            _ => true,
        }
    }

    pub fn into_storage(self, operation: &str) -> StorageError {
        StorageError::backend(operation, self.to_string())
    }
}

/// Convert infrastructure ArtifactoryError to domain StorageError
impl From<ArtifactoryError> for StorageError {
    fn from(err: ArtifactoryError) -> Self {
        err.into_storage("repository request")
    }
}
