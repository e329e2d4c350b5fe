use crate::domain::errors::{ConfigurationError, ValidationError};

/// Errors that can occur during object-store operations
#[derive(Debug, Clone)]
pub enum StorageError {
    /// Malformed or missing configuration at initialization
    Configuration(ConfigurationError),

    /// The backend reported zero retrieved files for a key
    ObjectNotFound { bucket: String, key: String },

    /// Caller input rejected before reaching the backend
    Validation { message: String },

    /// Any failure reported by the repository service, passed through verbatim
    Backend { operation: String, message: String },

    /// Local spill buffer could not be written or read
    Staging { path: String, message: String },
}

impl StorageError {
    pub fn backend(operation: &str, message: impl Into<String>) -> Self {
        StorageError::Backend {
            operation: operation.to_string(),
            message: message.into(),
        }
    }

    pub fn staging(path: &std::path::Path, err: &std::io::Error) -> Self {
        StorageError::Staging {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::ObjectNotFound { .. })
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Configuration(err) => write!(f, "{}", err),
            StorageError::ObjectNotFound { bucket, key } => {
                write!(f, "Object not found: {}/{}", bucket, key)
            }
            StorageError::Validation { message } => {
                write!(f, "Validation error: {}", message)
            }
            StorageError::Backend { operation, message } => {
                write!(f, "Backend error during {}: {}", operation, message)
            }
            StorageError::Staging { path, message } => {
                write!(f, "Staging error at {}: {}", path, message)
            }
        }
    }
}

impl std::error::Error for StorageError {}

impl From<ConfigurationError> for StorageError {
    fn from(err: ConfigurationError) -> Self {
        StorageError::Configuration(err)
    }
}

impl From<ValidationError> for StorageError {
    fn from(err: ValidationError) -> Self {
        StorageError::Validation {
            message: err.to_string(),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
