//! Error types for folder synchronization

use thiserror::Error;

/// Result type alias for sync operations
pub type SyncResult<T> = Result<T, SyncError>;

/// Sync error types
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Authentication failed: {reason}")]
    Authentication { reason: String },

    #[error("Remote path not found: {path}")]
    RemoteNotFound { path: String },

    #[error("Remote {operation} failed for {path}: {reason}")]
    RemoteOperation {
        operation: &'static str,
        path: String,
        reason: String,
    },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Case API error: {0}")]
    ExternalApi(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<sqlx::Error> for SyncError {
    fn from(err: sqlx::Error) -> Self {
        SyncError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Serialization(err.to_string())
    }
}

impl SyncError {
    pub fn remote_operation(
        operation: &'static str,
        path: impl Into<String>,
        reason: impl std::fmt::Display,
    ) -> Self {
        SyncError::RemoteOperation {
            operation,
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Stable error code, used in logs
    pub fn code(&self) -> &'static str {
        match self {
            SyncError::Authentication { .. } => "AUTHENTICATION_FAILED",
            SyncError::RemoteNotFound { .. } => "REMOTE_NOT_FOUND",
            SyncError::RemoteOperation { .. } => "REMOTE_OPERATION_FAILED",
            SyncError::Database(_) => "DATABASE_ERROR",
            SyncError::ExternalApi(_) => "EXTERNAL_API_ERROR",
            SyncError::Configuration(_) => "CONFIGURATION_ERROR",
            SyncError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }
}
