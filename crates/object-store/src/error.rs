//! Error types for the embedded cluster.

use common::transport::{TransportError, STATUS_IO, STATUS_NOT_FOUND};

/// Errors that can occur inside the embedded tracker and storage nodes.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Object storage error
    #[error("object storage error: {0}")]
    ObjectStore(#[from] object_store::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Object not found
    #[error("object not found: {0}")]
    NotFound(String),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// S3 bucket not found - must be created before use
    #[error("S3 bucket '{0}' does not exist. Create it before starting the cluster.")]
    BucketNotFound(String),
}

/// What a client sees when the storage node fails.
impl From<StoreError> for TransportError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => TransportError::Status(STATUS_NOT_FOUND),
            StoreError::Io(_) => TransportError::Status(STATUS_IO),
            other => TransportError::Other(other.to_string()),
        }
    }
}

/// Result type alias for embedded cluster operations.
pub type Result<T> = std::result::Result<T, StoreError>;
