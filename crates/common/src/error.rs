//! Error types for the object store client.

use crate::object::ObjectReference;
use crate::transport::TransportError;

/// Errors returned by the endpoint resolver and the object store client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// No tracker connection could be opened, or the tracker did not answer
    #[error("tracker unreachable: {0}")]
    TrackerUnreachable(#[source] TransportError),

    /// The tracker answered but has no storage node accepting writes
    #[error("no storage node available: {0}")]
    NoStorageAvailable(#[source] TransportError),

    /// The tracker does not know the group
    #[error("unknown group '{group}': {source}")]
    UnknownGroup {
        group: String,
        #[source]
        source: TransportError,
    },

    /// Upload was called with zero bytes
    #[error("refusing to upload empty content")]
    EmptyContent,

    #[error("upload failed: {0}")]
    UploadFailed(#[source] TransportError),

    /// The storage node has no object under the reference
    #[error("object not found: {reference}")]
    ObjectNotFound {
        reference: ObjectReference,
        #[source]
        source: TransportError,
    },

    #[error("download failed: {0}")]
    DownloadFailed(#[source] TransportError),

    #[error("delete failed: {0}")]
    DeleteFailed(#[source] TransportError),

    #[error("stat failed: {0}")]
    StatFailed(#[source] TransportError),

    /// A reference missing its group or remote name
    #[error("invalid object reference: '{0}'")]
    InvalidReference(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ClientError {
    /// The transport failure behind this error, if there is one.
    pub fn cause(&self) -> Option<&TransportError> {
        match self {
            ClientError::TrackerUnreachable(e)
            | ClientError::NoStorageAvailable(e)
            | ClientError::UploadFailed(e)
            | ClientError::DownloadFailed(e)
            | ClientError::DeleteFailed(e)
            | ClientError::StatFailed(e) => Some(e),
            ClientError::UnknownGroup { source, .. }
            | ClientError::ObjectNotFound { source, .. } => Some(source),
            ClientError::EmptyContent
            | ClientError::InvalidReference(_)
            | ClientError::InvalidConfig(_) => None,
        }
    }

    /// Backend status code for diagnostics, when the backend supplied one.
    pub fn backend_code(&self) -> Option<u8> {
        self.cause().and_then(TransportError::status)
    }

    /// Whether the caller handed in something unusable, as opposed to the
    /// backend failing.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ClientError::EmptyContent
                | ClientError::InvalidReference(_)
                | ClientError::InvalidConfig(_)
        )
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::STATUS_NO_SPACE;

    #[test]
    fn test_backend_code() {
        let err = ClientError::UploadFailed(TransportError::Status(STATUS_NO_SPACE));
        assert_eq!(err.backend_code(), Some(28));
        assert_eq!(ClientError::EmptyContent.backend_code(), None);

        let err = ClientError::TrackerUnreachable(TransportError::Unreachable {
            addr: "127.0.0.1:22122".into(),
            reason: "refused".into(),
        });
        assert_eq!(err.backend_code(), None);
        assert!(err.cause().is_some());
    }

    #[test]
    fn test_validation_kinds() {
        assert!(ClientError::EmptyContent.is_validation());
        assert!(!ClientError::DeleteFailed(TransportError::Status(5)).is_validation());
    }
}
