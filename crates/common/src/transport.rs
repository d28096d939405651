//! Transport boundary.
//!
//! The byte-level protocol spoken to trackers and storage nodes is not
//! implemented here. Anything that can open a tracker connection and move
//! bytes to and from a storage node implements [`Transport`]; the resolver
//! and client only ever talk through these traits.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::object::{Metadata, ObjectInfo, StorageEndpoint};

/// Backend status: no such file, group or object.
pub const STATUS_NOT_FOUND: u8 = 2;
/// Backend status: I/O error on the storage node.
pub const STATUS_IO: u8 = 5;
/// Backend status: request is not valid for the node it was sent to.
pub const STATUS_INVALID: u8 = 22;
/// Backend status: no space left on the storage node.
pub const STATUS_NO_SPACE: u8 = 28;

/// Failure reported by a transport implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Could not open a connection to the address
    #[error("connection to {addr} failed: {reason}")]
    Unreachable { addr: String, reason: String },

    /// The remote side answered with a non-zero status
    #[error("backend returned status {0}")]
    Status(u8),

    /// The remote side answered but returned nothing usable
    #[error("empty response from {0}")]
    EmptyResponse(String),

    /// The call did not complete in time
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// Anything else the transport wants to surface
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Backend status code, if the failure carries one.
    pub fn status(&self) -> Option<u8> {
        match self {
            TransportError::Status(code) => Some(*code),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(STATUS_NOT_FOUND)
    }
}

/// An open connection to a tracker.
#[async_trait]
pub trait TrackerConnection: Send + Sync {
    /// Ask for any storage node that accepts writes.
    ///
    /// `Ok(None)` means the tracker answered but has no eligible node.
    async fn query_store(&self) -> Result<Option<StorageEndpoint>, TransportError>;

    /// Ask for a storage node serving `group`.
    async fn query_group(&self, group: &str) -> Result<StorageEndpoint, TransportError>;
}

/// Opens tracker connections and performs storage node transfers.
///
/// Every call is independent: no connection or endpoint is assumed to
/// outlive the call that obtained it.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn open_tracker(
        &self,
        addr: &str,
    ) -> Result<Box<dyn TrackerConnection>, TransportError>;

    /// Store `content` on `endpoint`, returning the `(group, remote name)` it was assigned.
    async fn upload(
        &self,
        endpoint: &StorageEndpoint,
        content: Bytes,
        ext: &str,
        metadata: &Metadata,
    ) -> Result<(String, String), TransportError>;

    async fn download(
        &self,
        endpoint: &StorageEndpoint,
        group: &str,
        remote_name: &str,
    ) -> Result<Bytes, TransportError>;

    async fn delete(
        &self,
        endpoint: &StorageEndpoint,
        group: &str,
        remote_name: &str,
    ) -> Result<(), TransportError>;

    async fn stat(
        &self,
        endpoint: &StorageEndpoint,
        group: &str,
        remote_name: &str,
    ) -> Result<ObjectInfo, TransportError>;
}
