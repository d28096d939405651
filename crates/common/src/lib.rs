/**
 * Error taxonomy shared by the resolver and the client.
 */
pub mod error;
/**
 * Client configuration: tracker addresses, timeouts
 *  and the public HTTP port.
 */
pub mod config;
/**
 * Blobs, metadata, object references and what
 *  storage nodes report about stored objects.
 */
pub mod object;
/**
 * The seam to whatever actually speaks to trackers
 *  and storage nodes.
 */
pub mod transport;
/**
 * Tracker lookups that turn an intent into a
 *  storage node address.
 */
pub mod resolver;
/**
 * Upload, download, delete and stat on top of
 *  the resolver and a transport.
 */
pub mod client;
/**
 * In-memory fake cluster for tests.
 */
#[cfg(any(test, feature = "testkit"))]
pub mod testkit;

pub mod prelude {
    pub use crate::client::ObjectStoreClient;
    pub use crate::config::ClientConfig;
    pub use crate::error::ClientError;
    pub use crate::object::{Blob, Metadata, ObjectInfo, ObjectReference, StorageEndpoint};
    pub use crate::resolver::EndpointResolver;
    pub use crate::transport::{TrackerConnection, Transport, TransportError};
}
