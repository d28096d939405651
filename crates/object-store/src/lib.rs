//! Embedded tracker and storage nodes for trackfs
//!
//! [`LocalCluster`] plays both cluster roles in-process: it answers tracker
//! queries from a static [`ClusterConfig`] and serves storage requests from
//! SQLite (object records and metadata) plus pluggable object storage
//! (S3/MinIO/local filesystem/memory) for the bytes. It implements
//! [`common::transport::Transport`], so an `ObjectStoreClient` runs against
//! it unchanged.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use trackfs_object_store::{ClusterConfig, LocalCluster};
//!
//! # async fn example() -> Result<(), trackfs_object_store::StoreError> {
//! // Everything under /tmp/trackfs: objects.db + objects/
//! let cluster = LocalCluster::open(Path::new("/tmp/trackfs"), ClusterConfig::default()).await?;
//!
//! // Take the tracker down; clients now fail with TrackerUnreachable
//! cluster.set_online(false);
//! # Ok(())
//! # }
//! ```

mod cluster;
mod database;
mod error;
mod storage;

pub use cluster::{ClusterConfig, GroupConfig, LocalCluster};
pub use error::{Result, StoreError};
pub use storage::ObjectStoreConfig;
