//! LocalCluster - an embedded tracker and set of storage nodes.
//!
//! The tracker role answers from the static [`ClusterConfig`]; the storage
//! role keeps object bytes in [`Storage`] and per-object records in the
//! SQLite [`Database`]. Every storage node of every group shares the same
//! backend, so the group is what separates objects, not the node.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use common::object::{Metadata, ObjectInfo, ObjectReference, StorageEndpoint};
use common::transport::{
    TrackerConnection, Transport, TransportError, STATUS_INVALID, STATUS_NOT_FOUND,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::database::{Database, ObjectRecord};
use crate::error::{Result, StoreError};
use crate::storage::{ObjectStoreConfig, Storage};

/// Store path prefix every remote name starts with.
const STORE_PATH: &str = "M00";

/// One group and the storage nodes serving it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupConfig {
    pub name: String,
    pub storage: Vec<StorageEndpoint>,
}

/// Static layout of the embedded cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Addresses the embedded tracker accepts connections on
    pub trackers: Vec<String>,
    /// Groups in the order the tracker hands them out for uploads
    pub groups: Vec<GroupConfig>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            trackers: vec!["127.0.0.1:22122".to_string()],
            groups: vec![GroupConfig {
                name: "group1".to_string(),
                storage: vec![StorageEndpoint::new("127.0.0.1", 23000)],
            }],
        }
    }
}

impl ClusterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.trackers.is_empty() {
            return Err(StoreError::InvalidConfig(
                "cluster needs at least one tracker".to_string(),
            ));
        }
        for group in &self.groups {
            if group.name.is_empty() || group.name.contains('/') {
                return Err(StoreError::InvalidConfig(format!(
                    "invalid group name '{}'",
                    group.name
                )));
            }
        }
        Ok(())
    }

    /// First storage node of the first group that has one.
    fn store_endpoint(&self) -> Option<StorageEndpoint> {
        self.groups
            .iter()
            .find_map(|g| g.storage.first().cloned())
    }

    fn group_endpoint(&self, group: &str) -> Option<StorageEndpoint> {
        self.groups
            .iter()
            .find(|g| g.name == group)
            .and_then(|g| g.storage.first().cloned())
    }

    /// The group `endpoint` belongs to.
    fn group_of(&self, endpoint: &StorageEndpoint) -> Option<&str> {
        self.groups
            .iter()
            .find(|g| g.storage.contains(endpoint))
            .map(|g| g.name.as_str())
    }
}

/// Object bytes plus records, shared by every node in the cluster.
#[derive(Debug, Clone)]
pub(crate) struct Backend {
    db: Database,
    storage: Storage,
}

impl Backend {
    /// Store an object under a fresh remote name and return that name.
    pub async fn put(
        &self,
        group: &str,
        source_ip: &str,
        content: Bytes,
        ext: &str,
        metadata: &Metadata,
    ) -> Result<String> {
        let remote_name = generate_remote_name(ext);
        let record = ObjectRecord {
            size: content.len() as i64,
            crc32: crc32fast::hash(&content),
            source_ip: source_ip.to_string(),
            created_at: chrono::Utc::now().timestamp(),
        };

        self.storage
            .put_data(group, &remote_name, content)
            .await?;
        if let Err(e) = self
            .db
            .insert_object(group, &remote_name, &record, metadata)
            .await
        {
            // don't leave bytes behind that nothing points at
            if let Err(cleanup) = self.storage.delete_data(group, &remote_name).await {
                warn!(group, remote_name = %remote_name, error = %cleanup, "failed to remove orphaned object data");
            }
            return Err(e);
        }

        info!(group, remote_name = %remote_name, size = record.size, "object stored");
        Ok(remote_name)
    }

    pub async fn get(&self, group: &str, remote_name: &str) -> Result<Bytes> {
        if self.db.get_object(group, remote_name).await?.is_none() {
            return Err(StoreError::NotFound(format!("{}/{}", group, remote_name)));
        }
        match self.storage.get_data(group, remote_name).await? {
            Some(data) => Ok(data),
            None => {
                warn!(group, remote_name, "object recorded but data missing");
                Err(StoreError::NotFound(format!("{}/{}", group, remote_name)))
            }
        }
    }

    pub async fn delete(&self, group: &str, remote_name: &str) -> Result<()> {
        if !self.db.delete_object(group, remote_name).await? {
            return Err(StoreError::NotFound(format!("{}/{}", group, remote_name)));
        }
        self.storage.delete_data(group, remote_name).await?;
        info!(group, remote_name, "object deleted");
        Ok(())
    }

    pub async fn info(&self, group: &str, remote_name: &str) -> Result<ObjectInfo> {
        self.db
            .get_object(group, remote_name)
            .await?
            .map(ObjectRecord::into_info)
            .ok_or_else(|| StoreError::NotFound(format!("{}/{}", group, remote_name)))
    }

    pub async fn metadata(&self, group: &str, remote_name: &str) -> Result<Metadata> {
        if self.db.get_object(group, remote_name).await?.is_none() {
            return Err(StoreError::NotFound(format!("{}/{}", group, remote_name)));
        }
        self.db.get_metadata(group, remote_name).await
    }
}

/// `M00/XX/YY/<id>[.ext]`, with the two directory levels taken from the id.
fn generate_remote_name(ext: &str) -> String {
    let id = Uuid::new_v4();
    let bytes = id.as_bytes();
    let stem = format!(
        "{}/{:02X}/{:02X}/{}",
        STORE_PATH,
        bytes[0],
        bytes[1],
        id.simple()
    );
    if ext.is_empty() {
        stem
    } else {
        format!("{}.{}", stem, ext)
    }
}

/// Embedded tracker plus storage nodes, usable as a [`Transport`].
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use common::prelude::*;
/// use trackfs_object_store::{ClusterConfig, LocalCluster};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let cluster = LocalCluster::ephemeral(ClusterConfig::default()).await?;
/// let client = ObjectStoreClient::new(ClientConfig::default(), Arc::new(cluster))?;
///
/// let reference = client
///     .upload(&Blob::new("a.txt", "hello"), &Metadata::author("wu"))
///     .await?;
/// assert_eq!(client.download(&reference).await?, "hello");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LocalCluster {
    config: Arc<ClusterConfig>,
    backend: Backend,
    online: Arc<AtomicBool>,
}

impl LocalCluster {
    /// Create a cluster with a file-based SQLite database.
    ///
    /// # Arguments
    /// * `db_path` - Path to the SQLite database file
    /// * `storage` - Object storage configuration (S3, MinIO, local, or memory)
    /// * `config` - Trackers and groups the cluster answers for
    pub async fn new(
        db_path: &Path,
        storage: ObjectStoreConfig,
        config: ClusterConfig,
    ) -> Result<Self> {
        config.validate()?;
        let db = Database::new(db_path).await?;
        let storage = Storage::new(storage).await?;
        Ok(Self::from_parts(config, Backend { db, storage }))
    }

    /// Create a cluster that keeps everything under `data_dir`
    /// (database at `data_dir/objects.db`, bytes under `data_dir/objects/`).
    pub async fn open(data_dir: &Path, config: ClusterConfig) -> Result<Self> {
        let db_path = data_dir.join("objects.db");
        let storage = ObjectStoreConfig::Local {
            path: data_dir.join("objects"),
        };
        Self::new(&db_path, storage, config).await
    }

    /// Create a fully ephemeral cluster (in-memory DB + in-memory object storage).
    ///
    /// Data will be lost when the cluster is dropped. Useful for testing.
    pub async fn ephemeral(config: ClusterConfig) -> Result<Self> {
        config.validate()?;
        let db = Database::in_memory().await?;
        let storage = Storage::new(ObjectStoreConfig::Memory).await?;
        Ok(Self::from_parts(config, Backend { db, storage }))
    }

    fn from_parts(config: ClusterConfig, backend: Backend) -> Self {
        Self {
            config: Arc::new(config),
            backend,
            online: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Take the tracker down or bring it back. Clones share the switch.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Metadata pairs stored with an object, in upload order.
    pub async fn metadata(&self, reference: &ObjectReference) -> Result<Metadata> {
        self.backend
            .metadata(reference.group(), reference.remote_name())
            .await
    }

    fn check_serves(
        &self,
        endpoint: &StorageEndpoint,
        group: &str,
    ) -> std::result::Result<(), TransportError> {
        match self.config.group_of(endpoint) {
            Some(g) if g == group => Ok(()),
            Some(g) => {
                debug!(
                    endpoint = %endpoint,
                    serves = g,
                    requested = group,
                    "request sent to wrong group"
                );
                Err(TransportError::Status(STATUS_INVALID))
            }
            None => Err(unknown_node(endpoint)),
        }
    }
}

fn unknown_node(endpoint: &StorageEndpoint) -> TransportError {
    TransportError::Unreachable {
        addr: endpoint.to_string(),
        reason: "not a storage node of this cluster".to_string(),
    }
}

struct LocalTracker {
    config: Arc<ClusterConfig>,
}

#[async_trait]
impl TrackerConnection for LocalTracker {
    async fn query_store(&self) -> std::result::Result<Option<StorageEndpoint>, TransportError> {
        Ok(self.config.store_endpoint())
    }

    async fn query_group(&self, group: &str) -> std::result::Result<StorageEndpoint, TransportError> {
        self.config
            .group_endpoint(group)
            .ok_or(TransportError::Status(STATUS_NOT_FOUND))
    }
}

#[async_trait]
impl Transport for LocalCluster {
    async fn open_tracker(
        &self,
        addr: &str,
    ) -> std::result::Result<Box<dyn TrackerConnection>, TransportError> {
        if !self.online.load(Ordering::SeqCst) || !self.config.trackers.iter().any(|t| t == addr) {
            return Err(TransportError::Unreachable {
                addr: addr.to_string(),
                reason: "connection refused".to_string(),
            });
        }
        Ok(Box::new(LocalTracker {
            config: self.config.clone(),
        }))
    }

    async fn upload(
        &self,
        endpoint: &StorageEndpoint,
        content: Bytes,
        ext: &str,
        metadata: &Metadata,
    ) -> std::result::Result<(String, String), TransportError> {
        let group = self
            .config
            .group_of(endpoint)
            .ok_or_else(|| unknown_node(endpoint))?
            .to_string();
        let remote_name = self
            .backend
            .put(&group, &endpoint.host, content, ext, metadata)
            .await?;
        Ok((group, remote_name))
    }

    async fn download(
        &self,
        endpoint: &StorageEndpoint,
        group: &str,
        remote_name: &str,
    ) -> std::result::Result<Bytes, TransportError> {
        self.check_serves(endpoint, group)?;
        Ok(self.backend.get(group, remote_name).await?)
    }

    async fn delete(
        &self,
        endpoint: &StorageEndpoint,
        group: &str,
        remote_name: &str,
    ) -> std::result::Result<(), TransportError> {
        self.check_serves(endpoint, group)?;
        Ok(self.backend.delete(group, remote_name).await?)
    }

    async fn stat(
        &self,
        endpoint: &StorageEndpoint,
        group: &str,
        remote_name: &str,
    ) -> std::result::Result<ObjectInfo, TransportError> {
        self.check_serves(endpoint, group)?;
        Ok(self.backend.info(group, remote_name).await?)
    }
}
