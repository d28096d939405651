use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::config::ClientConfig;
use crate::object::{Metadata, ObjectInfo, ObjectReference, StorageEndpoint};
use crate::transport::{
    TrackerConnection, Transport, TransportError, STATUS_INVALID, STATUS_NOT_FOUND,
};

/// Address the fake tracker answers on.
pub const TEST_TRACKER: &str = "127.0.0.1:22122";

/// Number of calls the cluster has received, by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounters {
    pub tracker_connections: usize,
    pub uploads: usize,
    pub downloads: usize,
    pub deletes: usize,
    pub stats: usize,
}

impl CallCounters {
    /// Calls that reached a storage node.
    pub fn storage_calls(&self) -> usize {
        self.uploads + self.downloads + self.deletes + self.stats
    }
}

/// A one-shot failure for the next call of the matching kind.
#[derive(Debug, Clone)]
pub enum Fault {
    Upload(TransportError),
    /// Next upload "succeeds" but hands back an empty group and name
    IncompleteUpload,
    Download(TransportError),
    Delete(TransportError),
    Stat(TransportError),
}

#[derive(Debug)]
struct StoredObject {
    content: Bytes,
    metadata: Metadata,
    created: DateTime<Utc>,
    source: String,
}

#[derive(Debug)]
struct Inner {
    groups: Vec<(String, StorageEndpoint)>,
    objects: HashMap<(String, String), StoredObject>,
    counters: CallCounters,
    faults: Vec<Fault>,
    tracker_online: bool,
    tracker_hang: bool,
    storage_hang: bool,
    next_id: u64,
}

/// Fake tracker plus storage nodes, cheap to clone; clones share state.
#[derive(Debug, Clone)]
pub struct TestCluster {
    inner: Arc<Mutex<Inner>>,
}

impl TestCluster {
    /// A tracker that knows no storage nodes at all.
    pub fn empty() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                groups: Vec::new(),
                objects: HashMap::new(),
                counters: CallCounters::default(),
                faults: Vec::new(),
                tracker_online: true,
                tracker_hang: false,
                storage_hang: false,
                next_id: 1,
            })),
        }
    }

    pub fn single_group(group: &str, host: &str, port: u16) -> Self {
        Self::empty().with_storage(group, host, port)
    }

    /// Register one more storage node under `group`.
    pub fn with_storage(self, group: &str, host: &str, port: u16) -> Self {
        self.inner
            .lock()
            .groups
            .push((group.to_string(), StorageEndpoint::new(host, port)));
        self
    }

    /// Client configuration pointing at this cluster's tracker.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(vec![TEST_TRACKER.to_string()])
    }

    pub fn counters(&self) -> CallCounters {
        self.inner.lock().counters
    }

    pub fn set_tracker_online(&self, online: bool) {
        self.inner.lock().tracker_online = online;
    }

    /// Make tracker connections never complete.
    pub fn set_tracker_hang(&self, hang: bool) {
        self.inner.lock().tracker_hang = hang;
    }

    /// Make storage node calls never complete.
    pub fn set_storage_hang(&self, hang: bool) {
        self.inner.lock().storage_hang = hang;
    }

    pub fn inject(&self, fault: Fault) {
        self.inner.lock().faults.push(fault);
    }

    /// Metadata stored with an object, straight from the fake's memory.
    pub fn metadata(&self, reference: &ObjectReference) -> Option<Metadata> {
        self.inner
            .lock()
            .objects
            .get(&key(reference.group(), reference.remote_name()))
            .map(|o| o.metadata.clone())
    }

    pub fn object_count(&self) -> usize {
        self.inner.lock().objects.len()
    }

    fn take_fault(&self, matches: impl Fn(&Fault) -> bool) -> Option<Fault> {
        let mut inner = self.inner.lock();
        let idx = inner.faults.iter().position(matches)?;
        Some(inner.faults.remove(idx))
    }

    async fn maybe_hang_storage(&self) {
        let hang = self.inner.lock().storage_hang;
        if hang {
            std::future::pending::<()>().await;
        }
    }

    /// The group `endpoint` serves, if it is one of ours.
    fn group_of(&self, endpoint: &StorageEndpoint) -> Result<String, TransportError> {
        self.inner
            .lock()
            .groups
            .iter()
            .find(|(_, e)| e == endpoint)
            .map(|(g, _)| g.clone())
            .ok_or_else(|| TransportError::Unreachable {
                addr: endpoint.to_string(),
                reason: "no such storage node".to_string(),
            })
    }

    fn check_serves(&self, endpoint: &StorageEndpoint, group: &str) -> Result<(), TransportError> {
        if self.group_of(endpoint)? == group {
            Ok(())
        } else {
            Err(TransportError::Status(STATUS_INVALID))
        }
    }
}

fn key(group: &str, remote_name: &str) -> (String, String) {
    (group.to_string(), remote_name.to_string())
}

struct TestTracker {
    groups: Vec<(String, StorageEndpoint)>,
}

#[async_trait]
impl TrackerConnection for TestTracker {
    async fn query_store(&self) -> Result<Option<StorageEndpoint>, TransportError> {
        Ok(self.groups.first().map(|(_, e)| e.clone()))
    }

    async fn query_group(&self, group: &str) -> Result<StorageEndpoint, TransportError> {
        self.groups
            .iter()
            .find(|(g, _)| g == group)
            .map(|(_, e)| e.clone())
            .ok_or(TransportError::Status(STATUS_NOT_FOUND))
    }
}

#[async_trait]
impl Transport for TestCluster {
    async fn open_tracker(
        &self,
        addr: &str,
    ) -> Result<Box<dyn TrackerConnection>, TransportError> {
        let (online, hang, groups) = {
            let mut inner = self.inner.lock();
            inner.counters.tracker_connections += 1;
            (inner.tracker_online, inner.tracker_hang, inner.groups.clone())
        };
        if hang {
            std::future::pending::<()>().await;
        }
        if !online || addr != TEST_TRACKER {
            return Err(TransportError::Unreachable {
                addr: addr.to_string(),
                reason: "connection refused".to_string(),
            });
        }
        Ok(Box::new(TestTracker { groups }))
    }

    async fn upload(
        &self,
        endpoint: &StorageEndpoint,
        content: Bytes,
        ext: &str,
        metadata: &Metadata,
    ) -> Result<(String, String), TransportError> {
        self.inner.lock().counters.uploads += 1;
        self.maybe_hang_storage().await;
        match self.take_fault(|f| matches!(f, Fault::Upload(_) | Fault::IncompleteUpload)) {
            Some(Fault::Upload(e)) => return Err(e),
            Some(Fault::IncompleteUpload) => return Ok((String::new(), String::new())),
            _ => {}
        }

        let group = self.group_of(endpoint)?;
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        let remote_name = if ext.is_empty() {
            format!("M00/00/00/{:016x}", id)
        } else {
            format!("M00/00/00/{:016x}.{}", id, ext)
        };
        inner.objects.insert(
            key(&group, &remote_name),
            StoredObject {
                content,
                metadata: metadata.clone(),
                created: Utc::now(),
                source: endpoint.host.clone(),
            },
        );
        Ok((group, remote_name))
    }

    async fn download(
        &self,
        endpoint: &StorageEndpoint,
        group: &str,
        remote_name: &str,
    ) -> Result<Bytes, TransportError> {
        self.inner.lock().counters.downloads += 1;
        self.maybe_hang_storage().await;
        if let Some(Fault::Download(e)) = self.take_fault(|f| matches!(f, Fault::Download(_))) {
            return Err(e);
        }
        self.check_serves(endpoint, group)?;
        self.inner
            .lock()
            .objects
            .get(&key(group, remote_name))
            .map(|o| o.content.clone())
            .ok_or(TransportError::Status(STATUS_NOT_FOUND))
    }

    async fn delete(
        &self,
        endpoint: &StorageEndpoint,
        group: &str,
        remote_name: &str,
    ) -> Result<(), TransportError> {
        self.inner.lock().counters.deletes += 1;
        self.maybe_hang_storage().await;
        if let Some(Fault::Delete(e)) = self.take_fault(|f| matches!(f, Fault::Delete(_))) {
            return Err(e);
        }
        self.check_serves(endpoint, group)?;
        self.inner
            .lock()
            .objects
            .remove(&key(group, remote_name))
            .map(|_| ())
            .ok_or(TransportError::Status(STATUS_NOT_FOUND))
    }

    async fn stat(
        &self,
        endpoint: &StorageEndpoint,
        group: &str,
        remote_name: &str,
    ) -> Result<ObjectInfo, TransportError> {
        self.inner.lock().counters.stats += 1;
        self.maybe_hang_storage().await;
        if let Some(Fault::Stat(e)) = self.take_fault(|f| matches!(f, Fault::Stat(_))) {
            return Err(e);
        }
        self.check_serves(endpoint, group)?;
        self.inner
            .lock()
            .objects
            .get(&key(group, remote_name))
            .map(|o| ObjectInfo {
                size: o.content.len() as u64,
                create_time: o.created,
                source_ip_addr: o.source.clone(),
                crc32: crc32fast::hash(&o.content),
            })
            .ok_or(TransportError::Status(STATUS_NOT_FOUND))
    }
}
