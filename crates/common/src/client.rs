//! The object store client: upload, download, delete and stat.
//!
//! Each operation is one resolve-then-transfer round trip. The endpoint is
//! resolved fresh through the tracker every time and dropped when the call
//! returns, so a client can be cloned and used from any number of tasks.
//! There are no retries here; a failed call is the caller's to retry.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::object::{Blob, Metadata, ObjectInfo, ObjectReference};
use crate::resolver::EndpointResolver;
use crate::transport::{Transport, TransportError};

#[derive(Debug, Clone)]
pub struct ObjectStoreClient {
    resolver: EndpointResolver,
}

impl ObjectStoreClient {
    pub fn new(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        Ok(Self::from_resolver(EndpointResolver::new(config, transport)?))
    }

    pub fn from_resolver(resolver: EndpointResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &EndpointResolver {
        &self.resolver
    }

    /// Store `blob` with `metadata` attached and return where it landed.
    ///
    /// Empty content is rejected before anything is sent. One successful call
    /// stores exactly one object.
    pub async fn upload(&self, blob: &Blob, metadata: &Metadata) -> Result<ObjectReference> {
        if blob.is_empty() {
            warn!(name = blob.name(), "rejecting upload of empty file");
            return Err(ClientError::EmptyContent);
        }

        let started = Instant::now();
        let endpoint = self.resolver.resolve_for_upload().await?;

        let (group, remote_name) = self
            .transfer(self.resolver.transport().upload(
                &endpoint,
                blob.content().clone(),
                blob.ext(),
                metadata,
            ))
            .await
            .map_err(|e| {
                warn!(name = blob.name(), endpoint = %endpoint, error = %e, "upload failed");
                ClientError::UploadFailed(e)
            })?;

        let reference = ObjectReference::new(group, remote_name).map_err(|_| {
            warn!(name = blob.name(), endpoint = %endpoint, "storage node returned an incomplete reference");
            ClientError::UploadFailed(TransportError::EmptyResponse(endpoint.to_string()))
        })?;

        info!(
            name = blob.name(),
            size = blob.len(),
            group = reference.group(),
            remote_name = reference.remote_name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "uploaded file"
        );
        Ok(reference)
    }

    /// Fetch the whole object into memory.
    pub async fn download(&self, reference: &ObjectReference) -> Result<Bytes> {
        let endpoint = self.resolver.resolve_for_group(reference.group()).await?;

        let content = self
            .transfer(self.resolver.transport().download(
                &endpoint,
                reference.group(),
                reference.remote_name(),
            ))
            .await
            .map_err(|e| {
                warn!(reference = %reference, error = %e, "download failed");
                not_found_or(reference, e, ClientError::DownloadFailed)
            })?;

        debug!(reference = %reference, size = content.len(), "downloaded file");
        Ok(content)
    }

    /// Remove the object. Deleting something that is already gone succeeds.
    pub async fn delete(&self, reference: &ObjectReference) -> Result<()> {
        let endpoint = self.resolver.resolve_for_group(reference.group()).await?;

        match self
            .transfer(self.resolver.transport().delete(
                &endpoint,
                reference.group(),
                reference.remote_name(),
            ))
            .await
        {
            Ok(()) => {
                info!(reference = %reference, "deleted file");
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                debug!(reference = %reference, "file already absent");
                Ok(())
            }
            Err(e) => {
                warn!(reference = %reference, error = %e, "delete failed");
                Err(ClientError::DeleteFailed(e))
            }
        }
    }

    pub async fn stat(&self, reference: &ObjectReference) -> Result<ObjectInfo> {
        let endpoint = self.resolver.resolve_for_group(reference.group()).await?;

        self.transfer(self.resolver.transport().stat(
            &endpoint,
            reference.group(),
            reference.remote_name(),
        ))
        .await
        .map_err(|e| {
            warn!(reference = %reference, error = %e, "stat failed");
            not_found_or(reference, e, ClientError::StatFailed)
        })
    }

    /// Browser-fetchable URL for `reference`, on a node serving its group.
    pub async fn public_url(&self, reference: &ObjectReference) -> Result<String> {
        let endpoint = self.resolver.resolve_for_group(reference.group()).await?;
        Ok(reference.public_url(&endpoint.host, self.resolver.config().http_port))
    }

    /// Run one storage node transfer under the network timeout.
    async fn transfer<T>(
        &self,
        call: impl Future<Output = std::result::Result<T, TransportError>>,
    ) -> std::result::Result<T, TransportError> {
        let budget = self.resolver.config().network_timeout();
        match tokio::time::timeout(budget, call).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout(budget)),
        }
    }
}

fn not_found_or(
    reference: &ObjectReference,
    e: TransportError,
    otherwise: fn(TransportError) -> ClientError,
) -> ClientError {
    if e.is_not_found() {
        ClientError::ObjectNotFound {
            reference: reference.clone(),
            source: e,
        }
    } else {
        otherwise(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{Fault, TestCluster};
    use crate::transport::{STATUS_IO, STATUS_NO_SPACE};

    fn client(cluster: &TestCluster) -> ObjectStoreClient {
        ObjectStoreClient::new(cluster.client_config(), Arc::new(cluster.clone())).unwrap()
    }

    #[tokio::test]
    async fn test_upload_returns_reference() {
        let cluster = TestCluster::single_group("group1", "10.0.0.5", 23000);
        let reference = client(&cluster)
            .upload(&Blob::new("a.txt", "hello"), &Metadata::author("wu"))
            .await
            .unwrap();
        assert_eq!(reference.group(), "group1");
        assert!(reference.remote_name().ends_with(".txt"));
        assert_eq!(cluster.counters().uploads, 1);
    }

    #[tokio::test]
    async fn test_empty_upload_touches_nothing() {
        let cluster = TestCluster::single_group("group1", "10.0.0.5", 23000);
        let err = client(&cluster)
            .upload(&Blob::new("empty.txt", Vec::new()), &Metadata::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::EmptyContent));
        let counters = cluster.counters();
        assert_eq!(counters.tracker_connections, 0);
        assert_eq!(counters.storage_calls(), 0);
    }

    #[tokio::test]
    async fn test_upload_failure_carries_backend_code() {
        let cluster = TestCluster::single_group("group1", "10.0.0.5", 23000);
        cluster.inject(Fault::Upload(TransportError::Status(STATUS_NO_SPACE)));
        let err = client(&cluster)
            .upload(&Blob::new("a.txt", "hello"), &Metadata::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::UploadFailed(_)));
        assert_eq!(err.backend_code(), Some(STATUS_NO_SPACE));
    }

    #[tokio::test]
    async fn test_upload_with_incomplete_answer_fails() {
        let cluster = TestCluster::single_group("group1", "10.0.0.5", 23000);
        cluster.inject(Fault::IncompleteUpload);
        let err = client(&cluster)
            .upload(&Blob::new("a.txt", "hello"), &Metadata::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::UploadFailed(TransportError::EmptyResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_download_transport_error() {
        let cluster = TestCluster::single_group("group1", "10.0.0.5", 23000);
        let client = client(&cluster);
        let reference = client
            .upload(&Blob::new("a.txt", "hello"), &Metadata::new())
            .await
            .unwrap();
        cluster.inject(Fault::Download(TransportError::Status(STATUS_IO)));
        let err = client.download(&reference).await.unwrap_err();
        assert!(matches!(err, ClientError::DownloadFailed(_)));
        assert_eq!(err.backend_code(), Some(STATUS_IO));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let cluster = TestCluster::single_group("group1", "10.0.0.5", 23000);
        let client = client(&cluster);
        let reference = client
            .upload(&Blob::new("a.txt", "hello"), &Metadata::new())
            .await
            .unwrap();
        client.delete(&reference).await.unwrap();
        client.delete(&reference).await.unwrap();
        assert_eq!(cluster.counters().deletes, 2);
    }

    #[tokio::test]
    async fn test_delete_failure_is_surfaced() {
        let cluster = TestCluster::single_group("group1", "10.0.0.5", 23000);
        let client = client(&cluster);
        let reference = client
            .upload(&Blob::new("a.txt", "hello"), &Metadata::new())
            .await
            .unwrap();
        cluster.inject(Fault::Delete(TransportError::Status(STATUS_IO)));
        let err = client.delete(&reference).await.unwrap_err();
        assert!(matches!(err, ClientError::DeleteFailed(_)));
    }

    #[tokio::test]
    async fn test_stat_reports_size() {
        let cluster = TestCluster::single_group("group1", "10.0.0.5", 23000);
        let client = client(&cluster);
        let reference = client
            .upload(&Blob::new("a.txt", "hello"), &Metadata::new())
            .await
            .unwrap();
        let info = client.stat(&reference).await.unwrap();
        assert_eq!(info.size, 5);
        assert_eq!(info.source_ip_addr, "10.0.0.5");
    }

    #[tokio::test]
    async fn test_stat_transport_error() {
        let cluster = TestCluster::single_group("group1", "10.0.0.5", 23000);
        let client = client(&cluster);
        let reference = client
            .upload(&Blob::new("a.txt", "hello"), &Metadata::new())
            .await
            .unwrap();
        cluster.inject(Fault::Stat(TransportError::Status(STATUS_IO)));
        let err = client.stat(&reference).await.unwrap_err();
        assert!(matches!(err, ClientError::StatFailed(_)));
        assert_eq!(err.backend_code(), Some(STATUS_IO));
    }

    #[tokio::test]
    async fn test_huge_timeouts_do_not_panic() {
        let cluster = TestCluster::single_group("group1", "10.0.0.5", 23000);
        let mut config = cluster.client_config();
        config.connect_timeout_secs = u64::MAX;
        config.network_timeout_secs = u64::MAX;
        let client = ObjectStoreClient::new(config, Arc::new(cluster.clone())).unwrap();
        let reference = client
            .upload(&Blob::new("a.txt", "hello"), &Metadata::new())
            .await
            .unwrap();
        assert_eq!(client.download(&reference).await.unwrap(), "hello");
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_storage_node_times_out() {
        let cluster = TestCluster::single_group("group1", "10.0.0.5", 23000);
        cluster.set_storage_hang(true);
        let err = client(&cluster)
            .upload(&Blob::new("a.txt", "hello"), &Metadata::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::UploadFailed(TransportError::Timeout(_))
        ));
    }

    #[tokio::test]
    async fn test_public_url() {
        let cluster = TestCluster::single_group("group1", "10.0.0.5", 23000);
        let reference = ObjectReference::new("group1", "M00/00/00/xyz.txt").unwrap();
        let url = client(&cluster).public_url(&reference).await.unwrap();
        assert_eq!(url, "http://10.0.0.5:8888/group1/M00/00/00/xyz.txt");
    }
}
