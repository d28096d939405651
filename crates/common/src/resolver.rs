//! Endpoint resolution through the tracker.
//!
//! Every call opens its own tracker connection and asks one question. Nothing
//! is cached between calls; connection reuse, if any, is the transport's
//! business.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::object::StorageEndpoint;
use crate::transport::{TrackerConnection, Transport, TransportError};

#[derive(Clone)]
pub struct EndpointResolver {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for EndpointResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointResolver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl EndpointResolver {
    /// Fails with [`ClientError::InvalidConfig`] if `config` does not validate.
    pub fn new(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, transport })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// Find a storage node in any group that accepts writes.
    pub async fn resolve_for_upload(&self) -> Result<StorageEndpoint> {
        let endpoint = self
            .with_tracker(|tracker, addr| async move {
                match tracker.query_store().await {
                    Ok(Some(endpoint)) => Ok(endpoint),
                    Ok(None) => Err(ClientError::NoStorageAvailable(
                        TransportError::EmptyResponse(addr),
                    )),
                    // the tracker answered, it just has nothing to offer
                    Err(e @ TransportError::Status(_)) => Err(ClientError::NoStorageAvailable(e)),
                    Err(e) => Err(ClientError::TrackerUnreachable(e)),
                }
            })
            .await?;

        debug!(endpoint = %endpoint, "resolved storage node for upload");
        Ok(endpoint)
    }

    /// Find a storage node serving `group`.
    pub async fn resolve_for_group(&self, group: &str) -> Result<StorageEndpoint> {
        let endpoint = self
            .with_tracker(|tracker, _addr| async move {
                match tracker.query_group(group).await {
                    Ok(endpoint) => Ok(endpoint),
                    Err(e) if e.is_not_found() => Err(ClientError::UnknownGroup {
                        group: group.to_string(),
                        source: e,
                    }),
                    Err(e) => Err(ClientError::TrackerUnreachable(e)),
                }
            })
            .await?;

        debug!(group, endpoint = %endpoint, "resolved storage node for group");
        Ok(endpoint)
    }

    /// `http://{host}:{http_port}/` for a storage node that accepts writes.
    pub async fn public_base_url(&self) -> Result<String> {
        let endpoint = self.resolve_for_upload().await?;
        Ok(format!("http://{}:{}/", endpoint.host, self.config.http_port))
    }

    /// Open a connection to the primary tracker and run `query` against it,
    /// the whole exchange bounded by the tracker timeout.
    async fn with_tracker<T, F, Fut>(&self, query: F) -> Result<T>
    where
        F: FnOnce(Box<dyn TrackerConnection>, String) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let Some(addr) = self.config.primary_tracker() else {
            return Err(ClientError::InvalidConfig(
                "no tracker_server configured".to_string(),
            ));
        };
        let budget = self.config.tracker_timeout();

        let exchange = async {
            let tracker = self
                .transport
                .open_tracker(addr)
                .await
                .map_err(ClientError::TrackerUnreachable)?;
            query(tracker, addr.to_string()).await
        };

        match tokio::time::timeout(budget, exchange).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                warn!(tracker = addr, error = %e, "tracker request failed");
                Err(e)
            }
            Err(_) => {
                warn!(tracker = addr, ?budget, "tracker request timed out");
                Err(ClientError::TrackerUnreachable(TransportError::Timeout(
                    budget,
                )))
            }
        }
    }
}
