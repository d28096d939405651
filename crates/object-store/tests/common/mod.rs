//! Shared setup for the embedded cluster tests
#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use ::common::prelude::*;
use trackfs_object_store::{ClusterConfig, GroupConfig, LocalCluster};

pub const TRACKER: &str = "127.0.0.1:22122";

/// Two groups: group1 on one node, group2 on two.
pub fn cluster_config() -> ClusterConfig {
    ClusterConfig {
        trackers: vec![TRACKER.to_string()],
        groups: vec![
            GroupConfig {
                name: "group1".to_string(),
                storage: vec![StorageEndpoint::new("127.0.0.1", 23000)],
            },
            GroupConfig {
                name: "group2".to_string(),
                storage: vec![
                    StorageEndpoint::new("127.0.0.1", 23001),
                    StorageEndpoint::new("127.0.0.1", 23002),
                ],
            },
        ],
    }
}

pub fn client_for(cluster: &LocalCluster) -> ObjectStoreClient {
    ObjectStoreClient::new(
        ClientConfig::new(vec![TRACKER.to_string()]),
        Arc::new(cluster.clone()),
    )
    .expect("valid client config")
}

/// Client over a fully in-memory cluster.
pub async fn setup_ephemeral() -> (ObjectStoreClient, LocalCluster) {
    let cluster = LocalCluster::ephemeral(cluster_config())
        .await
        .expect("failed to create ephemeral cluster");
    (client_for(&cluster), cluster)
}

/// Client over a cluster persisted under `dir`.
pub async fn setup_local(dir: &Path) -> (ObjectStoreClient, LocalCluster) {
    let cluster = LocalCluster::open(dir, cluster_config())
        .await
        .expect("failed to open local cluster");
    (client_for(&cluster), cluster)
}
