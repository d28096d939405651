//! Shared test utilities for client integration tests
#![allow(dead_code)]

use std::sync::Arc;

use common::prelude::*;
use common::testkit::TestCluster;

pub const GROUP: &str = "group1";
pub const STORAGE_HOST: &str = "10.0.0.5";
pub const STORAGE_PORT: u16 = 23000;

/// A one-group fake cluster and a client pointed at it
pub fn setup_test_env() -> (ObjectStoreClient, TestCluster) {
    let cluster = TestCluster::single_group(GROUP, STORAGE_HOST, STORAGE_PORT);
    let client = client_for(&cluster);
    (client, cluster)
}

pub fn client_for(cluster: &TestCluster) -> ObjectStoreClient {
    ObjectStoreClient::new(cluster.client_config(), Arc::new(cluster.clone())).unwrap()
}

/// Upload `content` as `name` and return the reference
pub async fn put(client: &ObjectStoreClient, name: &str, content: &[u8]) -> ObjectReference {
    client
        .upload(&Blob::new(name, content.to_vec()), &Metadata::author("wu"))
        .await
        .unwrap()
}
