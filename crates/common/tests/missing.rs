//! Integration tests for references that point at nothing

mod common;

use ::common::prelude::*;

fn ghost() -> ObjectReference {
    ObjectReference::new(common::GROUP, "M00/00/00/does-not-exist.txt").unwrap()
}

#[tokio::test]
async fn test_download_missing_object() {
    let (client, _cluster) = common::setup_test_env();

    let err = client.download(&ghost()).await.unwrap_err();
    match err {
        ClientError::ObjectNotFound { reference, .. } => assert_eq!(reference, ghost()),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_stat_missing_object() {
    let (client, _cluster) = common::setup_test_env();

    let err = client.stat(&ghost()).await.unwrap_err();
    assert!(matches!(err, ClientError::ObjectNotFound { .. }));
    assert_eq!(err.backend_code(), Some(2));
}

#[tokio::test]
async fn test_delete_missing_object_succeeds() {
    let (client, cluster) = common::setup_test_env();

    client.delete(&ghost()).await.unwrap();
    assert_eq!(cluster.counters().deletes, 1);
}

#[tokio::test]
async fn test_unknown_group() {
    let (client, cluster) = common::setup_test_env();
    let reference = ObjectReference::new("group7", "M00/00/00/x.txt").unwrap();

    let err = client.download(&reference).await.unwrap_err();
    assert!(matches!(err, ClientError::UnknownGroup { .. }));
    assert_eq!(cluster.counters().storage_calls(), 0);
}
