//! Integration tests for upload followed by download, delete and stat

mod common;

use ::common::prelude::*;

#[tokio::test]
async fn test_upload_download_delete_scenario() {
    let (client, cluster) = common::setup_test_env();

    let blob = Blob::new("a.txt", "hello");
    assert_eq!(blob.ext(), "txt");

    let reference = client.upload(&blob, &Metadata::author("wu")).await.unwrap();
    assert_eq!(reference.group(), "group1");
    assert!(!reference.remote_name().is_empty());
    assert!(reference.remote_name().contains("txt"));
    assert_eq!(
        cluster.metadata(&reference).unwrap().get("author"),
        Some("wu")
    );

    let content = client.download(&reference).await.unwrap();
    assert_eq!(content.as_ref(), b"hello");

    client.delete(&reference).await.unwrap();

    let err = client.download(&reference).await.unwrap_err();
    assert!(matches!(err, ClientError::ObjectNotFound { .. }));
}

#[tokio::test]
async fn test_roundtrip_preserves_bytes() {
    let (client, _cluster) = common::setup_test_env();

    let payloads: Vec<(&str, Vec<u8>)> = vec![
        ("one.bin", vec![0u8]),
        ("text.md", b"# heading\n\nbody".to_vec()),
        ("binary.dat", (0..=255u8).collect()),
        ("large.img", vec![0xab; 256 * 1024]),
        ("noext", b"no extension".to_vec()),
    ];

    for (name, content) in payloads {
        let reference = common::put(&client, name, &content).await;
        let downloaded = client.download(&reference).await.unwrap();
        assert_eq!(downloaded.as_ref(), content.as_slice(), "{name}");
    }
}

#[tokio::test]
async fn test_upload_without_extension() {
    let (client, _cluster) = common::setup_test_env();

    let reference = common::put(&client, "Makefile", b"all:").await;
    assert!(!reference.remote_name().contains('.'));
}

#[tokio::test]
async fn test_each_upload_stores_one_object() {
    let (client, cluster) = common::setup_test_env();

    let first = common::put(&client, "a.txt", b"same").await;
    let second = common::put(&client, "a.txt", b"same").await;

    assert_ne!(first, second);
    assert_eq!(cluster.object_count(), 2);
}

#[tokio::test]
async fn test_stat_after_upload() {
    let (client, _cluster) = common::setup_test_env();

    let reference = common::put(&client, "a.txt", b"hello").await;
    let info = client.stat(&reference).await.unwrap();

    assert_eq!(info.size, 5);
    assert_eq!(info.source_ip_addr, common::STORAGE_HOST);
    assert_eq!(info.crc32, 0x3610a686);
}

#[tokio::test]
async fn test_public_url_for_uploaded_object() {
    let (client, _cluster) = common::setup_test_env();

    let reference = common::put(&client, "a.txt", b"hello").await;
    let url = client.public_url(&reference).await.unwrap();

    assert_eq!(
        url,
        format!("http://10.0.0.5:8888/group1/{}", reference.remote_name())
    );
}
