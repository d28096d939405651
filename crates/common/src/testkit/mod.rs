/// In-process fake tracker and storage nodes for client tests
///
/// [`TestCluster`] implements [`Transport`](crate::transport::Transport)
/// entirely in memory. It counts every call it receives, can be taken
/// offline or made to hang, and can be told to fail the next call of a
/// given kind, which is everything the client tests need to check that
/// failures surface with the right kind and that nothing is contacted
/// when it should not be.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use common::prelude::*;
/// use common::testkit::TestCluster;
///
/// #[tokio::test]
/// async fn test_roundtrip() -> anyhow::Result<()> {
///     let cluster = TestCluster::single_group("group1", "10.0.0.5", 23000);
///     let client = ObjectStoreClient::new(cluster.client_config(), Arc::new(cluster.clone()))?;
///
///     let reference = client.upload(&Blob::new("a.txt", "hello"), &Metadata::author("wu")).await?;
///     assert_eq!(client.download(&reference).await?, "hello");
///     Ok(())
/// }
/// ```
mod cluster;

pub use cluster::{CallCounters, Fault, TestCluster, TEST_TRACKER};
