use clap::Args;

use common::prelude::{ClientError, ObjectReference};

use crate::state::StateError;

#[derive(Args, Debug, Clone)]
pub struct Stat {
    /// Object reference, `group/remote_name`
    pub reference: ObjectReference,
}

#[derive(Debug, thiserror::Error)]
pub enum StatError {
    #[error("{0}")]
    State(#[from] StateError),
    #[error("stat failed: {0}")]
    Client(#[from] ClientError),
    #[error("failed to read metadata: {0}")]
    Metadata(#[from] object_store::StoreError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Stat {
    type Error = StatError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let session = ctx.connect().await?;
        let info = session.client.stat(&self.reference).await?;
        let metadata = session.cluster.metadata(&self.reference).await?;

        let mut lines = vec![
            format!("Object: {}", self.reference),
            format!("  size:       {} bytes", info.size),
            format!("  created:    {}", info.create_time.to_rfc3339()),
            format!("  source:     {}", info.source_ip_addr),
            format!("  crc32:      {:08x}", info.crc32),
        ];
        if !metadata.is_empty() {
            lines.push("Metadata:".to_string());
            lines.extend(metadata.iter().map(|(k, v)| format!("  {}: {}", k, v)));
        }

        Ok(lines.join("\n"))
    }
}
