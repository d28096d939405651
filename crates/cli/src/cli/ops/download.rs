use std::path::PathBuf;

use clap::Args;

use common::prelude::{ClientError, ObjectReference};

use crate::state::StateError;

#[derive(Args, Debug, Clone)]
pub struct Download {
    /// Object reference, `group/remote_name`
    pub reference: ObjectReference,

    /// Where to write the object (defaults to the last segment of the remote name)
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("{0}")]
    State(#[from] StateError),
    #[error("download failed: {0}")]
    Client(#[from] ClientError),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Download {
    fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            let remote_name = self.reference.remote_name();
            let file_name = remote_name.rsplit('/').next().unwrap_or(remote_name);
            PathBuf::from(file_name)
        })
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Download {
    type Error = DownloadError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let session = ctx.connect().await?;
        let content = session.client.download(&self.reference).await?;

        let path = self.output_path();
        tokio::fs::write(&path, &content)
            .await
            .map_err(|source| DownloadError::Write {
                path: path.clone(),
                source,
            })?;

        Ok(format!("Wrote {} bytes to {}", content.len(), path.display()))
    }
}
