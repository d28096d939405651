use std::path::PathBuf;

use clap::Args;

use common::prelude::{Blob, ClientError, Metadata};

use crate::state::StateError;

#[derive(Args, Debug, Clone)]
pub struct Upload {
    /// File to upload
    pub path: PathBuf,

    /// Recorded as the `author` metadata entry
    #[arg(long)]
    pub author: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("{0}")]
    State(#[from] StateError),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{0} is empty, nothing to upload")]
    EmptyFile(PathBuf),
    #[error("upload failed: {0}")]
    Client(#[from] ClientError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Upload {
    type Error = UploadError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let blob = Blob::from_path(&self.path)
            .await
            .map_err(|source| UploadError::Read {
                path: self.path.clone(),
                source,
            })?;
        if blob.is_empty() {
            return Err(UploadError::EmptyFile(self.path.clone()));
        }

        let metadata = match &self.author {
            Some(author) => Metadata::author(author.clone()),
            None => Metadata::new(),
        };

        let session = ctx.connect().await?;
        let reference = session.client.upload(&blob, &metadata).await?;
        let url = session.client.public_url(&reference).await?;

        Ok(format!("{}\n{}", reference, url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::op::Op;
    use crate::cli::ops::test_context;

    #[tokio::test]
    async fn test_upload_prints_reference_and_url() {
        let (temp_dir, ctx) = test_context();
        let path = temp_dir.path().join("hello.txt");
        std::fs::write(&path, "hello").unwrap();

        let upload = Upload {
            path,
            author: Some("wu".to_string()),
        };
        let output = upload.execute(&ctx).await.unwrap();

        let mut lines = output.lines();
        let reference = lines.next().unwrap();
        assert!(reference.starts_with("group1/M00/"));
        assert!(reference.ends_with(".txt"));
        assert_eq!(
            lines.next().unwrap(),
            format!("http://127.0.0.1:8888/{}", reference)
        );
    }

    #[tokio::test]
    async fn test_empty_file_rejected() {
        let (temp_dir, ctx) = test_context();
        let path = temp_dir.path().join("empty.txt");
        std::fs::write(&path, "").unwrap();

        let upload = Upload { path, author: None };
        let err = upload.execute(&ctx).await.unwrap_err();
        assert!(matches!(err, UploadError::EmptyFile(_)));
        assert!(err.to_string().contains("is empty"));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let (temp_dir, ctx) = test_context();
        let upload = Upload {
            path: temp_dir.path().join("nope"),
            author: None,
        };
        assert!(matches!(
            upload.execute(&ctx).await,
            Err(UploadError::Read { .. })
        ));
    }
}
