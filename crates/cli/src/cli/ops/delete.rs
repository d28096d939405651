use clap::Args;

use common::prelude::{ClientError, ObjectReference};

use crate::state::StateError;

#[derive(Args, Debug, Clone)]
pub struct Delete {
    /// Object reference, `group/remote_name`
    pub reference: ObjectReference,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteError {
    #[error("{0}")]
    State(#[from] StateError),
    #[error("delete failed: {0}")]
    Client(#[from] ClientError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Delete {
    type Error = DeleteError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let session = ctx.connect().await?;
        session.client.delete(&self.reference).await?;
        Ok(format!("Deleted {}", self.reference))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::op::Op;
    use crate::cli::ops::{test_context, Download, Upload};

    #[tokio::test]
    async fn test_delete_then_download_fails() {
        let (temp_dir, ctx) = test_context();
        let source = temp_dir.path().join("a.txt");
        std::fs::write(&source, "bye").unwrap();

        let output = Upload {
            path: source,
            author: None,
        }
        .execute(&ctx)
        .await
        .unwrap();
        let reference: ObjectReference = output.lines().next().unwrap().parse().unwrap();

        let delete = Delete {
            reference: reference.clone(),
        };
        assert_eq!(
            delete.execute(&ctx).await.unwrap(),
            format!("Deleted {}", reference)
        );
        // already gone is still fine
        delete.execute(&ctx).await.unwrap();

        let download = Download {
            reference,
            output: Some(temp_dir.path().join("out")),
        };
        assert!(download.execute(&ctx).await.is_err());
    }
}
