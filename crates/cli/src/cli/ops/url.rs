use clap::Args;

use common::prelude::{ClientError, ObjectReference};

use crate::state::StateError;

#[derive(Args, Debug, Clone)]
pub struct Url {
    /// Object reference, `group/remote_name`
    pub reference: ObjectReference,
}

#[derive(Debug, thiserror::Error)]
pub enum UrlError {
    #[error("{0}")]
    State(#[from] StateError),
    #[error("could not build URL: {0}")]
    Client(#[from] ClientError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Url {
    type Error = UrlError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let session = ctx.connect().await?;
        Ok(session.client.public_url(&self.reference).await?)
    }
}
