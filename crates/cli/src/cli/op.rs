use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use common::prelude::ObjectStoreClient;
use object_store::LocalCluster;

use crate::state::{AppState, StateError};

#[derive(Clone)]
pub struct OpContext {
    /// Optional custom trackfs directory (defaults to ~/.trackfs)
    pub config_path: Option<PathBuf>,
}

impl OpContext {
    pub fn new(config_path: Option<PathBuf>) -> Self {
        Self { config_path }
    }

    /// Load the state, start the embedded cluster and point a client at it.
    pub async fn connect(&self) -> Result<Session, StateError> {
        let state = AppState::load(self.config_path.clone())?;
        let cluster = state.cluster().await?;
        let client = ObjectStoreClient::new(state.config.client.clone(), Arc::new(cluster.clone()))
            .map_err(|e| StateError::InvalidConfig(e.to_string()))?;
        Ok(Session { client, cluster })
    }
}

/// A client plus the cluster it talks to.
pub struct Session {
    pub client: ObjectStoreClient,
    pub cluster: LocalCluster,
}

#[async_trait::async_trait]
pub trait Op: Send + Sync {
    type Error: Error + Send + Sync + 'static;
    type Output;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}

#[macro_export]
macro_rules! command_enum {
    ($(($variant:ident, $type:ty)),* $(,)?) => {
        #[derive(Subcommand, Debug, Clone)]
        pub enum Command {
            $($variant($type),)*
        }

        #[derive(Debug)]
        pub enum OpOutput {
            $($variant(<$type as $crate::cli::op::Op>::Output),)*
        }

        #[derive(Debug, thiserror::Error)]
        pub enum OpError {
            $(
                #[error(transparent)]
                $variant(<$type as $crate::cli::op::Op>::Error),
            )*
        }

        #[async_trait::async_trait]
        impl $crate::cli::op::Op for Command {
            type Output = OpOutput;
            type Error = OpError;

            async fn execute(&self, ctx: &$crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
                match self {
                    $(
                        Command::$variant(op) => {
                            op.execute(ctx).await
                                .map(OpOutput::$variant)
                                .map_err(OpError::$variant)
                        },
                    )*
                }
            }
        }

        impl std::fmt::Display for OpOutput {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        OpOutput::$variant(output) => write!(f, "{}", output),
                    )*
                }
            }
        }
    };
}
