use clap::Args;

use common::config::ClientConfig;
use object_store::ClusterConfig;

use crate::state::{AppConfig, AppState};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Tracker address the client contacts and the embedded cluster answers on
    #[arg(long, default_value = "127.0.0.1:22122")]
    pub tracker: String,

    /// Port storage nodes serve objects on over HTTP, used for public URLs
    #[arg(long, default_value_t = 8888)]
    pub http_port: u16,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] crate::state::StateError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let config = AppConfig {
            client: ClientConfig::new(vec![self.tracker.clone()]).with_http_port(self.http_port),
            cluster: ClusterConfig {
                trackers: vec![self.tracker.clone()],
                ..ClusterConfig::default()
            },
            storage: Default::default(),
        };

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;

        let groups = state
            .config
            .cluster
            .groups
            .iter()
            .map(|g| g.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let output = format!(
            "Initialized trackfs directory at: {}\n\
             - Database: {}\n\
             - Config: {}\n\
             - Tracker: {}\n\
             - Groups: {}",
            state.trackfs_dir.display(),
            state.db_path.display(),
            state.config_path.display(),
            self.tracker,
            groups
        );

        Ok(output)
    }
}
