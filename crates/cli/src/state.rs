use std::{fs, path::PathBuf};

use common::config::ClientConfig;
use object_store::{ClusterConfig, LocalCluster, ObjectStoreConfig, StoreError};
use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "trackfs";
pub const CONFIG_FILE_NAME: &str = "trackfs.toml";
pub const DB_FILE_NAME: &str = "objects.db";
pub const OBJECTS_DIR_NAME: &str = "objects";

/// Everything `trackfs.toml` holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// How the client reaches the tracker
    #[serde(default)]
    pub client: ClientConfig,
    /// Trackers and groups the embedded cluster serves
    #[serde(default)]
    pub cluster: ClusterConfig,
    /// Where the embedded cluster keeps object bytes
    #[serde(default)]
    pub storage: ObjectStoreConfig,
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the trackfs directory (~/.trackfs)
    pub trackfs_dir: PathBuf,
    /// Path to the SQLite database
    pub db_path: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the trackfs directory path (custom or default ~/.trackfs)
    pub fn trackfs_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new trackfs directory.
    ///
    /// With no storage configured the cluster keeps object bytes under
    /// `<dir>/objects`, so they survive between invocations.
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let trackfs_dir = Self::trackfs_dir(custom_path)?;
        let config_path = trackfs_dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            return Err(StateError::AlreadyInitialized);
        }

        fs::create_dir_all(&trackfs_dir)?;

        let mut config = config.unwrap_or_default();
        if config.storage == ObjectStoreConfig::Memory {
            config.storage = ObjectStoreConfig::Local {
                path: trackfs_dir.join(OBJECTS_DIR_NAME),
            };
        }
        config
            .client
            .validate()
            .map_err(|e| StateError::InvalidConfig(e.to_string()))?;

        let config_toml = toml::to_string_pretty(&config)?;
        fs::write(&config_path, config_toml)?;

        Ok(Self {
            db_path: trackfs_dir.join(DB_FILE_NAME),
            trackfs_dir,
            config_path,
            config,
        })
    }

    /// Load existing state from the trackfs directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let trackfs_dir = Self::trackfs_dir(custom_path)?;
        let config_path = trackfs_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Err(StateError::NotInitialized);
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;

        Ok(Self {
            db_path: trackfs_dir.join(DB_FILE_NAME),
            trackfs_dir,
            config_path,
            config,
        })
    }

    /// Bring up the embedded cluster described by the config.
    pub async fn cluster(&self) -> Result<LocalCluster, StateError> {
        let cluster = LocalCluster::new(
            &self.db_path,
            self.config.storage.clone(),
            self.config.cluster.clone(),
        )
        .await?;
        Ok(cluster)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("trackfs directory not initialized. Run 'trackfs init' first")]
    NotInitialized,

    #[error("trackfs directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("cluster error: {0}")]
    Cluster(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}
