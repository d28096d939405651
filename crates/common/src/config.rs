//! Client configuration.
//!
//! Built once by the caller and handed to the [`EndpointResolver`](crate::resolver::EndpointResolver).
//! Can be read from TOML or from a classic `key = value` client conf file.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Tracker addresses as `host:port`. Only the first one is contacted.
    pub tracker_servers: Vec<String>,
    /// Seconds allowed for opening a tracker connection
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Seconds allowed for a single request/response exchange
    #[serde(default = "default_network_timeout")]
    pub network_timeout_secs: u64,
    /// Port storage nodes serve objects on over plain HTTP.
    /// Independent of the port used to talk to trackers and storage nodes.
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default = "default_charset")]
    pub charset: String,
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_network_timeout() -> u64 {
    30
}

fn default_http_port() -> u16 {
    8888
}

fn default_charset() -> String {
    "UTF-8".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            tracker_servers: vec!["127.0.0.1:22122".to_string()],
            connect_timeout_secs: default_connect_timeout(),
            network_timeout_secs: default_network_timeout(),
            http_port: default_http_port(),
            charset: default_charset(),
        }
    }
}

impl ClientConfig {
    pub fn new(tracker_servers: Vec<String>) -> Self {
        Self {
            tracker_servers,
            ..Default::default()
        }
    }

    pub fn with_http_port(mut self, http_port: u16) -> Self {
        self.http_port = http_port;
        self
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(s).map_err(|e| ClientError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a classic client conf file:
    ///
    /// ```text
    /// connect_timeout = 2
    /// network_timeout = 30
    /// charset = UTF-8
    /// http.tracker_http_port = 8888
    /// tracker_server = 192.168.1.10:22122
    /// ```
    ///
    /// Repeated `tracker_server` lines accumulate; unknown keys are ignored.
    pub fn from_fdfs_conf(s: &str) -> Result<Self> {
        let mut config = Self {
            tracker_servers: Vec::new(),
            ..Default::default()
        };

        for (lineno, line) in s.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(ClientError::InvalidConfig(format!(
                    "line {}: expected 'key = value'",
                    lineno + 1
                )));
            };
            let (key, value) = (key.trim(), value.trim());
            let bad_number = |_: std::num::ParseIntError| {
                ClientError::InvalidConfig(format!(
                    "line {}: '{}' is not a number",
                    lineno + 1,
                    value
                ))
            };
            match key {
                "tracker_server" => config.tracker_servers.push(value.to_string()),
                "connect_timeout" => {
                    config.connect_timeout_secs = value.parse::<u64>().map_err(bad_number)?
                }
                "network_timeout" => {
                    config.network_timeout_secs = value.parse::<u64>().map_err(bad_number)?
                }
                "http.tracker_http_port" => {
                    config.http_port = value.parse::<u16>().map_err(bad_number)?
                }
                "charset" => config.charset = value.to_string(),
                _ => {
                    tracing::debug!(key, "ignoring unknown client conf key");
                }
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Load from a file; `.conf` files use the classic format, anything else is TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ClientError::InvalidConfig(format!("reading {}: {}", path.display(), e))
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("conf") => Self::from_fdfs_conf(&contents),
            _ => Self::from_toml_str(&contents),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.tracker_servers.is_empty() {
            return Err(ClientError::InvalidConfig(
                "at least one tracker_server is required".to_string(),
            ));
        }
        for tracker in &self.tracker_servers {
            // host names are allowed, so only the port is checked strictly
            let Some((host, port)) = tracker.rsplit_once(':') else {
                return Err(ClientError::InvalidConfig(format!(
                    "tracker '{}' is not host:port",
                    tracker
                )));
            };
            if host.is_empty() || (host.contains(':') && tracker.parse::<SocketAddr>().is_err()) {
                return Err(ClientError::InvalidConfig(format!(
                    "tracker '{}' has an invalid host",
                    tracker
                )));
            }
            match port.parse::<u16>() {
                Ok(0) | Err(_) => {
                    return Err(ClientError::InvalidConfig(format!(
                        "tracker '{}' has an invalid port",
                        tracker
                    )))
                }
                Ok(_) => {}
            }
        }
        if self.http_port == 0 {
            return Err(ClientError::InvalidConfig(
                "http_port must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// The tracker every resolve goes to.
    pub fn primary_tracker(&self) -> Option<&str> {
        self.tracker_servers.first().map(String::as_str)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn network_timeout(&self) -> Duration {
        Duration::from_secs(self.network_timeout_secs)
    }

    /// Budget for one tracker round trip: connect plus one exchange.
    pub fn tracker_timeout(&self) -> Duration {
        self.connect_timeout().saturating_add(self.network_timeout())
    }
}
