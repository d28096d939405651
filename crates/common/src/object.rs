//! # Objects
//!
//! The values that cross the client boundary:
//!
//! - **[`Blob`]**: file bytes plus the name and extension they are uploaded under
//! - **[`Metadata`]**: ordered key/value pairs stored alongside an object
//! - **[`ObjectReference`]**: the `(group, remote name)` pair that addresses a stored object
//! - **[`StorageEndpoint`]**: a storage node address handed out by the tracker
//! - **[`ObjectInfo`]**: what a storage node reports about a stored object
//!
//! None of these are mutated after construction.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// File content to upload, with the name it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    name: String,
    content: Bytes,
    ext: String,
}

impl Blob {
    /// Build a blob, deriving the extension from the final `.` of `name`.
    ///
    /// A name without a `.` gets an empty extension.
    pub fn new(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        let name = name.into();
        let ext = extension_of(&name).to_string();
        Self {
            name,
            content: content.into(),
            ext,
        }
    }

    /// Read a file from disk into a blob named after the file.
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let content = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(name, content))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    /// Extension without the leading dot, possibly empty.
    pub fn ext(&self) -> &str {
        &self.ext
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Everything after the last `.` in `name`, or `""` if there is none.
pub fn extension_of(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) => &name[idx + 1..],
        None => "",
    }
}

/// Ordered key/value pairs attached to an object at upload time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata(Vec<(String, String)>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// The single `author` pair the upload form attaches.
    pub fn author(name: impl Into<String>) -> Self {
        Self::new().with("author", name)
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.push((key.into(), value.into()));
        self
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Address of a stored object: the group that holds it and the name the
/// storage node assigned to it.
///
/// Neither half locates anything on its own, so both are required and
/// non-empty. The textual form is `{group}/{remote_name}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawObjectReference")]
pub struct ObjectReference {
    group: String,
    remote_name: String,
}

/// Unchecked wire shape of [`ObjectReference`].
#[derive(Deserialize)]
struct RawObjectReference {
    group: String,
    remote_name: String,
}

impl TryFrom<RawObjectReference> for ObjectReference {
    type Error = ClientError;

    fn try_from(raw: RawObjectReference) -> Result<Self, Self::Error> {
        Self::new(raw.group, raw.remote_name)
    }
}

impl ObjectReference {
    pub fn new(
        group: impl Into<String>,
        remote_name: impl Into<String>,
    ) -> Result<Self, ClientError> {
        let group = group.into();
        let remote_name = remote_name.into();
        // the textual form splits at the first '/', so the group can't hold one
        if group.is_empty() || group.contains('/') || remote_name.is_empty() {
            return Err(ClientError::InvalidReference(format!(
                "{}/{}",
                group, remote_name
            )));
        }
        Ok(Self { group, remote_name })
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn remote_name(&self) -> &str {
        &self.remote_name
    }

    /// Browser-fetchable location of the object on a storage node's HTTP port.
    pub fn public_url(&self, host: &str, http_port: u16) -> String {
        format!(
            "http://{}:{}/{}/{}",
            host, http_port, self.group, self.remote_name
        )
    }
}

impl fmt::Display for ObjectReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.group, self.remote_name)
    }
}

impl FromStr for ObjectReference {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((group, remote_name)) => Self::new(group, remote_name),
            None => Err(ClientError::InvalidReference(s.to_string())),
        }
    }
}

/// A storage node, as reported by the tracker for one operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorageEndpoint {
    pub host: String,
    pub port: u16,
}

impl StorageEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for StorageEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Stat result for a stored object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectInfo {
    pub size: u64,
    pub create_time: DateTime<Utc>,
    /// Address of the storage node the object was first written to.
    pub source_ip_addr: String,
    pub crc32: u32,
}

impl fmt::Display for ObjectInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "size={}, create_time={}, source_ip_addr={}, crc32={:08x}",
            self.size,
            self.create_time.to_rfc3339(),
            self.source_ip_addr,
            self.crc32
        )
    }
}
