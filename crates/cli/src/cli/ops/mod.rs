pub mod delete;
pub mod download;
pub mod init;
pub mod stat;
pub mod upload;
pub mod url;

pub use delete::Delete;
pub use download::Download;
pub use init::Init;
pub use stat::Stat;
pub use upload::Upload;
pub use url::Url;

/// A context over a freshly initialized trackfs directory.
#[cfg(test)]
pub(crate) fn test_context() -> (tempfile::TempDir, crate::cli::op::OpContext) {
    let temp_dir = tempfile::tempdir().unwrap();
    let dir = temp_dir.path().join("trackfs");
    crate::state::AppState::init(Some(dir.clone()), None).unwrap();
    (temp_dir, crate::cli::op::OpContext::new(Some(dir)))
}
