use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ManagerError {
    #[error("Failed to reach the release API: {0}")]
    ConnectionFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Failed to remove {}: {reason}", path.display())]
    FilesystemRemovalFailed { path: PathBuf, reason: String },

    #[error("Version not found: {0}")]
    VersionNotFound(String),

    #[error("Version is busy: {0}")]
    EntryBusy(String),

    #[error("Already installed: {0}")]
    AlreadyInstalled(String),

    #[error("Failed to persist database: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ManagerError {
    fn from(err: std::io::Error) -> Self {
        ManagerError::Io(err.to_string())
    }
}
