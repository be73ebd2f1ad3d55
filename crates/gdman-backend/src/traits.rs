use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::ManagerError;
use crate::types::{RawRelease, ReleaseSource, RemoteVersion, UninstallPrompt};

/// Receives the size of every chunk read from the network.
pub type ProgressFn = Arc<dyn Fn(u64) + Send + Sync>;

pub fn no_progress() -> ProgressFn {
    Arc::new(|_| {})
}

#[async_trait]
pub trait ReleaseApi: Send + Sync + ReleaseApiClone {
    fn source(&self) -> ReleaseSource;

    async fn releases(
        &self,
        per_page: usize,
        page: usize,
        progress: &ProgressFn,
    ) -> Result<Vec<RawRelease>, ManagerError>;

    async fn latest_release(&self, progress: &ProgressFn) -> Result<RawRelease, ManagerError>;
}

pub trait ReleaseApiClone: Send + Sync {
    fn clone_box(&self) -> Box<dyn ReleaseApi>;
}

impl<T> ReleaseApiClone for T
where
    T: 'static + ReleaseApi + Clone,
{
    fn clone_box(&self) -> Box<dyn ReleaseApi> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn ReleaseApi> {
    fn clone(&self) -> Box<dyn ReleaseApi> {
        self.clone_box()
    }
}

#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub version: RemoteVersion,
    pub mono: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DownloadedBuild {
    pub location: PathBuf,
    pub cache_location: PathBuf,
    pub source_url: String,
}

#[async_trait]
pub trait Downloader: Send + Sync {
    async fn download(
        &self,
        request: &DownloadRequest,
        progress: &ProgressFn,
    ) -> Result<DownloadedBuild, ManagerError>;
}

pub trait FileSystem: Send + Sync {
    fn enumerate_directories(&self, path: &Path) -> Result<Vec<PathBuf>, ManagerError>;

    fn enumerate_files(&self, path: &Path) -> Result<Vec<PathBuf>, ManagerError>;

    /// Removes a single file or an empty directory.
    fn remove_path(&self, path: &Path) -> Result<(), ManagerError>;
}

#[async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm(&self, prompt: &UninstallPrompt) -> bool;
}
