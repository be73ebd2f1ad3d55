use async_trait::async_trait;
use log::{debug, info, warn};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use gdman_backend::{DownloadRequest, DownloadedBuild, Downloader, ManagerError, ProgressFn};

const USER_AGENT: &str = concat!("gdman/", env!("CARGO_PKG_VERSION"));

/// Streams an engine archive into the downloads directory and unpacks it
/// into its own folder under the versions directory.
#[derive(Clone)]
pub struct HttpDownloader {
    client: reqwest::Client,
    versions_dir: PathBuf,
    downloads_dir: PathBuf,
}

impl HttpDownloader {
    pub fn new(versions_dir: PathBuf, downloads_dir: PathBuf) -> Self {
        Self {
            client: reqwest::Client::new(),
            versions_dir,
            downloads_dir,
        }
    }

    pub fn install_dir_name(request: &DownloadRequest) -> String {
        let name: String = request
            .version
            .name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        if request.mono {
            format!("godot-{}-mono", name)
        } else {
            format!("godot-{}", name)
        }
    }

    async fn fetch_and_unpack(
        &self,
        url: &str,
        expected: u64,
        archive: &Path,
        dest: &Path,
        progress: &ProgressFn,
    ) -> Result<(), ManagerError> {
        let mut response = self
            .client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .map_err(failed)?;

        if !response.status().is_success() {
            return Err(failed(format!("{} returned {}", url, response.status())));
        }

        let mut file = tokio::fs::File::create(archive).await.map_err(failed)?;
        let mut received: u64 = 0;
        while let Some(chunk) = response.chunk().await.map_err(failed)? {
            file.write_all(&chunk).await.map_err(failed)?;
            received += chunk.len() as u64;
            progress(chunk.len() as u64);
        }
        file.flush().await.map_err(failed)?;
        debug!("Received {} of {} bytes", received, expected);

        let archive = archive.to_path_buf();
        let dest = dest.to_path_buf();
        tokio::task::spawn_blocking(move || extract_zip(&archive, &dest))
            .await
            .map_err(failed)?
    }
}

fn failed(e: impl Display) -> ManagerError {
    ManagerError::DownloadFailed(e.to_string())
}

fn extract_zip(archive: &Path, dest: &Path) -> Result<(), ManagerError> {
    let file = std::fs::File::open(archive).map_err(failed)?;
    let mut zip = zip::ZipArchive::new(file).map_err(failed)?;
    std::fs::create_dir_all(dest).map_err(failed)?;
    zip.extract(dest).map_err(failed)
}

/// Removes whatever a failed download left in the cache and versions dirs.
fn discard_partial(archive: &Path, dest: &Path) {
    if archive.exists() && std::fs::remove_file(archive).is_err() {
        warn!("Could not remove partial archive {:?}", archive);
    }
    if dest.exists() && std::fs::remove_dir_all(dest).is_err() {
        warn!("Could not remove partial install {:?}", dest);
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn download(
        &self,
        request: &DownloadRequest,
        progress: &ProgressFn,
    ) -> Result<DownloadedBuild, ManagerError> {
        let asset = request.version.asset(request.mono).ok_or_else(|| {
            failed(format!(
                "{} has no archive for this platform",
                request.version.name
            ))
        })?;

        tokio::fs::create_dir_all(&self.downloads_dir)
            .await
            .map_err(failed)?;
        let cache_location = self.downloads_dir.join(&asset.name);
        let location = self.versions_dir.join(Self::install_dir_name(request));

        info!("Downloading {} to {:?}", asset.url, cache_location);
        if let Err(e) = self
            .fetch_and_unpack(&asset.url, asset.size, &cache_location, &location, progress)
            .await
        {
            warn!("Download of {} failed: {}", asset.name, e);
            let archive = cache_location.clone();
            let dest = location.clone();
            let _ = tokio::task::spawn_blocking(move || discard_partial(&archive, &dest)).await;
            return Err(e);
        }

        info!("Extracted {} into {:?}", asset.name, location);
        Ok(DownloadedBuild {
            location,
            cache_location,
            source_url: asset.url.clone(),
        })
    }
}
