use async_trait::async_trait;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use gdman_backend::{
    Confirm, DownloadRequest, DownloadedBuild, Downloader, FileSystem, InstalledVersion,
    ManagerError, ProgressFn, ProjectReference, RawAsset, RawRelease, ReleaseApi, ReleaseSource,
    RemoteVersion, UninstallPrompt,
};

use crate::manager::VersionManager;
use crate::reconcile::normalize;
use crate::store::{Database, Store};

const PLATFORM_SUFFIXES: &[&str] = &[
    "linux.x86_64.zip",
    "mono_linux_x86_64.zip",
    "linux.arm64.zip",
    "mono_linux_arm64.zip",
    "win64.exe.zip",
    "mono_win64.zip",
    "macos.universal.zip",
    "mono_macos.universal.zip",
];

pub fn raw_release(id: u64, name: &str) -> RawRelease {
    RawRelease {
        id,
        name: Some(name.to_string()),
        tag_name: name.to_string(),
        published_at: None,
        body: None,
        html_url: None,
        assets: PLATFORM_SUFFIXES
            .iter()
            .map(|suffix| {
                let file = format!("Godot_v{}_{}", name, suffix);
                RawAsset {
                    browser_download_url: format!("https://example.com/{}", file),
                    name: file,
                    size: 1024,
                }
            })
            .collect(),
    }
}

pub fn remote_version(name: &str) -> RemoteVersion {
    normalize(&raw_release(1, name), ReleaseSource::Github)
}

pub fn installed_version(name: &str) -> InstalledVersion {
    InstalledVersion {
        id: Uuid::new_v4(),
        tag: name.to_string(),
        location: PathBuf::from(format!("/versions/godot-{}", name)),
        cache_location: PathBuf::from(format!("/downloads/{}.zip", name)),
        is_mono: false,
        remote: Some(remote_version(name)),
        source: format!("https://example.com/{}.zip", name),
        installed_at: None,
    }
}

pub fn local_reference(name: &str, path: &str) -> InstalledVersion {
    InstalledVersion {
        id: Uuid::new_v4(),
        tag: name.to_string(),
        location: PathBuf::from(path),
        cache_location: PathBuf::new(),
        is_mono: false,
        remote: None,
        source: path.to_string(),
        installed_at: None,
    }
}

pub fn project(name: &str, engine: Option<Uuid>) -> ProjectReference {
    ProjectReference {
        id: Uuid::new_v4(),
        name: name.to_string(),
        location: PathBuf::from(format!("/projects/{}", name)),
        engine,
    }
}

#[derive(Default)]
struct ApiCalls {
    pages: Vec<usize>,
    latest: usize,
}

#[derive(Clone)]
pub struct FakeApi {
    page_sizes: Vec<usize>,
    fail_page: Option<usize>,
    latest: Option<String>,
    calls: Arc<Mutex<ApiCalls>>,
}

impl FakeApi {
    pub fn with_page_sizes(sizes: &[usize]) -> Self {
        Self {
            page_sizes: sizes.to_vec(),
            fail_page: None,
            latest: Some("latest-stable".to_string()),
            calls: Arc::default(),
        }
    }

    pub fn with_latest(mut self, name: &str) -> Self {
        self.latest = Some(name.to_string());
        self
    }

    pub fn failing_latest(mut self) -> Self {
        self.latest = None;
        self
    }

    pub fn failing_on_page(mut self, page: usize) -> Self {
        self.fail_page = Some(page);
        self
    }

    pub fn pages_requested(&self) -> Vec<usize> {
        self.calls.lock().unwrap().pages.clone()
    }

    pub fn latest_calls(&self) -> usize {
        self.calls.lock().unwrap().latest
    }

    pub fn bytes_per_page(&self) -> u64 {
        128
    }
}

#[async_trait]
impl ReleaseApi for FakeApi {
    fn source(&self) -> ReleaseSource {
        ReleaseSource::Github
    }

    async fn releases(
        &self,
        _per_page: usize,
        page: usize,
        progress: &ProgressFn,
    ) -> Result<Vec<RawRelease>, ManagerError> {
        self.calls.lock().unwrap().pages.push(page);
        progress(self.bytes_per_page());

        if self.fail_page == Some(page) {
            return Err(ManagerError::ConnectionFailed("offline".to_string()));
        }

        let size = self.page_sizes.get(page - 1).copied().unwrap_or(0);
        Ok((0..size)
            .map(|i| raw_release((page * 100 + i) as u64, &format!("release-{}-{}", page, i)))
            .collect())
    }

    async fn latest_release(&self, progress: &ProgressFn) -> Result<RawRelease, ManagerError> {
        self.calls.lock().unwrap().latest += 1;
        progress(self.bytes_per_page());

        match &self.latest {
            Some(name) => Ok(raw_release(999, name)),
            None => Err(ManagerError::ConnectionFailed("offline".to_string())),
        }
    }
}

pub struct FakeDownloader {
    fail: bool,
}

impl FakeDownloader {
    pub fn new() -> Self {
        Self { fail: false }
    }

    pub fn failing() -> Self {
        Self { fail: true }
    }
}

#[async_trait]
impl Downloader for FakeDownloader {
    async fn download(
        &self,
        request: &DownloadRequest,
        progress: &ProgressFn,
    ) -> Result<DownloadedBuild, ManagerError> {
        tokio::task::yield_now().await;
        if self.fail {
            return Err(ManagerError::DownloadFailed("connection reset".to_string()));
        }

        progress(1024);
        let name = &request.version.name;
        let suffix = if request.mono { "-mono" } else { "" };
        Ok(DownloadedBuild {
            location: PathBuf::from(format!("/versions/godot-{}{}", name, suffix)),
            cache_location: PathBuf::from(format!("/downloads/{}{}.zip", name, suffix)),
            source_url: request
                .version
                .asset(request.mono)
                .map(|a| a.url.clone())
                .unwrap_or_default(),
        })
    }
}

#[derive(Default)]
struct FsState {
    dirs: BTreeSet<PathBuf>,
    files: BTreeSet<PathBuf>,
    removed: Vec<PathBuf>,
}

/// In-memory tree. Entries ending in `/` and every ancestor of an entry are
/// directories; everything else is a file.
pub struct FakeFs {
    state: Mutex<FsState>,
    failing: HashSet<PathBuf>,
}

impl FakeFs {
    pub fn new<S: AsRef<str>>(entries: &[S]) -> Self {
        let mut state = FsState::default();
        for entry in entries {
            let entry = entry.as_ref();
            let path = PathBuf::from(entry.trim_end_matches('/'));
            for ancestor in path.ancestors().skip(1) {
                state.dirs.insert(ancestor.to_path_buf());
            }
            if entry.ends_with('/') {
                state.dirs.insert(path);
            } else {
                state.files.insert(path);
            }
        }
        let dirs = state.dirs.clone();
        state.files.retain(|f| !dirs.contains(f));

        Self {
            state: Mutex::new(state),
            failing: HashSet::new(),
        }
    }

    pub fn failing_on(mut self, path: &str) -> Self {
        self.failing.insert(PathBuf::from(path));
        self
    }

    pub fn removed(&self) -> Vec<PathBuf> {
        self.state.lock().unwrap().removed.clone()
    }

    fn children(set: &BTreeSet<PathBuf>, path: &Path) -> Vec<PathBuf> {
        set.iter()
            .filter(|p| p.parent() == Some(path))
            .cloned()
            .collect()
    }
}

impl FileSystem for FakeFs {
    fn enumerate_directories(&self, path: &Path) -> Result<Vec<PathBuf>, ManagerError> {
        let state = self.state.lock().unwrap();
        if !state.dirs.contains(path) {
            return Err(ManagerError::Io(format!("{} not found", path.display())));
        }
        Ok(Self::children(&state.dirs, path))
    }

    fn enumerate_files(&self, path: &Path) -> Result<Vec<PathBuf>, ManagerError> {
        let state = self.state.lock().unwrap();
        if !state.dirs.contains(path) {
            return Err(ManagerError::Io(format!("{} not found", path.display())));
        }
        Ok(Self::children(&state.files, path))
    }

    fn remove_path(&self, path: &Path) -> Result<(), ManagerError> {
        let fail = |reason: &str| ManagerError::FilesystemRemovalFailed {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };

        if self.failing.contains(path) {
            return Err(fail("permission denied"));
        }

        let mut state = self.state.lock().unwrap();
        if state.dirs.contains(path) {
            let occupied = !Self::children(&state.dirs, path).is_empty()
                || !Self::children(&state.files, path).is_empty();
            if occupied {
                return Err(fail("directory not empty"));
            }
            state.dirs.remove(path);
        } else if !state.files.remove(path) {
            return Err(fail("not found"));
        }

        state.removed.push(path.to_path_buf());
        Ok(())
    }
}

pub struct FakeConfirm {
    answer: bool,
    prompts: Mutex<Vec<UninstallPrompt>>,
}

impl FakeConfirm {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<UninstallPrompt> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Confirm for FakeConfirm {
    async fn confirm(&self, prompt: &UninstallPrompt) -> bool {
        self.prompts.lock().unwrap().push(prompt.clone());
        self.answer
    }
}

/// A manager over an in-memory store whose fake filesystem holds the files
/// of every managed install in `db`.
pub async fn manager_with(db: Database, confirm: bool) -> (VersionManager, Arc<FakeFs>) {
    let mut entries = Vec::new();
    for version in db.installed_versions.iter().filter(|v| !v.is_local_reference()) {
        let location = version.location.display().to_string();
        entries.push(format!("{}/", location));
        entries.push(format!("{}/godot.bin", location));
        entries.push(version.cache_location.display().to_string());
    }
    let fs = Arc::new(FakeFs::new(entries.as_slice()));

    let manager = VersionManager::new(
        Store::in_memory(db),
        Box::new(FakeApi::with_page_sizes(&[])),
        Arc::new(FakeDownloader::new()),
        Arc::new(FakeConfirm::answering(confirm)),
    )
    .with_file_system(fs.clone());
    manager.refresh_list().await;

    (manager, fs)
}

pub fn manager_with_api(db: Database, api: FakeApi) -> VersionManager {
    VersionManager::new(
        Store::in_memory(db),
        Box::new(api),
        Arc::new(FakeDownloader::new()),
        Arc::new(FakeConfirm::answering(true)),
    )
}
