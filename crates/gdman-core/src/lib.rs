mod assets;
mod download;
mod events;
mod fetch;
mod github;
mod manager;
mod presentation;
mod reconcile;
mod removal;
mod schedule;
mod store;

pub use assets::{platform_keys, select_assets};
pub use download::HttpDownloader;
pub use events::{EventBus, ManagerEvent};
pub use fetch::{PAGE_SIZE, fetch_all_releases};
pub use github::GithubClient;
pub use manager::{Activation, UninstallOutcome, VersionManager};
pub use presentation::{EntryState, ListEntry, VersionList};
pub use reconcile::{LatestCheck, check_latest, gather_releases, normalize, reconcile};
pub use removal::{LocalFileSystem, remove_installation, removal_order};
pub use schedule::{ActivationPlan, plan_activation};
pub use store::{Database, Settings, Store};

pub use gdman_backend::{
    Confirm, DownloadRequest, DownloadedBuild, Downloader, EngineAsset, FileSystem,
    InstalledVersion, ManagerError, ProgressFn, ProjectReference, RawAsset, RawRelease,
    ReleaseApi, ReleaseSource, RemoteVersion, UninstallPrompt, UninstallPromptKind, no_progress,
};

#[cfg(test)]
pub(crate) mod testing;
