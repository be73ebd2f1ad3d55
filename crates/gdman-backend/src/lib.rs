mod error;
mod traits;
mod types;

pub use error::ManagerError;
pub use traits::{
    Confirm, DownloadRequest, DownloadedBuild, Downloader, FileSystem, ProgressFn, ReleaseApi,
    no_progress,
};
pub use types::{
    EngineAsset, InstalledVersion, ProjectReference, RawAsset, RawRelease, ReleaseSource,
    RemoteVersion, UninstallPrompt, UninstallPromptKind,
};
