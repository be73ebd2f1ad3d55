use log::{debug, warn};
use std::path::{Path, PathBuf};

use gdman_backend::{FileSystem, ManagerError};

/// Lists everything under `root` so that each entry comes before its parent
/// directory: subdirectory trees first, then files, then `root` itself.
pub fn removal_order(fs: &dyn FileSystem, root: &Path) -> Result<Vec<PathBuf>, ManagerError> {
    let mut paths = Vec::new();
    for dir in fs.enumerate_directories(root)? {
        paths.extend(removal_order(fs, &dir)?);
    }
    paths.extend(fs.enumerate_files(root)?);
    paths.push(root.to_path_buf());
    Ok(paths)
}

/// Best-effort removal of an install directory and its cached archive.
/// Every path is attempted; failures are returned rather than aborting.
pub fn remove_installation(
    fs: &dyn FileSystem,
    location: &Path,
    cache_location: &Path,
) -> Vec<ManagerError> {
    let mut failures = Vec::new();

    let mut paths = match removal_order(fs, location) {
        Ok(paths) => paths,
        Err(e) => {
            warn!("Could not enumerate {:?}: {}", location, e);
            failures.push(ManagerError::FilesystemRemovalFailed {
                path: location.to_path_buf(),
                reason: e.to_string(),
            });
            Vec::new()
        }
    };

    if !cache_location.as_os_str().is_empty() {
        paths.push(cache_location.to_path_buf());
    }

    debug!("Removing {} paths for {:?}", paths.len(), location);
    for path in &paths {
        if let Err(e) = fs.remove_path(path) {
            warn!("{}", e);
            failures.push(e);
        }
    }

    failures
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    fn entries(path: &Path, dirs: bool) -> Result<Vec<PathBuf>, ManagerError> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() == dirs {
                entries.push(entry.path());
            }
        }
        entries.sort();
        Ok(entries)
    }
}

impl FileSystem for LocalFileSystem {
    fn enumerate_directories(&self, path: &Path) -> Result<Vec<PathBuf>, ManagerError> {
        Self::entries(path, true)
    }

    fn enumerate_files(&self, path: &Path) -> Result<Vec<PathBuf>, ManagerError> {
        Self::entries(path, false)
    }

    fn remove_path(&self, path: &Path) -> Result<(), ManagerError> {
        let result = match std::fs::symlink_metadata(path) {
            Ok(meta) if meta.is_dir() => std::fs::remove_dir(path),
            Ok(_) => std::fs::remove_file(path),
            Err(e) => Err(e),
        };

        result.map_err(|e| ManagerError::FilesystemRemovalFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}
