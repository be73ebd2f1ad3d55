use std::path::{Path, PathBuf};

const APP_DIR: &str = "gdman";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl AppPaths {
    pub fn new() -> Self {
        #[cfg(target_os = "macos")]
        {
            let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
            Self {
                config_dir: home.join("Library/Application Support").join(APP_DIR),
                cache_dir: home.join("Library/Caches").join(APP_DIR),
                data_dir: home.join("Library/Application Support").join(APP_DIR),
            }
        }

        #[cfg(not(target_os = "macos"))]
        {
            let fallback = || PathBuf::from(".");
            Self {
                config_dir: dirs::config_dir().unwrap_or_else(fallback).join(APP_DIR),
                cache_dir: dirs::cache_dir().unwrap_or_else(fallback).join(APP_DIR),
                data_dir: dirs::data_dir().unwrap_or_else(fallback).join(APP_DIR),
            }
        }
    }

    /// Keeps every directory under a single root, used for portable installs.
    pub fn with_root(root: &Path) -> Self {
        Self {
            config_dir: root.join("config"),
            cache_dir: root.join("cache"),
            data_dir: root.join("data"),
        }
    }

    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    pub fn database_file(&self) -> PathBuf {
        self.data_dir.join("central_store.json")
    }

    pub fn log_file(&self) -> PathBuf {
        self.cache_dir.join("debug.log")
    }

    pub fn versions_dir(&self) -> PathBuf {
        self.data_dir.join("versions")
    }

    pub fn downloads_dir(&self) -> PathBuf {
        self.cache_dir.join("downloads")
    }

    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.cache_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(self.versions_dir())?;
        std::fs::create_dir_all(self.downloads_dir())?;
        log::debug!("Ensured application directories under {:?}", self.data_dir);
        Ok(())
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
