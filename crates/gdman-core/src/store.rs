use chrono::{DateTime, TimeDelta, Utc};
use log::{debug, error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;
use uuid::Uuid;

use gdman_backend::{InstalledVersion, ManagerError, ProjectReference, RemoteVersion};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_true")]
    pub check_for_updates: bool,

    #[serde(default)]
    pub last_check: Option<DateTime<Utc>>,

    #[serde(default = "default_check_interval")]
    pub check_interval_secs: u64,

    #[serde(default)]
    pub default_engine: Option<Uuid>,
}

fn default_true() -> bool {
    true
}

fn default_check_interval() -> u64 {
    24 * 60 * 60
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            check_for_updates: true,
            last_check: None,
            check_interval_secs: default_check_interval(),
            default_engine: None,
        }
    }
}

impl Settings {
    pub fn check_interval(&self) -> TimeDelta {
        i64::try_from(self.check_interval_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX)
    }

    /// A missing `last_check` counts as never checked.
    pub fn update_check_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_check {
            Some(last) => now - last >= self.check_interval(),
            None => true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Database {
    #[serde(default)]
    pub remote_versions: Vec<RemoteVersion>,

    #[serde(default)]
    pub installed_versions: Vec<InstalledVersion>,

    #[serde(default)]
    pub projects: Vec<ProjectReference>,

    #[serde(default)]
    pub settings: Settings,
}

impl Database {
    pub fn installed(&self, id: Uuid) -> Option<&InstalledVersion> {
        self.installed_versions.iter().find(|v| v.id == id)
    }

    /// Resolves either a UUID or an exact display name.
    pub fn find_installed(&self, key: &str) -> Option<&InstalledVersion> {
        if let Ok(id) = key.parse::<Uuid>() {
            return self.installed(id);
        }
        self.installed_versions
            .iter()
            .find(|v| v.display_name() == key || v.tag == key)
    }

    pub fn default_engine(&self) -> Option<&InstalledVersion> {
        self.settings.default_engine.and_then(|id| self.installed(id))
    }

    pub fn has_remote_named(&self, name: &str) -> bool {
        self.remote_versions.iter().any(|v| v.name == name)
    }

    /// Appends a version; the first one ever registered becomes the default.
    /// Returns whether it was made default.
    pub fn add_installed(&mut self, version: InstalledVersion) -> bool {
        self.installed_versions.push(version);
        if self.installed_versions.len() == 1 {
            self.settings.default_engine = Some(self.installed_versions[0].id);
            return true;
        }
        false
    }

    /// Removes a version, resetting every project and the default engine
    /// that pointed at it. Returns the number of projects detached.
    pub fn remove_installed(&mut self, id: Uuid) -> Result<usize, ManagerError> {
        let index = self
            .installed_versions
            .iter()
            .position(|v| v.id == id)
            .ok_or_else(|| ManagerError::VersionNotFound(id.to_string()))?;

        let mut detached = 0;
        for project in self.projects.iter_mut() {
            if project.engine == Some(id) {
                project.engine = None;
                detached += 1;
            }
        }

        if self.settings.default_engine == Some(id) {
            self.settings.default_engine = None;
        }

        self.installed_versions.remove(index);
        Ok(detached)
    }

    pub fn set_default(&mut self, id: Uuid) -> Result<(), ManagerError> {
        if self.installed(id).is_none() {
            return Err(ManagerError::VersionNotFound(id.to_string()));
        }
        self.settings.default_engine = Some(id);
        Ok(())
    }
}

/// Shared handle to the persisted database. All mutation goes through
/// [`Store::write`], which holds the lock until the save completes.
#[derive(Debug, Clone)]
pub struct Store {
    db: Arc<Mutex<Database>>,
    path: Option<PathBuf>,
    saves: Arc<AtomicUsize>,
}

impl Store {
    pub async fn load(path: &Path) -> Result<Self, ManagerError> {
        let db = match tokio::fs::read_to_string(path).await {
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                ManagerError::Store(format!("Corrupt database {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No database at {:?}, starting empty", path);
                Database::default()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            path: Some(path.to_path_buf()),
            saves: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn in_memory(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            path: None,
            saves: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub async fn snapshot(&self) -> Database {
        self.db.lock().await.clone()
    }

    pub async fn read<R>(&self, f: impl FnOnce(&Database) -> R) -> R {
        let db = self.db.lock().await;
        f(&db)
    }

    /// Applies `f` and saves the whole database. If `f` or the save fails the
    /// in-memory database is restored to what it was before the call.
    pub async fn write<R>(
        &self,
        f: impl FnOnce(&mut Database) -> Result<R, ManagerError>,
    ) -> Result<R, ManagerError> {
        let mut db = self.db.lock().await;
        let before = db.clone();

        let result = match f(&mut db) {
            Ok(result) => result,
            Err(e) => {
                *db = before;
                return Err(e);
            }
        };

        if let Err(e) = self.persist(&db).await {
            error!("Failed to save database: {}", e);
            *db = before;
            return Err(e);
        }

        Ok(result)
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    async fn persist(&self, db: &Database) -> Result<(), ManagerError> {
        self.saves.fetch_add(1, Ordering::SeqCst);

        let Some(path) = &self.path else {
            return Ok(());
        };

        let content =
            serde_json::to_string_pretty(db).map_err(|e| ManagerError::Store(e.to_string()))?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, path).await?;
        debug!("Saved database to {:?}", path);
        Ok(())
    }
}
