use chrono::Utc;
use log::{error, info, warn};
use std::path::PathBuf;
use uuid::Uuid;

use gdman_backend::{DownloadRequest, InstalledVersion, ManagerError, UninstallPrompt};

use super::{UninstallOutcome, VersionManager};
use crate::events::ManagerEvent;
use crate::presentation::VersionList;
use crate::removal::remove_installation;

impl VersionManager {
    /// Downloads the named release and records it as installed. The first
    /// version ever installed becomes the default engine.
    pub async fn install(&self, name: &str, mono: bool) -> Result<InstalledVersion, ManagerError> {
        let entry = self
            .with_fresh_list(|list| list.begin_download(name, mono))
            .await?;
        self.events.emit(ManagerEvent::ListChanged);
        let label = entry.label();

        let Some(remote) = entry.remote else {
            self.with_list(|list| list.abort_download(name));
            return Err(ManagerError::VersionNotFound(name.to_string()));
        };

        info!("Installing {}", label);
        let request = DownloadRequest {
            version: remote.clone(),
            mono,
        };
        let build = match self
            .downloader
            .download(&request, &self.events.progress_fn())
            .await
        {
            Ok(build) => build,
            Err(e) => {
                error!("Download of {} failed: {}", name, e);
                self.with_list(|list| list.abort_download(name));
                self.events.emit(ManagerEvent::ListChanged);
                return Err(e);
            }
        };
        self.with_list(|list| list.finish_download(name));

        let version = InstalledVersion {
            id: Uuid::new_v4(),
            tag: remote.name.clone(),
            location: build.location,
            cache_location: build.cache_location,
            is_mono: mono,
            remote: Some(remote),
            source: build.source_url,
            installed_at: Some(Utc::now()),
        };

        let became_default = self
            .store
            .write(|db| Ok(db.add_installed(version.clone())))
            .await;
        self.refresh_list().await;

        if became_default? {
            info!("{} is now the default engine", version.display_name());
        }
        info!("Installed {} at {:?}", version.display_name(), version.location);
        Ok(version)
    }

    /// Accepts a detected update by installing the release it announced.
    pub async fn install_update(
        &self,
        release_name: &str,
        mono: bool,
    ) -> Result<InstalledVersion, ManagerError> {
        info!("Installing update {}", release_name);
        self.install(release_name, mono).await
    }

    /// Registers a build the user already has on disk. Nothing is ever
    /// deleted for it on uninstall.
    pub async fn add_custom(
        &self,
        tag: &str,
        location: PathBuf,
        mono: bool,
    ) -> Result<InstalledVersion, ManagerError> {
        let version = InstalledVersion {
            id: Uuid::new_v4(),
            tag: tag.to_string(),
            source: location.to_string_lossy().into_owned(),
            location,
            cache_location: PathBuf::new(),
            is_mono: mono,
            remote: None,
            installed_at: Some(Utc::now()),
        };

        self.store
            .write(|db| Ok(db.add_installed(version.clone())))
            .await?;
        self.refresh_list().await;
        info!("Added custom engine {} at {:?}", tag, version.location);
        Ok(version)
    }

    /// Asks for confirmation, then removes the version. Managed installs have
    /// their files deleted; local references only lose their record.
    pub async fn uninstall(&self, id: Uuid) -> Result<UninstallOutcome, ManagerError> {
        let version = self
            .store
            .read(|db| db.installed(id).cloned())
            .await
            .ok_or_else(|| ManagerError::VersionNotFound(id.to_string()))?;

        self.with_fresh_list(|list| list.begin_uninstall(id))
            .await?;
        self.events.emit(ManagerEvent::ListChanged);

        let prompt = UninstallPrompt::for_version(&version);
        if !self.confirm.confirm(&prompt).await {
            info!("Uninstall of {} declined", version.display_name());
            self.with_list(|list| list.cancel_uninstall(id));
            self.events.emit(ManagerEvent::ListChanged);
            return Ok(UninstallOutcome::Declined);
        }

        match self.remove_version(version).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                self.with_list(|list| list.cancel_uninstall(id));
                self.events.emit(ManagerEvent::ListChanged);
                Err(e)
            }
        }
    }

    async fn remove_version(
        &self,
        version: InstalledVersion,
    ) -> Result<UninstallOutcome, ManagerError> {
        let removal_failures = if version.is_local_reference() {
            Vec::new()
        } else {
            let fs = self.fs.clone();
            let location = version.location.clone();
            let cache_location = version.cache_location.clone();
            tokio::task::spawn_blocking(move || {
                remove_installation(fs.as_ref(), &location, &cache_location)
            })
            .await
            .map_err(|e| ManagerError::Io(e.to_string()))?
        };

        if !removal_failures.is_empty() {
            warn!(
                "{} paths of {} could not be removed",
                removal_failures.len(),
                version.display_name()
            );
        }

        let detached_projects = self
            .store
            .write(|db| db.remove_installed(version.id))
            .await?;
        self.refresh_list().await;

        info!(
            "Removed {} ({} projects detached)",
            version.display_name(),
            detached_projects
        );
        Ok(UninstallOutcome::Removed {
            detached_projects,
            removal_failures,
        })
    }

    /// Runs `f` against the list, rebuilding it from the store once if the
    /// entry it looks for is missing.
    async fn with_fresh_list<R>(
        &self,
        f: impl Fn(&mut VersionList) -> Result<R, ManagerError>,
    ) -> Result<R, ManagerError> {
        match self.with_list(&f) {
            Err(ManagerError::VersionNotFound(_)) => {
                self.refresh_list().await;
                self.with_list(f)
            }
            result => result,
        }
    }

    /// Returns false when the version already was the default.
    pub async fn set_default(&self, id: Uuid) -> Result<bool, ManagerError> {
        if self
            .store
            .read(|db| db.settings.default_engine == Some(id))
            .await
        {
            return Ok(false);
        }

        self.store.write(|db| db.set_default(id)).await?;
        self.refresh_list().await;
        info!("Default engine set to {}", id);
        Ok(true)
    }
}
