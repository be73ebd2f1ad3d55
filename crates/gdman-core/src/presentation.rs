use std::collections::HashSet;
use uuid::Uuid;

use gdman_backend::{InstalledVersion, ManagerError, RemoteVersion};

use crate::store::Database;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Available,
    Downloading,
    Installed,
    Uninstalling,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListEntry {
    pub remote: Option<RemoteVersion>,
    pub installed: Option<InstalledVersion>,
    pub mono: bool,
    pub state: EntryState,
    pub is_default: bool,
    pub visible: bool,
}

impl ListEntry {
    fn available(remote: RemoteVersion, mono: bool) -> Self {
        Self {
            remote: Some(remote),
            installed: None,
            mono,
            state: EntryState::Available,
            is_default: false,
            visible: true,
        }
    }

    fn installed(version: InstalledVersion, is_default: bool) -> Self {
        Self {
            remote: version.remote.clone(),
            mono: version.is_mono,
            installed: Some(version),
            state: EntryState::Installed,
            is_default,
            visible: true,
        }
    }

    pub fn label(&self) -> String {
        match (&self.installed, &self.remote) {
            (Some(installed), _) => installed.display_name(),
            (None, Some(remote)) => remote.display_name(self.mono),
            (None, None) => String::new(),
        }
    }

    pub fn installed_id(&self) -> Option<Uuid> {
        self.installed.as_ref().map(|v| v.id)
    }

    fn remote_name(&self) -> Option<&str> {
        self.remote.as_ref().map(|r| r.name.as_str())
    }

    /// Whether the build this entry would download exists for this platform.
    pub fn downloadable(&self) -> bool {
        self.remote
            .as_ref()
            .is_some_and(|r| r.asset(self.mono).is_some())
    }
}

/// The three groups shown by the engine panel.
#[derive(Debug, Clone, Default)]
pub struct VersionList {
    installed: Vec<ListEntry>,
    downloading: Vec<ListEntry>,
    available: Vec<ListEntry>,
    use_mono: bool,
}

impl VersionList {
    pub fn new(use_mono: bool) -> Self {
        Self {
            use_mono,
            ..Default::default()
        }
    }

    pub fn installed(&self) -> &[ListEntry] {
        &self.installed
    }

    pub fn downloading(&self) -> &[ListEntry] {
        &self.downloading
    }

    pub fn available(&self) -> &[ListEntry] {
        &self.available
    }

    pub fn visible_available(&self) -> impl Iterator<Item = &ListEntry> {
        self.available.iter().filter(|e| e.visible)
    }

    pub fn use_mono(&self) -> bool {
        self.use_mono
    }

    /// Recreates the installed and available groups from the database.
    /// In-flight downloads are kept, and so is the uninstalling state of
    /// entries awaiting confirmation.
    pub fn rebuild(&mut self, db: &Database) {
        let uninstalling: HashSet<Uuid> = self
            .installed
            .iter()
            .filter(|e| e.state == EntryState::Uninstalling)
            .filter_map(|e| e.installed_id())
            .collect();
        let downloading: HashSet<String> = self
            .downloading
            .iter()
            .filter_map(|e| e.remote_name().map(str::to_string))
            .collect();

        self.installed.clear();
        self.available.clear();

        for remote in &db.remote_versions {
            if downloading.contains(&remote.name) {
                continue;
            }
            self.available
                .push(ListEntry::available(remote.clone(), self.use_mono));
        }

        for version in &db.installed_versions {
            let is_default = db.settings.default_engine == Some(version.id);
            let mut entry = ListEntry::installed(version.clone(), is_default);
            if uninstalling.contains(&version.id) {
                entry.state = EntryState::Uninstalling;
            }
            self.installed.push(entry);
        }

        self.recompute_visibility();
    }

    /// Hides available entries whose label matches an installed entry's.
    pub fn recompute_visibility(&mut self) {
        let installed: Vec<String> = self.installed.iter().map(ListEntry::label).collect();
        for entry in self.available.iter_mut() {
            let label = entry.label();
            entry.visible = !installed.iter().any(|name| *name == label);
        }
    }

    pub fn set_use_mono(&mut self, use_mono: bool) {
        self.use_mono = use_mono;
        for entry in self.available.iter_mut() {
            entry.mono = use_mono;
        }
        self.recompute_visibility();
    }

    /// Moves an available entry into the downloading group. An entry that
    /// is not currently available cannot start a second download, and a
    /// variant already in the installed group cannot be downloaded again.
    pub fn begin_download(&mut self, name: &str, mono: bool) -> Result<ListEntry, ManagerError> {
        let Some(index) = self
            .available
            .iter()
            .position(|e| e.remote_name() == Some(name))
        else {
            if self.downloading.iter().any(|e| e.remote_name() == Some(name)) {
                return Err(ManagerError::EntryBusy(name.to_string()));
            }
            return Err(ManagerError::VersionNotFound(name.to_string()));
        };

        let mut entry = self.available[index].clone();
        entry.mono = mono;
        if !entry.downloadable() {
            return Err(ManagerError::VersionNotFound(format!(
                "{} has no {} build for this platform",
                name,
                if mono { "mono" } else { "standard" }
            )));
        }

        let label = entry.label();
        if self.installed.iter().any(|e| e.label() == label) {
            return Err(ManagerError::AlreadyInstalled(label));
        }

        self.available.remove(index);
        entry.state = EntryState::Downloading;
        entry.visible = true;
        self.downloading.push(entry.clone());
        Ok(entry)
    }

    pub fn finish_download(&mut self, name: &str) {
        self.downloading.retain(|e| e.remote_name() != Some(name));
    }

    /// Returns a failed download to the available group.
    pub fn abort_download(&mut self, name: &str) {
        let Some(index) = self
            .downloading
            .iter()
            .position(|e| e.remote_name() == Some(name))
        else {
            return;
        };
        let mut entry = self.downloading.remove(index);
        entry.state = EntryState::Available;
        entry.mono = self.use_mono;
        self.available.push(entry);
        self.recompute_visibility();
    }

    pub fn begin_uninstall(&mut self, id: Uuid) -> Result<(), ManagerError> {
        let entry = self
            .installed
            .iter_mut()
            .find(|e| e.installed_id() == Some(id))
            .ok_or_else(|| ManagerError::VersionNotFound(id.to_string()))?;

        if entry.state == EntryState::Uninstalling {
            return Err(ManagerError::EntryBusy(entry.label()));
        }
        entry.state = EntryState::Uninstalling;
        Ok(())
    }

    pub fn cancel_uninstall(&mut self, id: Uuid) {
        if let Some(entry) = self
            .installed
            .iter_mut()
            .find(|e| e.installed_id() == Some(id))
        {
            entry.state = EntryState::Installed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{installed_version, remote_version};

    fn db_with(remote: &[&str], installed: &[&str]) -> Database {
        let mut db = Database {
            remote_versions: remote.iter().map(|n| remote_version(n)).collect(),
            ..Default::default()
        };
        for name in installed {
            db.add_installed(installed_version(name));
        }
        db
    }

    fn visible_labels(list: &VersionList) -> Vec<String> {
        list.visible_available().map(ListEntry::label).collect()
    }

    #[test]
    fn test_installed_name_hides_available() {
        let db = db_with(&["3.5-stable", "3.6-stable"], &["3.5-stable"]);
        let mut list = VersionList::new(false);

        list.rebuild(&db);

        assert_eq!(list.available().len(), 2);
        assert_eq!(visible_labels(&list), vec!["3.6-stable"]);
    }

    #[test]
    fn test_visibility_is_case_sensitive() {
        let db = db_with(&["3.5-Stable"], &["3.5-stable"]);
        let mut list = VersionList::new(false);

        list.rebuild(&db);

        assert_eq!(visible_labels(&list), vec!["3.5-Stable"]);
    }

    #[test]
    fn test_mono_toggle_changes_visibility() {
        let db = db_with(&["3.5-stable"], &["3.5-stable"]);
        let mut list = VersionList::new(false);
        list.rebuild(&db);
        assert!(visible_labels(&list).is_empty());

        list.set_use_mono(true);

        assert_eq!(visible_labels(&list), vec!["3.5-stable (mono)"]);
    }

    #[test]
    fn test_rebuild_marks_default() {
        let db = db_with(&[], &["3.5-stable", "3.6-stable"]);
        let mut list = VersionList::new(false);

        list.rebuild(&db);

        let defaults: Vec<bool> = list.installed().iter().map(|e| e.is_default).collect();
        assert_eq!(defaults, vec![true, false]);
    }

    #[test]
    fn test_begin_download_is_not_reentrant() {
        let db = db_with(&["4.2-stable"], &[]);
        let mut list = VersionList::new(false);
        list.rebuild(&db);

        let entry = list.begin_download("4.2-stable", false).unwrap();
        assert_eq!(entry.state, EntryState::Downloading);
        assert!(list.available().is_empty());

        assert!(matches!(
            list.begin_download("4.2-stable", false),
            Err(ManagerError::EntryBusy(_))
        ));
    }

    #[test]
    fn test_installed_variant_cannot_be_downloaded_again() {
        let db = db_with(&["4.2-stable"], &["4.2-stable"]);
        let mut list = VersionList::new(false);
        list.rebuild(&db);

        assert!(matches!(
            list.begin_download("4.2-stable", false),
            Err(ManagerError::AlreadyInstalled(label)) if label == "4.2-stable"
        ));
        assert_eq!(list.available().len(), 1);
        assert!(list.downloading().is_empty());

        let mono = list.begin_download("4.2-stable", true).unwrap();
        assert_eq!(mono.label(), "4.2-stable (mono)");
    }

    #[test]
    fn test_rebuild_keeps_downloads_out_of_available() {
        let db = db_with(&["4.2-stable", "4.1-stable"], &[]);
        let mut list = VersionList::new(false);
        list.rebuild(&db);
        list.begin_download("4.2-stable", false).unwrap();

        list.rebuild(&db);

        assert_eq!(list.downloading().len(), 1);
        assert_eq!(visible_labels(&list), vec!["4.1-stable"]);
    }

    #[test]
    fn test_abort_download_restores_entry() {
        let db = db_with(&["4.2-stable"], &[]);
        let mut list = VersionList::new(false);
        list.rebuild(&db);
        list.begin_download("4.2-stable", true).unwrap();

        list.abort_download("4.2-stable");

        assert!(list.downloading().is_empty());
        assert_eq!(list.available()[0].state, EntryState::Available);
        assert!(!list.available()[0].mono);
    }

    #[test]
    fn test_begin_download_requires_platform_asset() {
        let mut db = db_with(&["4.2-stable"], &[]);
        db.remote_versions[0].mono = None;
        let mut list = VersionList::new(false);
        list.rebuild(&db);

        assert!(matches!(
            list.begin_download("4.2-stable", true),
            Err(ManagerError::VersionNotFound(_))
        ));
        assert_eq!(list.available().len(), 1);
    }

    #[test]
    fn test_uninstall_state_survives_rebuild() {
        let db = db_with(&[], &["3.5-stable"]);
        let id = db.installed_versions[0].id;
        let mut list = VersionList::new(false);
        list.rebuild(&db);

        list.begin_uninstall(id).unwrap();
        list.rebuild(&db);

        assert_eq!(list.installed()[0].state, EntryState::Uninstalling);
        assert!(matches!(
            list.begin_uninstall(id),
            Err(ManagerError::EntryBusy(_))
        ));

        list.cancel_uninstall(id);
        assert_eq!(list.installed()[0].state, EntryState::Installed);
    }
}
