mod update;
mod workflow;

use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use gdman_backend::{Confirm, Downloader, FileSystem, ManagerError, ReleaseApi};

use crate::events::{EventBus, ManagerEvent};
use crate::presentation::VersionList;
use crate::reconcile::LatestCheck;
use crate::removal::LocalFileSystem;
use crate::store::Store;

#[derive(Debug, Clone, PartialEq)]
pub enum Activation {
    FirstLoad { fetched: usize },
    Checked(LatestCheck),
    Idle,
}

#[derive(Debug, Clone)]
pub enum UninstallOutcome {
    Declined,
    Removed {
        detached_projects: usize,
        removal_failures: Vec<ManagerError>,
    },
}

/// Commands over the engine catalog and installs. Front ends call these and
/// listen on [`VersionManager::subscribe`] for changes.
#[derive(Clone)]
pub struct VersionManager {
    store: Store,
    list: Arc<Mutex<VersionList>>,
    events: EventBus,
    api: Box<dyn ReleaseApi>,
    downloader: Arc<dyn Downloader>,
    fs: Arc<dyn FileSystem>,
    confirm: Arc<dyn Confirm>,
    fetch_lock: Arc<tokio::sync::Mutex<()>>,
}

impl std::fmt::Debug for VersionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionManager")
            .field("store", &self.store)
            .field("source", &self.api.source())
            .finish()
    }
}

impl VersionManager {
    /// The list starts empty. [`Self::list`] stays empty until
    /// [`Self::refresh_list`] or [`Self::activate`] runs; workflows rebuild it
    /// on their own when an entry is missing.
    pub fn new(
        store: Store,
        api: Box<dyn ReleaseApi>,
        downloader: Arc<dyn Downloader>,
        confirm: Arc<dyn Confirm>,
    ) -> Self {
        Self {
            store,
            list: Arc::new(Mutex::new(VersionList::default())),
            events: EventBus::new(),
            api,
            downloader,
            fs: Arc::new(LocalFileSystem),
            confirm,
            fetch_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    pub fn with_file_system(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn with_use_mono(self, use_mono: bool) -> Self {
        self.with_list(|list| list.set_use_mono(use_mono));
        self
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<ManagerEvent> {
        self.events.subscribe()
    }

    /// A copy of the current list groups.
    pub fn list(&self) -> VersionList {
        self.with_list(|list| list.clone())
    }

    pub fn set_use_mono(&self, use_mono: bool) {
        self.with_list(|list| list.set_use_mono(use_mono));
        self.events.emit(ManagerEvent::ListChanged);
    }

    pub async fn refresh_list(&self) {
        let db = self.store.snapshot().await;
        self.with_list(|list| list.rebuild(&db));
        self.events.emit(ManagerEvent::ListChanged);
    }

    fn with_list<R>(&self, f: impl FnOnce(&mut VersionList) -> R) -> R {
        let mut list = self.list.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut list)
    }
}
