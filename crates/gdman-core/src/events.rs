use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use gdman_backend::{ProgressFn, RawRelease, RemoteVersion};

#[derive(Debug, Clone, PartialEq)]
pub enum ManagerEvent {
    ListChanged,
    UpdateAvailable {
        version: RemoteVersion,
        release: RawRelease,
    },
    Progress {
        bytes: u64,
    },
    Alert {
        title: String,
        message: String,
    },
}

/// Fans events out to every subscriber. Subscribers that have dropped their
/// receiver are pruned on the next emit.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<mpsc::UnboundedSender<ManagerEvent>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<ManagerEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(tx);
        rx
    }

    pub fn emit(&self, event: ManagerEvent) {
        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn alert(&self, title: &str, message: impl Into<String>) {
        self.emit(ManagerEvent::Alert {
            title: title.to_string(),
            message: message.into(),
        });
    }

    /// Progress callback reporting the running byte total of one operation.
    pub fn progress_fn(&self) -> ProgressFn {
        let bus = self.clone();
        let total = Arc::new(AtomicU64::new(0));
        Arc::new(move |bytes| {
            let bytes = total.fetch_add(bytes, Ordering::Relaxed) + bytes;
            bus.emit(ManagerEvent::Progress { bytes });
        })
    }
}
