use std::collections::HashSet;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use watchit::types::EntryKind;
use watchit::watch::{RawEvent, RawEventKind, WatchBackend, WatchHandle};

#[derive(Debug, Default)]
struct Shared {
    next_id: u64,
    active: Vec<WatchHandle>,
    registered: Vec<PathBuf>,
    unregistered: Vec<PathBuf>,
    failing: HashSet<PathBuf>,
}

/// A scripted OS-watch backend:
/// - events are pushed through a [`FakeBackendHandle`]
/// - every register/unregister call is recorded
/// - registration of chosen paths can be made to fail
///
/// `next_event` returns `None` once every handle has been dropped and the
/// queue is empty.
pub struct FakeBackend {
    event_rx: mpsc::UnboundedReceiver<RawEvent>,
    shared: Arc<Mutex<Shared>>,
}

/// Test-side control for a [`FakeBackend`].
#[derive(Clone)]
pub struct FakeBackendHandle {
    event_tx: mpsc::UnboundedSender<RawEvent>,
    shared: Arc<Mutex<Shared>>,
    root: PathBuf,
}

impl FakeBackend {
    /// Create a backend plus its handle. Event paths given to the handle
    /// are relative to `root`.
    pub fn new(root: impl Into<PathBuf>) -> (Self, FakeBackendHandle) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Mutex::new(Shared::default()));
        (
            Self {
                event_rx,
                shared: Arc::clone(&shared),
            },
            FakeBackendHandle {
                event_tx,
                shared,
                root: root.into(),
            },
        )
    }
}

impl WatchBackend for FakeBackend {
    fn register(&mut self, dir: &Path) -> anyhow::Result<WatchHandle> {
        let mut guard = self.shared.lock().unwrap();
        if guard.failing.contains(dir) {
            anyhow::bail!("fake watch limit reached for {dir:?}");
        }
        guard.next_id += 1;
        let handle = WatchHandle::new(guard.next_id, dir);
        guard.active.push(handle.clone());
        guard.registered.push(dir.to_path_buf());
        Ok(handle)
    }

    fn unregister(&mut self, handle: &WatchHandle) {
        let mut guard = self.shared.lock().unwrap();
        guard.active.retain(|h| h != handle);
        guard.unregistered.push(handle.path().to_path_buf());
    }

    fn next_event(&mut self) -> Pin<Box<dyn Future<Output = Option<RawEvent>> + Send + '_>> {
        Box::pin(self.event_rx.recv())
    }

    fn try_next_event(&mut self) -> Option<RawEvent> {
        self.event_rx.try_recv().ok()
    }
}

impl FakeBackendHandle {
    pub fn push(&self, event: RawEvent) {
        let _ = self.event_tx.send(event);
    }

    pub fn push_kind(&self, kind: RawEventKind, rel: &str) {
        self.push(RawEvent::new(kind, self.root.join(rel)));
    }

    pub fn created(&self, rel: &str) {
        self.push_kind(RawEventKind::Created, rel);
    }

    pub fn created_dir(&self, rel: &str) {
        self.push(RawEvent::created(self.root.join(rel)).with_hint(EntryKind::Directory));
    }

    pub fn modified(&self, rel: &str) {
        self.push_kind(RawEventKind::Modified, rel);
    }

    pub fn removed(&self, rel: &str) {
        self.push_kind(RawEventKind::Removed, rel);
    }

    pub fn removed_dir(&self, rel: &str) {
        self.push(RawEvent::removed(self.root.join(rel)).with_hint(EntryKind::Directory));
    }

    pub fn renamed(&self, from: &str, to: &str) {
        self.push_kind(RawEventKind::RenamedFrom, from);
        self.push_kind(RawEventKind::RenamedTo, to);
    }

    /// Make future registrations of `rel` fail.
    pub fn fail_registration(&self, rel: &str) {
        let path = self.abs(rel);
        self.shared.lock().unwrap().failing.insert(path);
    }

    /// Paths with a live watch, sorted.
    pub fn active(&self) -> Vec<PathBuf> {
        let guard = self.shared.lock().unwrap();
        let mut paths: Vec<PathBuf> = guard.active.iter().map(|h| h.path().to_path_buf()).collect();
        paths.sort();
        paths
    }

    /// Every successful registration, in call order.
    pub fn registered(&self) -> Vec<PathBuf> {
        self.shared.lock().unwrap().registered.clone()
    }

    /// Every unregistration, in call order.
    pub fn unregistered(&self) -> Vec<PathBuf> {
        self.shared.lock().unwrap().unregistered.clone()
    }

    pub fn abs(&self, rel: &str) -> PathBuf {
        if rel.is_empty() {
            self.root.clone()
        } else {
            self.root.join(rel)
        }
    }
}
