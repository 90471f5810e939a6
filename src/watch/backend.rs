// src/watch/backend.rs

//! OS-level notification source abstraction.
//!
//! The engine only needs three things from the platform: subscribe to one
//! directory, unsubscribe, and hand over the next event. [`NotifyBackend`]
//! implements that on top of `notify`; tests use a scripted fake.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use anyhow::{Context, Result};
use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::watch::event::{from_notify, RawEvent};

/// Opaque token for one active directory subscription.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WatchHandle {
    id: u64,
    path: PathBuf,
}

impl WatchHandle {
    pub fn new(id: u64, path: impl Into<PathBuf>) -> Self {
        Self {
            id,
            path: path.into(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Absolute path of the watched directory.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Trait abstracting the platform notification mechanism.
///
/// Watches are non-recursive: the caller decides which directories to
/// subscribe to.
pub trait WatchBackend: Send {
    /// Subscribe to changes of the immediate entries of `dir`.
    fn register(&mut self, dir: &Path) -> Result<WatchHandle>;

    /// Drop a subscription. Never fails; unknown handles are ignored.
    fn unregister(&mut self, handle: &WatchHandle);

    /// Wait for the next event. `None` means no more events will ever arrive.
    fn next_event(&mut self) -> Pin<Box<dyn Future<Output = Option<RawEvent>> + Send + '_>>;

    /// Return an already queued event without waiting.
    fn try_next_event(&mut self) -> Option<RawEvent>;
}

/// Production backend built on `notify::RecommendedWatcher`.
pub struct NotifyBackend {
    watcher: RecommendedWatcher,
    event_rx: mpsc::UnboundedReceiver<RawEvent>,
    next_id: u64,
}

impl std::fmt::Debug for NotifyBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyBackend")
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}

impl NotifyBackend {
    pub fn new() -> Result<Self> {
        // Channel from the blocking notify callback into the async world.
        let (event_tx, event_rx) = mpsc::unbounded_channel::<RawEvent>();

        // Called synchronously on notify's own thread.
        let watcher = RecommendedWatcher::new(
            move |res: notify::Result<notify::Event>| match res {
                Ok(event) => {
                    for raw in from_notify(event) {
                        if event_tx.send(raw).is_err() {
                            // Receiver gone: the engine has finished.
                            return;
                        }
                    }
                }
                Err(err) => {
                    warn!(error = %err, paths = ?err.paths, "file watch error");
                }
            },
            Config::default(),
        )
        .context("initialising filesystem watcher")?;

        Ok(Self {
            watcher,
            event_rx,
            next_id: 0,
        })
    }
}

impl WatchBackend for NotifyBackend {
    fn register(&mut self, dir: &Path) -> Result<WatchHandle> {
        self.watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("adding watch on {:?}", dir))?;
        self.next_id += 1;
        Ok(WatchHandle::new(self.next_id, dir))
    }

    fn unregister(&mut self, handle: &WatchHandle) {
        // The OS drops watches on deleted directories by itself.
        if let Err(err) = self.watcher.unwatch(handle.path()) {
            debug!(path = ?handle.path(), error = %err, "unwatch failed; already gone");
        }
    }

    fn next_event(&mut self) -> Pin<Box<dyn Future<Output = Option<RawEvent>> + Send + '_>> {
        Box::pin(self.event_rx.recv())
    }

    fn try_next_event(&mut self) -> Option<RawEvent> {
        self.event_rx.try_recv().ok()
    }
}
