// src/engine/core.rs

//! Watch engine state machine.
//!
//! [`WatchEngine`] owns the ignore rules, the registry and the OS-watch
//! backend, and turns one event at a time into registry updates and a
//! decision. Everything except [`WatchEngine::run_until_change`] is
//! synchronous, so registration triggered by an event always completes
//! before the next event is looked at.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use crate::engine::{ChangeReport, EngineState, Step};
use crate::errors::{Result, WatchitError};
use crate::fs::FileSystem;
use crate::ignore::IgnoreRuleSet;
use crate::types::{EntryKind, RelPath};
use crate::watch::path_utils::{absolute, resolve_relative};
use crate::watch::{
    classify, Decision, RawEvent, RawEventKind, TreeWalker, WatchBackend, WatchRegistry,
};

pub struct WatchEngine<B: WatchBackend> {
    root: PathBuf,
    rules: IgnoreRuleSet,
    registry: WatchRegistry,
    backend: B,
    fs: Arc<dyn FileSystem>,
    state: EngineState,
}

impl<B: WatchBackend> fmt::Debug for WatchEngine<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchEngine")
            .field("root", &self.root)
            .field("state", &self.state)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl<B: WatchBackend> WatchEngine<B> {
    pub fn new(
        root: impl Into<PathBuf>,
        rules: IgnoreRuleSet,
        backend: B,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        let root = root.into();
        Self {
            registry: WatchRegistry::new(root.clone()),
            root,
            rules,
            backend,
            fs,
            state: EngineState::Initializing,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn rules(&self) -> &IgnoreRuleSet {
        &self.rules
    }

    pub fn registry(&self) -> &WatchRegistry {
        &self.registry
    }

    /// Watch every kept directory under the root.
    ///
    /// Failing to watch the root itself is fatal; any other directory that
    /// cannot be watched is logged and left unmonitored. Calling this on an
    /// engine that is already initialized does nothing.
    pub fn initialize(&mut self) -> Result<()> {
        if self.state != EngineState::Initializing {
            return Ok(());
        }
        self.register_tree("", false)?;
        info!(
            root = ?self.root,
            dirs = self.registry.len(),
            "initial watches established"
        );
        self.state = EngineState::Watching;
        Ok(())
    }

    /// Classify one event and act on it.
    ///
    /// Events are only processed while `Watching`.
    pub fn handle_event(&mut self, event: RawEvent) -> Step {
        if self.state != EngineState::Watching {
            trace!(?event, state = ?self.state, "event dropped outside Watching");
            return Step::Continue;
        }

        if matches!(event.kind, RawEventKind::Removed | RawEventKind::RenamedFrom) {
            self.release_vanished(&event.path);
        }

        let decision = classify(&event, &self.root, &self.rules, self.fs.as_ref());
        debug!(path = ?event.path, kind = ?event.kind, decision = ?decision, "classified event");

        match decision {
            Decision::Ignored => Step::Continue,
            Decision::NewDirectory(rel) => match self.register_tree(&rel, true) {
                Ok(Some(report)) => self.terminate(report),
                Ok(None) => Step::Continue,
                Err(err) => {
                    warn!(dir = %rel, error = %err, "new directory not monitored");
                    Step::Continue
                }
            },
            Decision::Relevant(rel) => {
                if event.kind == RawEventKind::RenamedTo && self.is_dir(&rel) {
                    // A directory moved in; its contents need watches too.
                    if let Err(err) = self.register_tree(&rel, false) {
                        warn!(dir = %rel, error = %err, "moved directory not monitored");
                    }
                }
                self.terminate(ChangeReport {
                    path: rel,
                    kind: event.kind,
                })
            }
        }
    }

    /// Wait for the next relevant change.
    ///
    /// Initializes the engine on first use and re-arms it after a previous
    /// change. Fails with `BackendClosed` if the backend stops delivering
    /// events.
    pub async fn run_until_change(&mut self) -> Result<ChangeReport> {
        match self.state {
            EngineState::Initializing => self.initialize()?,
            EngineState::Terminating => self.rearm(),
            EngineState::Watching => {}
        }

        loop {
            let event = self
                .backend
                .next_event()
                .await
                .ok_or(WatchitError::BackendClosed)?;
            if let Step::Changed(report) = self.handle_event(event) {
                return Ok(report);
            }
        }
    }

    /// Process every event already queued without waiting.
    ///
    /// Registry bookkeeping happens as usual, but relevant changes do not
    /// terminate the engine. Returns the number of events consumed.
    pub fn drain_pending(&mut self) -> usize {
        self.rearm();
        let mut drained = 0;
        while let Some(event) = self.backend.try_next_event() {
            drained += 1;
            if let Step::Changed(report) = self.handle_event(event) {
                trace!(path = %report.path, "change absorbed while draining");
                self.state = EngineState::Watching;
            }
        }
        if drained > 0 {
            debug!(drained, "drained pending events");
        }
        drained
    }

    /// Leave `Terminating` so events are processed again.
    pub fn rearm(&mut self) {
        if self.state == EngineState::Terminating {
            debug!("engine re-armed");
            self.state = EngineState::Watching;
        }
    }

    fn terminate(&mut self, report: ChangeReport) -> Step {
        info!(path = %report.path, kind = ?report.kind, "relevant change");
        self.state = EngineState::Terminating;
        Step::Changed(report)
    }

    fn is_dir(&self, rel: &str) -> bool {
        self.fs.entry_kind(&absolute(&self.root, rel)) == Some(EntryKind::Directory)
    }

    /// Drop the watches on a removed or renamed-away path and below it.
    fn release_vanished(&mut self, path: &Path) {
        let Ok(rel) = resolve_relative(&self.root, path) else {
            return;
        };
        if rel.is_empty() {
            return;
        }
        let released = self.registry.remove(&rel, &mut self.backend);
        if released > 0 {
            debug!(dir = %rel, released, "released watches under vanished directory");
        }
    }

    /// Watch `start` and every kept directory beneath it.
    ///
    /// With `report_files`, files found in each fresh directory listing are
    /// classified as creations and the first relevant one is returned; this
    /// catches files written before the directory's watch was live.
    ///
    /// Only a failure to watch `start` itself is an error; a subdirectory
    /// that cannot be watched is logged and its subtree skipped.
    fn register_tree(&mut self, start: &str, report_files: bool) -> Result<Option<ChangeReport>> {
        let walker = TreeWalker::new(&self.root, self.fs.as_ref(), &self.rules);
        let mut walk = walker.discover(start);
        let mut first_change: Option<ChangeReport> = None;

        while let Some(dir) = walk.next() {
            let scan = match self.registry.add(&dir, &mut self.backend, self.fs.as_ref()) {
                Ok(scan) => scan,
                Err(err) if dir == start => return Err(err),
                Err(err) => {
                    warn!(dir = %dir, error = %err, "directory not monitored");
                    walk.prune();
                    continue;
                }
            };

            if report_files && first_change.is_none() {
                first_change =
                    first_relevant_file(&scan.files, &self.root, &self.rules, self.fs.as_ref());
            }
            walk.expand_with(scan.subdirs);
        }

        Ok(first_change)
    }
}

fn first_relevant_file(
    files: &[RelPath],
    root: &Path,
    rules: &IgnoreRuleSet,
    fs: &dyn FileSystem,
) -> Option<ChangeReport> {
    files.iter().find_map(|file| {
        let event = RawEvent::created(absolute(root, file)).with_hint(EntryKind::File);
        match classify(&event, root, rules, fs) {
            Decision::Relevant(path) => {
                debug!(path = %path, "file found by post-registration scan");
                Some(ChangeReport {
                    path,
                    kind: RawEventKind::Created,
                })
            }
            _ => None,
        }
    })
}
