// src/watch/registry.rs

//! Arena of live directory watches, keyed by root-relative path.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::errors::{Result, WatchitError};
use crate::fs::FileSystem;
use crate::types::{join_rel, EntryKind, RelPath};
use crate::watch::backend::{WatchBackend, WatchHandle};
use crate::watch::path_utils::absolute;

/// A directory with an active OS watch.
#[derive(Debug, Clone)]
pub struct WatchedDirectory {
    rel: RelPath,
    handle: WatchHandle,
}

impl WatchedDirectory {
    pub fn rel_path(&self) -> &str {
        &self.rel
    }

    pub fn handle(&self) -> &WatchHandle {
        &self.handle
    }
}

/// Immediate entries of a directory, listed right after its watch went live.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirScan {
    pub subdirs: Vec<RelPath>,
    pub files: Vec<RelPath>,
}

/// Owns every active watch. Handles are released explicitly through
/// [`WatchRegistry::remove`], never on drop.
#[derive(Debug)]
pub struct WatchRegistry {
    root: PathBuf,
    entries: HashMap<RelPath, WatchedDirectory>,
}

impl WatchRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            entries: HashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Watch `rel`, then list its immediate entries.
    ///
    /// Listing after the watch is live means anything created before the
    /// watch existed still shows up, either here or as an event. A directory
    /// that is already watched is left alone and reports an empty scan.
    pub fn add(
        &mut self,
        rel: &str,
        backend: &mut dyn WatchBackend,
        fs: &dyn FileSystem,
    ) -> Result<DirScan> {
        if self.entries.contains_key(rel) {
            trace!(dir = %rel, "already watched");
            return Ok(DirScan::default());
        }

        let abs = absolute(&self.root, rel);
        let handle = backend.register(&abs).map_err(|e| WatchitError::WatchError {
            path: abs.clone(),
            message: format!("{e:#}"),
        })?;
        debug!(dir = %rel, id = handle.id(), "watch registered");
        self.entries.insert(
            rel.to_string(),
            WatchedDirectory {
                rel: rel.to_string(),
                handle,
            },
        );

        let mut scan = DirScan::default();
        match fs.read_dir(&abs) {
            Ok(entries) => {
                for entry in entries {
                    let child = join_rel(rel, &entry.name);
                    match entry.kind {
                        EntryKind::Directory => scan.subdirs.push(child),
                        EntryKind::File => scan.files.push(child),
                    }
                }
            }
            // Usually the directory vanished again; its removal event follows.
            Err(err) => debug!(dir = %rel, error = %err, "scan after registration failed"),
        }
        scan.subdirs.sort();
        scan.files.sort();
        Ok(scan)
    }

    /// Release the watch on `rel` and on every directory beneath it.
    ///
    /// Idempotent; returns how many watches were released.
    pub fn remove(&mut self, rel: &str, backend: &mut dyn WatchBackend) -> usize {
        let doomed: Vec<RelPath> = self
            .entries
            .keys()
            .filter(|key| is_within(key, rel))
            .cloned()
            .collect();

        for key in &doomed {
            if let Some(entry) = self.entries.remove(key) {
                backend.unregister(&entry.handle);
                debug!(dir = %key, "watch released");
            }
        }
        doomed.len()
    }

    pub fn contains(&self, rel: &str) -> bool {
        self.entries.contains_key(rel)
    }

    pub fn get(&self, rel: &str) -> Option<&WatchedDirectory> {
        self.entries.get(rel)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Watched directories, sorted.
    pub fn watched_dirs(&self) -> Vec<&str> {
        let mut dirs: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        dirs.sort_unstable();
        dirs
    }
}

/// `candidate` equals `dir` or lies beneath it.
fn is_within(candidate: &str, dir: &str) -> bool {
    dir.is_empty()
        || candidate == dir
        || candidate
            .strip_prefix(dir)
            .is_some_and(|rest| rest.starts_with('/'))
}
