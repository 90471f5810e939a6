// src/watch/walker.rs

//! Depth-first discovery of the directories worth watching.

use std::path::Path;

use tracing::debug;

use crate::fs::FileSystem;
use crate::ignore::IgnoreRuleSet;
use crate::types::{join_rel, RelPath};
use crate::watch::path_utils::absolute;

/// Finds kept directories under a starting point, never descending into
/// ignored ones.
#[derive(Debug, Clone, Copy)]
pub struct TreeWalker<'a> {
    root: &'a Path,
    fs: &'a dyn FileSystem,
    rules: &'a IgnoreRuleSet,
}

impl<'a> TreeWalker<'a> {
    pub fn new(root: &'a Path, fs: &'a dyn FileSystem, rules: &'a IgnoreRuleSet) -> Self {
        Self { root, fs, rules }
    }

    /// Lazily walk kept directories from `start` (inclusive), depth first.
    ///
    /// A yielded directory's children are only listed when the next item is
    /// requested, so callers can register each directory before its
    /// contents are read. Sibling order is unspecified.
    pub fn discover(&self, start: &str) -> Discover<'a> {
        let stack = if self.keeps_dir(start) {
            vec![start.to_string()]
        } else {
            debug!(dir = %start, "start directory is ignored; nothing to walk");
            Vec::new()
        };
        Discover {
            walker: *self,
            stack,
            pending: None,
        }
    }

    /// Whether a directory should be watched and descended into.
    pub fn keeps_dir(&self, rel: &str) -> bool {
        !self.rules.is_ignored(rel, true)
    }

    fn list_subdirs(&self, rel: &str) -> Vec<RelPath> {
        match self.fs.read_dir(&absolute(self.root, rel)) {
            Ok(entries) => entries
                .into_iter()
                .filter(|e| e.kind.is_dir())
                .map(|e| join_rel(rel, &e.name))
                .collect(),
            Err(err) => {
                debug!(dir = %rel, error = %err, "cannot list directory");
                Vec::new()
            }
        }
    }
}

/// Iterator returned by [`TreeWalker::discover`].
#[derive(Debug)]
pub struct Discover<'a> {
    walker: TreeWalker<'a>,
    stack: Vec<RelPath>,
    /// Last yielded directory whose children have not been listed yet.
    pending: Option<RelPath>,
}

impl Discover<'_> {
    /// Do not descend into the directory yielded last.
    pub fn prune(&mut self) {
        self.pending = None;
    }

    /// Descend into the directory yielded last using a listing the caller
    /// already has, instead of reading it again.
    pub fn expand_with(&mut self, subdirs: impl IntoIterator<Item = RelPath>) {
        if self.pending.take().is_some() {
            self.push_kept(subdirs.into_iter().collect());
        }
    }

    fn push_kept(&mut self, mut subdirs: Vec<RelPath>) {
        subdirs.retain(|d| {
            let keep = self.walker.keeps_dir(d);
            if !keep {
                debug!(dir = %d, "skipping ignored directory");
            }
            keep
        });
        // Reverse-sorted so siblings pop in name order.
        subdirs.sort_unstable_by(|a, b| b.cmp(a));
        self.stack.extend(subdirs);
    }
}

impl Iterator for Discover<'_> {
    type Item = RelPath;

    fn next(&mut self) -> Option<RelPath> {
        if let Some(dir) = self.pending.take() {
            let subdirs = self.walker.list_subdirs(&dir);
            self.push_kept(subdirs);
        }
        let dir = self.stack.pop()?;
        self.pending = Some(dir.clone());
        Some(dir)
    }
}
