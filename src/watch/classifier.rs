// src/watch/classifier.rs

//! Turns one raw notification into a decision.

use std::path::Path;

use tracing::debug;

use crate::fs::FileSystem;
use crate::ignore::IgnoreRuleSet;
use crate::types::{EntryKind, RelPath};
use crate::watch::event::{RawEvent, RawEventKind};
use crate::watch::path_utils::{absolute, resolve_relative};

/// Outcome of classifying a single event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// A change that counts.
    Relevant(RelPath),
    /// Excluded by ignore rules, or not under the root at all.
    Ignored,
    /// A kept directory appeared. Not a change by itself; it needs watching.
    NewDirectory(RelPath),
}

/// Classify `event` against the ignore rules.
///
/// Pure apart from the filesystem lookup used to tell files from
/// directories; the same event over the same tree always yields the same
/// decision.
pub fn classify(
    event: &RawEvent,
    root: &Path,
    rules: &IgnoreRuleSet,
    fs: &dyn FileSystem,
) -> Decision {
    let rel = match resolve_relative(root, &event.path) {
        Ok(rel) => rel,
        Err(err) => {
            debug!(error = %err, "unresolvable event path; treating as ignored");
            return Decision::Ignored;
        }
    };

    let is_dir = entry_kind(event, &absolute(root, &rel), fs).is_dir();

    if rules.is_ignored(&rel, is_dir) {
        return Decision::Ignored;
    }

    match event.kind {
        RawEventKind::Created if is_dir => Decision::NewDirectory(rel),
        _ => Decision::Relevant(rel),
    }
}

/// What the path is now; if it is gone, what the event said it was; if the
/// event did not say, a file.
fn entry_kind(event: &RawEvent, abs: &Path, fs: &dyn FileSystem) -> EntryKind {
    fs.entry_kind(abs)
        .or(event.kind_hint)
        .unwrap_or(EntryKind::File)
}
