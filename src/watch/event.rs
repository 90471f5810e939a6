// src/watch/event.rs

//! Raw filesystem notifications, as delivered by a [`WatchBackend`].
//!
//! [`WatchBackend`]: crate::watch::backend::WatchBackend

use std::path::PathBuf;

use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};
use notify::EventKind;
use tracing::warn;

use crate::types::EntryKind;

/// What happened to a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawEventKind {
    Created,
    Modified,
    Removed,
    RenamedFrom,
    RenamedTo,
}

/// One notification for one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub kind: RawEventKind,
    /// Absolute, or relative to the watch root.
    pub path: PathBuf,
    /// Entry type reported by the OS, when it says so. Used when the path
    /// no longer exists by the time the event is classified.
    pub kind_hint: Option<EntryKind>,
}

impl RawEvent {
    pub fn new(kind: RawEventKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
            kind_hint: None,
        }
    }

    pub fn with_hint(mut self, hint: EntryKind) -> Self {
        self.kind_hint = Some(hint);
        self
    }

    pub fn created(path: impl Into<PathBuf>) -> Self {
        Self::new(RawEventKind::Created, path)
    }

    pub fn modified(path: impl Into<PathBuf>) -> Self {
        Self::new(RawEventKind::Modified, path)
    }

    pub fn removed(path: impl Into<PathBuf>) -> Self {
        Self::new(RawEventKind::Removed, path)
    }
}

/// Translate one `notify` event into zero or more raw events.
///
/// Access events are dropped: the engine opens directories itself while
/// scanning, and reading is not a change.
pub fn from_notify(event: notify::Event) -> Vec<RawEvent> {
    if event.need_rescan() {
        warn!(paths = ?event.paths, "notification queue overflowed; some changes may be missed");
        return Vec::new();
    }

    let mut paths = event.paths.into_iter();
    match event.kind {
        EventKind::Create(CreateKind::Folder) => paths
            .map(|p| RawEvent::created(p).with_hint(EntryKind::Directory))
            .collect(),
        EventKind::Create(CreateKind::File) => paths
            .map(|p| RawEvent::created(p).with_hint(EntryKind::File))
            .collect(),
        EventKind::Create(_) => paths.map(RawEvent::created).collect(),

        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => paths
            .map(|p| RawEvent::new(RawEventKind::RenamedFrom, p))
            .collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => paths
            .map(|p| RawEvent::new(RawEventKind::RenamedTo, p))
            .collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            let mut out = Vec::with_capacity(2);
            if let Some(from) = paths.next() {
                out.push(RawEvent::new(RawEventKind::RenamedFrom, from));
            }
            if let Some(to) = paths.next() {
                out.push(RawEvent::new(RawEventKind::RenamedTo, to));
            }
            out
        }
        EventKind::Modify(_) | EventKind::Any => paths.map(RawEvent::modified).collect(),

        EventKind::Remove(RemoveKind::Folder) => paths
            .map(|p| RawEvent::removed(p).with_hint(EntryKind::Directory))
            .collect(),
        EventKind::Remove(RemoveKind::File) => paths
            .map(|p| RawEvent::removed(p).with_hint(EntryKind::File))
            .collect(),
        EventKind::Remove(_) => paths.map(RawEvent::removed).collect(),

        EventKind::Access(_) | EventKind::Other => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, DataChange, Flag};

    fn ev(kind: EventKind, paths: &[&str]) -> notify::Event {
        let mut e = notify::Event::new(kind);
        for p in paths {
            e = e.add_path(PathBuf::from(p));
        }
        e
    }

    #[test]
    fn folder_creation_carries_directory_hint() {
        let out = from_notify(ev(EventKind::Create(CreateKind::Folder), &["/r/sub"]));
        assert_eq!(out, vec![RawEvent::created("/r/sub").with_hint(EntryKind::Directory)]);
    }

    #[test]
    fn rename_both_splits_into_endpoints() {
        let out = from_notify(ev(
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
            &["/r/old", "/r/new"],
        ));
        assert_eq!(
            out,
            vec![
                RawEvent::new(RawEventKind::RenamedFrom, "/r/old"),
                RawEvent::new(RawEventKind::RenamedTo, "/r/new"),
            ]
        );
    }

    #[test]
    fn data_and_metadata_changes_are_modifications() {
        let out = from_notify(ev(
            EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            &["/r/f"],
        ));
        assert_eq!(out, vec![RawEvent::modified("/r/f")]);
    }

    #[test]
    fn access_and_rescan_are_dropped() {
        assert!(from_notify(ev(EventKind::Access(AccessKind::Any), &["/r/f"])).is_empty());

        let rescan = ev(EventKind::Other, &[]).set_flag(Flag::Rescan);
        assert!(from_notify(rescan).is_empty());
    }

    #[test]
    fn folder_removal_carries_directory_hint() {
        let out = from_notify(ev(EventKind::Remove(RemoveKind::Folder), &["/r/d"]));
        assert_eq!(out, vec![RawEvent::removed("/r/d").with_hint(EntryKind::Directory)]);
    }
}
