// src/types.rs

/// Path relative to the watch root, `/`-separated, no leading slash.
///
/// The root itself is the empty string.
pub type RelPath = String;

/// Whether a directory entry is a file or a directory.
///
/// Symlinks and other special entries count as files: they are never
/// descended into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    pub fn is_dir(self) -> bool {
        matches!(self, EntryKind::Directory)
    }
}

/// Join a child name onto a root-relative directory path.
pub fn join_rel(parent: &str, name: &str) -> RelPath {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}
