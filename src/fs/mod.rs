// src/fs/mod.rs

use std::fmt::Debug;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::types::EntryKind;

pub mod mock;

/// One immediate child of a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsEntry {
    pub name: String,
    pub kind: EntryKind,
}

/// Abstract filesystem interface.
///
/// Everything the watch engine reads from disk goes through here, so the
/// engine can be driven against [`mock::MockFileSystem`] in tests.
pub trait FileSystem: Send + Sync + Debug {
    /// Raw contents of a file; decoding is up to the caller.
    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>>;

    /// True if anything exists at `path` (without following a final symlink).
    fn exists(&self, path: &Path) -> bool;

    /// Kind of the entry at `path`, or `None` if nothing is there.
    ///
    /// Symlinks are reported as files and never followed.
    fn entry_kind(&self, path: &Path) -> Option<EntryKind>;

    /// Return the immediate entries of a directory.
    fn read_dir(&self, path: &Path) -> Result<Vec<FsEntry>>;

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.entry_kind(path), Some(EntryKind::Directory))
    }
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path).with_context(|| format!("reading file {:?}", path))
    }

    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    fn entry_kind(&self, path: &Path) -> Option<EntryKind> {
        let meta = fs::symlink_metadata(path).ok()?;
        Some(if meta.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        })
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<FsEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path).with_context(|| format!("reading dir {:?}", path))? {
            // Entries can vanish between readdir and stat; skip those.
            let Ok(entry) = entry else { continue };
            let Ok(file_type) = entry.file_type() else { continue };
            entries.push(FsEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind: if file_type.is_dir() {
                    EntryKind::Directory
                } else {
                    EntryKind::File
                },
            });
        }
        Ok(entries)
    }
}
