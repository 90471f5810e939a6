// src/fs/mock.rs

use super::{FileSystem, FsEntry};
use crate::types::EntryKind;
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(Vec<u8>),
    Dir(Vec<String>), // List of child names
    /// Exists, but every read fails (e.g. permission denied).
    Unreadable,
}

/// In-memory tree keyed by full path. Clones share the same tree.
#[derive(Debug, Clone)]
pub struct MockFileSystem {
    root: PathBuf,
    files: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
}

impl MockFileSystem {
    /// Create an empty tree containing only `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let mut files = HashMap::new();
        files.insert(root.clone(), MockEntry::Dir(Vec::new()));

        Self {
            root,
            files: Arc::new(Mutex::new(files)),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Add a file at a root-relative path, creating parents implicitly.
    pub fn add_file(&self, rel: &str, content: impl Into<Vec<u8>>) -> PathBuf {
        self.insert(rel, MockEntry::File(content.into()))
    }

    /// Add a directory at a root-relative path, creating parents implicitly.
    pub fn add_dir(&self, rel: &str) -> PathBuf {
        let path = self.root.join(rel);
        if self.is_dir(&path) {
            return path;
        }
        self.insert(rel, MockEntry::Dir(Vec::new()))
    }

    /// Add an entry that exists but cannot be read.
    pub fn add_unreadable(&self, rel: &str) -> PathBuf {
        self.insert(rel, MockEntry::Unreadable)
    }

    /// Remove an entry and, for directories, everything beneath it.
    pub fn remove(&self, rel: &str) {
        let path = self.root.join(rel);
        let mut files = self.files.lock().unwrap();
        files.retain(|p, _| !p.starts_with(&path));
        if let Some(parent) = path.parent() {
            if let Some(MockEntry::Dir(children)) = files.get_mut(parent) {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    children.retain(|c| c != name);
                }
            }
        }
    }

    fn insert(&self, rel: &str, entry: MockEntry) -> PathBuf {
        let path = self.root.join(rel);
        let mut files = self.files.lock().unwrap();
        files.insert(path.clone(), entry);

        if let Some(parent) = path.parent() {
            self.ensure_dir_entry(&mut files, parent);
            Self::link_child(&mut files, parent, &path);
        }
        path
    }

    fn ensure_dir_entry(&self, files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        if files.contains_key(path) {
            return;
        }
        files.insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
        if path == self.root {
            return;
        }
        if let Some(parent) = path.parent() {
            self.ensure_dir_entry(files, parent);
            Self::link_child(files, parent, path);
        }
    }

    fn link_child(files: &mut HashMap<PathBuf, MockEntry>, parent: &Path, path: &Path) {
        if let Some(MockEntry::Dir(children)) = files.get_mut(parent) {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if !children.iter().any(|c| c == name) {
                    children.push(name.to_string());
                }
            }
        }
    }
}

impl FileSystem for MockFileSystem {
    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        let files = self.files.lock().unwrap();
        match files.get(path) {
            Some(MockEntry::File(content)) => Ok(content.clone()),
            Some(MockEntry::Dir(_)) => Err(anyhow!("Is a directory: {:?}", path)),
            Some(MockEntry::Unreadable) => Err(anyhow!("Permission denied: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        let files = self.files.lock().unwrap();
        files.contains_key(path)
    }

    fn entry_kind(&self, path: &Path) -> Option<EntryKind> {
        let files = self.files.lock().unwrap();
        match files.get(path)? {
            MockEntry::Dir(_) => Some(EntryKind::Directory),
            MockEntry::File(_) | MockEntry::Unreadable => Some(EntryKind::File),
        }
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<FsEntry>> {
        let files = self.files.lock().unwrap();
        match files.get(path) {
            Some(MockEntry::Dir(children)) => Ok(children
                .iter()
                .map(|name| FsEntry {
                    name: name.clone(),
                    kind: match files.get(&path.join(name)) {
                        Some(MockEntry::Dir(_)) => EntryKind::Directory,
                        _ => EntryKind::File,
                    },
                })
                .collect()),
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }
}
