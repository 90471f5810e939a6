// src/watch/path_utils.rs

//! Utility functions for path handling in the watcher.

use std::path::{Component, Path, PathBuf};

use crate::errors::{Result, WatchitError};
use crate::types::RelPath;

/// Convert `path` into a root-relative, `/`-separated string.
///
/// Relative inputs are taken as already relative to `root`. For absolute
/// inputs we first try a plain `strip_prefix`; if that fails (symlinked
/// prefixes such as macOS's `/private/var`), both sides are canonicalized
/// and we try again. Paths that still are not under `root` are a
/// `Classify` error.
pub fn resolve_relative(root: &Path, path: &Path) -> Result<RelPath> {
    if path.is_relative() {
        return normalize(path)
            .ok_or_else(|| WatchitError::Classify(format!("path {path:?} escapes the watch root")));
    }

    if let Ok(rel) = path.strip_prefix(root) {
        return normalize(rel)
            .ok_or_else(|| WatchitError::Classify(format!("path {path:?} escapes the watch root")));
    }

    if let (Ok(root_canon), Ok(path_canon)) = (root.canonicalize(), path.canonicalize()) {
        if let Ok(rel) = path_canon.strip_prefix(&root_canon) {
            if let Some(s) = normalize(rel) {
                return Ok(s);
            }
        }
    }

    Err(WatchitError::Classify(format!(
        "path {path:?} is not under watch root {root:?}"
    )))
}

/// Absolute path for a root-relative one.
pub fn absolute(root: &Path, rel: &str) -> PathBuf {
    if rel.is_empty() {
        root.to_path_buf()
    } else {
        root.join(rel)
    }
}

fn normalize(rel: &Path) -> Option<RelPath> {
    let mut parts: Vec<String> = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(name) => parts.push(name.to_string_lossy().into_owned()),
            Component::CurDir => {}
            Component::ParentDir => {
                parts.pop()?;
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_root_prefix() {
        let rel = resolve_relative(Path::new("/repo"), Path::new("/repo/src/main.rs")).unwrap();
        assert_eq!(rel, "src/main.rs");
    }

    #[test]
    fn root_itself_is_empty() {
        assert_eq!(resolve_relative(Path::new("/repo"), Path::new("/repo")).unwrap(), "");
    }

    #[test]
    fn relative_input_is_normalized() {
        let rel = resolve_relative(Path::new("/repo"), Path::new("./a/../b/c")).unwrap();
        assert_eq!(rel, "b/c");
    }

    #[test]
    fn outside_root_is_a_classify_error() {
        let err = resolve_relative(Path::new("/repo"), Path::new("/elsewhere/x")).unwrap_err();
        assert!(matches!(err, WatchitError::Classify(_)));

        let err = resolve_relative(Path::new("/repo"), Path::new("../x")).unwrap_err();
        assert!(matches!(err, WatchitError::Classify(_)));
    }

    #[test]
    fn absolute_of_root_has_no_trailing_component() {
        assert_eq!(absolute(Path::new("/repo"), ""), PathBuf::from("/repo"));
        assert_eq!(absolute(Path::new("/repo"), "a/b"), PathBuf::from("/repo/a/b"));
    }
}
