// src/ignore/rules.rs

use std::fmt;
use std::path::Path;

use globset::{GlobSet, GlobSetBuilder};
use tracing::{debug, warn};

use crate::config::WatchSettings;
use crate::errors::{Result, WatchitError};
use crate::fs::FileSystem;
use crate::ignore::pattern::IgnorePattern;

/// Root-relative location of git's per-repository exclude file.
pub const GIT_EXCLUDE_FILE: &str = ".git/info/exclude";

/// Built-in rule keeping version-control metadata out of the watch.
pub const VCS_DIR_PATTERN: &str = ".git/";

/// Ordered, immutable list of ignore patterns.
///
/// Built once at startup; `is_ignored` is a pure function of the list and
/// its arguments, so the same question always gets the same answer.
#[derive(Clone)]
pub struct IgnoreRuleSet {
    patterns: Vec<IgnorePattern>,
    set: GlobSet,
}

impl fmt::Debug for IgnoreRuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IgnoreRuleSet")
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}

impl Default for IgnoreRuleSet {
    fn default() -> Self {
        Self::empty()
    }
}

impl IgnoreRuleSet {
    /// A rule set that ignores nothing.
    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
            set: GlobSet::empty(),
        }
    }

    pub fn builder() -> IgnoreRuleSetBuilder {
        IgnoreRuleSetBuilder::default()
    }

    /// Build from already parsed patterns, keeping their iteration order as
    /// precedence order.
    pub fn from_patterns(patterns: impl IntoIterator<Item = IgnorePattern>) -> Result<Self> {
        let patterns: Vec<IgnorePattern> = patterns
            .into_iter()
            .enumerate()
            .map(|(idx, p)| p.with_order(idx))
            .collect();

        let mut builder = GlobSetBuilder::new();
        for pattern in &patterns {
            builder.add(pattern.glob().clone());
        }
        let set = builder
            .build()
            .map_err(|e| WatchitError::ConfigError(format!("compiling ignore patterns: {e}")))?;

        Ok(Self { patterns, set })
    }

    /// Assemble the rule set for `root`.
    ///
    /// Sources, lowest precedence first: `.git/info/exclude`, the ignore
    /// file, configured extra patterns, and the built-in `.git/` rule.
    /// Missing files contribute nothing; a file that exists but cannot be
    /// read is a `ConfigError`.
    pub fn load(fs: &dyn FileSystem, root: &Path, settings: &WatchSettings) -> Result<Self> {
        let mut builder = Self::builder();

        if settings.use_git_exclude {
            builder = builder.add_file(fs, root, Path::new(GIT_EXCLUDE_FILE))?;
        }
        builder = builder.add_file(fs, root, &settings.ignore_file)?;

        for (idx, line) in settings.extra_ignores.iter().enumerate() {
            builder = builder.add_strict_line(line, &format!("config:extra_ignores[{idx}]"))?;
        }

        if settings.exclude_vcs_dir {
            builder = builder.add_strict_line(VCS_DIR_PATTERN, "built-in")?;
        }

        let rules = builder.build()?;
        debug!(patterns = rules.len(), "ignore rules loaded");
        Ok(rules)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn patterns(&self) -> &[IgnorePattern] {
        &self.patterns
    }

    /// Should `rel_path` (relative to the root, `/`-separated) be ignored?
    ///
    /// Every ancestor directory is checked first, outermost to innermost: once
    /// a directory is excluded, nothing beneath it can be re-included, no
    /// matter what later negations say. The root itself is never ignored.
    pub fn is_ignored(&self, rel_path: &str, is_dir: bool) -> bool {
        let rel_path = rel_path.trim_matches('/');
        if rel_path.is_empty() {
            return false;
        }

        let mut boundary = 0;
        while let Some(pos) = rel_path[boundary..].find('/') {
            let ancestor = &rel_path[..boundary + pos];
            if self.excluded_here(ancestor, true) {
                return true;
            }
            boundary += pos + 1;
        }

        self.excluded_here(rel_path, is_dir)
    }

    /// The pattern that decides `rel_path` on its own, without looking at
    /// ancestors. `None` if no pattern applies.
    pub fn decisive_pattern(&self, rel_path: &str, is_dir: bool) -> Option<&IgnorePattern> {
        self.set
            .matches(rel_path)
            .into_iter()
            .map(|idx| &self.patterns[idx])
            .filter(|p| p.applies_to(is_dir))
            .max_by_key(|p| p.order())
    }

    fn excluded_here(&self, rel_path: &str, is_dir: bool) -> bool {
        self.decisive_pattern(rel_path, is_dir)
            .is_some_and(|p| !p.is_negated())
    }
}

/// Collects patterns from files and strings, in precedence order.
#[derive(Debug, Default)]
pub struct IgnoreRuleSetBuilder {
    patterns: Vec<IgnorePattern>,
}

impl IgnoreRuleSetBuilder {
    /// Add every line of a gitignore-style text.
    ///
    /// Lines that do not compile are skipped with a warning, as git does.
    pub fn add_lines(mut self, source: &str, text: &str) -> Self {
        for (lineno, line) in text.lines().enumerate() {
            let origin = format!("{source}:{}", lineno + 1);
            match IgnorePattern::parse(line, self.patterns.len(), &origin) {
                Ok(Some(pattern)) => self.patterns.push(pattern),
                Ok(None) => {}
                Err(err) => warn!(source = %origin, line, error = %err, "skipping invalid ignore pattern"),
            }
        }
        self
    }

    /// Add one pattern that must be valid.
    pub fn add_strict_line(mut self, line: &str, source: &str) -> Result<Self> {
        let parsed = IgnorePattern::parse(line, self.patterns.len(), source).map_err(|e| {
            WatchitError::ConfigError(format!("invalid ignore pattern {line:?} ({source}): {e}"))
        })?;
        if let Some(pattern) = parsed {
            self.patterns.push(pattern);
        }
        Ok(self)
    }

    /// Add the lines of `root/rel_file` if it exists.
    pub fn add_file(self, fs: &dyn FileSystem, root: &Path, rel_file: &Path) -> Result<Self> {
        let path = root.join(rel_file);
        if !fs.exists(&path) {
            debug!(file = ?path, "no ignore file");
            return Ok(self);
        }

        let bytes = fs.read_bytes(&path).map_err(|e| {
            WatchitError::ConfigError(format!("cannot read ignore file {path:?}: {e:#}"))
        })?;
        debug!(file = ?path, "reading ignore file");
        // git does not care about the encoding; neither do we.
        let text = String::from_utf8_lossy(&bytes);
        Ok(self.add_lines(&rel_file.to_string_lossy(), &text))
    }

    pub fn build(self) -> Result<IgnoreRuleSet> {
        IgnoreRuleSet::from_patterns(self.patterns)
    }
}
