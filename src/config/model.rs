// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration as read from `.watchit.toml`.
///
/// ```toml
/// [watch]
/// ignore_file = ".gitignore"
/// use_git_exclude = true
/// exclude_vcs_dir = true
/// extra_ignores = ["*.swp"]
///
/// [run]
/// quiet_period = 0.5
/// interrupt = false
/// ```
///
/// All sections and keys are optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub watch: WatchSection,

    #[serde(default)]
    pub run: RunSection,
}

/// `[watch]` section: where ignore rules come from.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchSection {
    /// Root-relative path of the gitignore-style file. A missing file means
    /// no patterns from it.
    #[serde(default = "default_ignore_file")]
    pub ignore_file: String,

    /// Also read `.git/info/exclude`, at lower precedence than `ignore_file`.
    #[serde(default = "default_true")]
    pub use_git_exclude: bool,

    /// Always exclude the `.git` directory, whatever the ignore file says.
    #[serde(default = "default_true")]
    pub exclude_vcs_dir: bool,

    /// Additional gitignore-syntax patterns, evaluated after `ignore_file`.
    #[serde(default)]
    pub extra_ignores: Vec<String>,
}

fn default_ignore_file() -> String {
    ".gitignore".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            ignore_file: default_ignore_file(),
            use_git_exclude: true,
            exclude_vcs_dir: true,
            extra_ignores: Vec::new(),
        }
    }
}

/// `[run]` section: only used when a command is given.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunSection {
    /// Seconds to wait after a change before (re)starting the command.
    #[serde(default = "default_quiet_period")]
    pub quiet_period: f64,

    #[serde(default)]
    pub interrupt: bool,
}

pub(crate) fn default_quiet_period() -> f64 {
    0.5
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            quiet_period: default_quiet_period(),
            interrupt: false,
        }
    }
}

/// A `RawConfigFile` that passed validation.
///
/// Construct via `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    watch: WatchSection,
    run: RunSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(watch: WatchSection, run: RunSection) -> Self {
        Self { watch, run }
    }

    pub fn watch_section(&self) -> &WatchSection {
        &self.watch
    }

    pub fn run_section(&self) -> &RunSection {
        &self.run
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(WatchSection::default(), RunSection::default())
    }
}

/// Ignore-rule sources, resolved for one run.
#[derive(Debug, Clone)]
pub struct WatchSettings {
    pub ignore_file: PathBuf,
    pub use_git_exclude: bool,
    pub exclude_vcs_dir: bool,
    pub extra_ignores: Vec<String>,
}

impl Default for WatchSettings {
    fn default() -> Self {
        WatchSettings::from(&WatchSection::default())
    }
}

impl From<&WatchSection> for WatchSettings {
    fn from(section: &WatchSection) -> Self {
        Self {
            ignore_file: PathBuf::from(&section.ignore_file),
            use_git_exclude: section.use_git_exclude,
            exclude_vcs_dir: section.exclude_vcs_dir,
            extra_ignores: section.extra_ignores.clone(),
        }
    }
}

/// Command-mode behaviour, resolved for one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSettings {
    pub quiet_period: Duration,
    pub interrupt: bool,
}

/// Everything the runtime needs: config file merged with CLI flags.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Absolute, canonical root of the watched tree.
    pub root: PathBuf,
    /// `None` means one-shot mode.
    pub command: Option<String>,
    pub watch: WatchSettings,
    pub run: RunSettings,
}
