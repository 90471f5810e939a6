// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::cli::CliArgs;
use crate::config::model::{ConfigFile, RawConfigFile, RunSettings, Settings, WatchSettings};
use crate::config::validate::validate_quiet_period;
use crate::errors::{Result, WatchitError};

/// File name looked up in the watch root when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = ".watchit.toml";

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization. Use [`load_and_validate`] for
/// the checked form.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| {
        WatchitError::ConfigError(format!("reading config file {path:?}: {e}"))
    })?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Where the config file lives when no `--config` flag is passed.
pub fn default_config_path(root: &Path) -> PathBuf {
    root.join(DEFAULT_CONFIG_FILE)
}

/// Build the run's `Settings` from CLI flags, the config file (explicit or
/// discovered under `root`), and built-in defaults, in that priority.
pub fn resolve_settings(args: &CliArgs, root: &Path) -> Result<Settings> {
    let root = root.canonicalize().map_err(|e| {
        WatchitError::ConfigError(format!("cannot resolve watch root {root:?}: {e}"))
    })?;

    let config = match &args.config {
        Some(path) => load_and_validate(path)?,
        None => {
            let candidate = default_config_path(&root);
            if candidate.is_file() {
                debug!(path = ?candidate, "using discovered config file");
                load_and_validate(&candidate)?
            } else {
                ConfigFile::default()
            }
        }
    };

    let quiet_period = match args.quiet_period {
        Some(secs) => {
            validate_quiet_period(secs)?;
            secs
        }
        None => config.run_section().quiet_period,
    };

    Ok(Settings {
        root,
        command: args.command.clone(),
        watch: WatchSettings::from(config.watch_section()),
        run: RunSettings {
            quiet_period: Duration::from_secs_f64(quiet_period),
            interrupt: args.interrupt || config.run_section().interrupt,
        },
    })
}
