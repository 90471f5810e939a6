// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile, WatchSection};
use crate::errors::{Result, WatchitError};
use crate::ignore::IgnorePattern;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = WatchitError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_watch_section(&raw.watch)?;
        validate_quiet_period(raw.run.quiet_period)?;
        let RawConfigFile { watch, run } = raw;
        Ok(ConfigFile::new_unchecked(watch, run))
    }
}

fn validate_watch_section(watch: &WatchSection) -> Result<()> {
    if watch.ignore_file.trim().is_empty() {
        return Err(WatchitError::ConfigError(
            "[watch].ignore_file must not be empty".to_string(),
        ));
    }

    for (idx, pattern) in watch.extra_ignores.iter().enumerate() {
        IgnorePattern::parse(pattern, idx, "[watch].extra_ignores").map_err(|e| {
            WatchitError::ConfigError(format!(
                "[watch].extra_ignores[{idx}] = {pattern:?} is not a valid pattern: {e}"
            ))
        })?;
    }

    Ok(())
}

/// Shared with CLI overrides, which bypass the config file.
pub(crate) fn validate_quiet_period(seconds: f64) -> Result<()> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(WatchitError::ConfigError(format!(
            "quiet period must be a non-negative number of seconds (got {seconds})"
        )));
    }
    Ok(())
}
