// src/logging.rs

//! Logging setup for `watchit` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log level:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `-v` / `--verbose` (debug)
//! 3. `WATCHIT_LOG` environment variable (e.g. "info", "debug")
//! 4. default to `error`, so a quiet run prints nothing at all
//!
//! Logs are sent to STDERR; stdout belongs to the wrapped command.

use anyhow::Result;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(verbose: bool, cli_level: Option<LogLevel>) -> Result<()> {
    let env_level = std::env::var("WATCHIT_LOG").ok();
    let level = resolve_level(verbose, cli_level, env_level.as_deref());

    fmt()
        .with_max_level(level)
        .with_target(verbose)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn resolve_level(
    verbose: bool,
    cli_level: Option<LogLevel>,
    env_level: Option<&str>,
) -> tracing::Level {
    if let Some(lvl) = cli_level {
        return level_from_log_level(lvl);
    }
    if verbose {
        return tracing::Level::DEBUG;
    }
    env_level
        .and_then(parse_level_str)
        .unwrap_or(tracing::Level::ERROR)
}

fn level_from_log_level(lvl: LogLevel) -> tracing::Level {
    match lvl {
        LogLevel::Error => tracing::Level::ERROR,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Trace => tracing::Level::TRACE,
    }
}

fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(tracing::Level::ERROR),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "info" => Some(tracing::Level::INFO),
        "debug" => Some(tracing::Level::DEBUG),
        "trace" => Some(tracing::Level::TRACE),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_level_beats_verbose_and_env() {
        let lvl = resolve_level(true, Some(LogLevel::Warn), Some("trace"));
        assert_eq!(lvl, tracing::Level::WARN);
    }

    #[test]
    fn verbose_means_debug() {
        assert_eq!(resolve_level(true, None, Some("error")), tracing::Level::DEBUG);
    }

    #[test]
    fn env_then_default() {
        assert_eq!(resolve_level(false, None, Some(" Info ")), tracing::Level::INFO);
        assert_eq!(resolve_level(false, None, Some("bogus")), tracing::Level::ERROR);
        assert_eq!(resolve_level(false, None, None), tracing::Level::ERROR);
    }
}
