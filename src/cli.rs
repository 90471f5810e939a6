// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

const LONG_ABOUT: &str = "\
Waits for a file under the current directory to change, then exits (or runs a command).

Anything git would consider tracking (i.e. not excluded by .gitignore) is watched.
Changes to ignored files and directories never count.

Without COMMAND, watchit exits with status 0 on the first relevant change, which
makes it usable in shell loops:

    while watchit; do cargo test; done

With COMMAND, the command is run through /bin/sh once at startup and again after
every relevant change:

    watchit 'cargo fmt && cargo test'";

/// Command-line arguments for `watchit`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "watchit",
    version,
    about = "Wait for a relevant file change, or run a command on every change.",
    long_about = LONG_ABOUT
)]
pub struct CliArgs {
    /// Command to run whenever a file changes. Passed to `sh -c`.
    #[arg(value_name = "COMMAND")]
    pub command: Option<String>,

    /// Seconds to wait after a change before (re)starting COMMAND.
    ///
    /// Overrides `[run].quiet_period` from the config file (default 0.5).
    #[arg(short = 'q', long, value_name = "SECONDS")]
    pub quiet_period: Option<f64>,

    /// Kill the running COMMAND as soon as a change is detected, then restart it.
    #[arg(short = 'p', long)]
    pub interrupt: bool,

    /// Log watch registration and classification decisions to stderr.
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to a TOML config file.
    ///
    /// Default: `.watchit.toml` in the current directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace). Takes precedence over `-v`.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_invocation_is_one_shot() {
        let args = CliArgs::try_parse_from(["watchit"]).unwrap();
        assert!(args.command.is_none());
        assert!(!args.verbose);
        assert!(args.quiet_period.is_none());
    }

    #[test]
    fn short_flags_parse() {
        let args =
            CliArgs::try_parse_from(["watchit", "-v", "-p", "-q", "1.5", "cargo test"]).unwrap();
        assert!(args.verbose);
        assert!(args.interrupt);
        assert_eq!(args.quiet_period, Some(1.5));
        assert_eq!(args.command.as_deref(), Some("cargo test"));
    }
}
