// src/exec/command.rs

//! Shell command runner for command mode.

use std::process::{ExitStatus, Stdio};

use anyhow::{Context, Result as AnyResult};
use tokio::process::{Child, Command};
use tracing::{error, info, warn};

use crate::engine::{ChangeReport, WatchEngine};
use crate::errors::Result;
use crate::watch::WatchBackend;

/// A command line handed to the platform shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    line: String,
}

impl ShellCommand {
    pub fn new(line: impl Into<String>) -> Self {
        Self { line: line.into() }
    }

    pub fn line(&self) -> &str {
        &self.line
    }

    /// Build a shell command appropriate for the platform.
    ///
    /// Standard streams are inherited; the child is killed if its handle is
    /// dropped.
    pub fn to_command(&self) -> Command {
        let mut cmd = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(&self.line);
            c
        } else {
            let mut c = Command::new("sh");
            c.arg("-c").arg(&self.line);
            c
        };
        cmd.stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        cmd
    }

    pub fn spawn(&self) -> AnyResult<Child> {
        self.to_command()
            .spawn()
            .with_context(|| format!("spawning command '{}'", self.line))
    }
}

/// What happened during one run of the command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleOutcome {
    /// Exit status, or `None` if the command could not be started or waited on.
    pub status: Option<ExitStatus>,
    /// First relevant change seen while the command was running.
    pub changed: Option<ChangeReport>,
    /// Whether the command was killed because of that change.
    pub interrupted: bool,
}

impl CycleOutcome {
    pub fn is_dirty(&self) -> bool {
        self.changed.is_some()
    }
}

/// Run `command` once while the engine keeps watching.
///
/// A relevant change during the run is recorded; with `interrupt` the
/// child is killed straight away. Failing to start the command is logged
/// and reported as a cycle without status. Only engine failures are
/// returned as errors.
pub async fn run_cycle<B: WatchBackend>(
    command: &ShellCommand,
    engine: &mut WatchEngine<B>,
    interrupt: bool,
) -> Result<CycleOutcome> {
    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(err) => {
            error!(cmd = %command.line(), error = %format!("{err:#}"), "command could not be started");
            return Ok(CycleOutcome {
                status: None,
                changed: None,
                interrupted: false,
            });
        }
    };
    info!(cmd = %command.line(), pid = ?child.id(), "running command");

    let mut changed: Option<ChangeReport> = None;
    let mut interrupted = false;

    let status = loop {
        tokio::select! {
            status_res = child.wait() => {
                break status_res
                    .with_context(|| format!("waiting for command '{}'", command.line()));
            }

            report = engine.run_until_change(), if changed.is_none() => {
                let report = report?;
                info!(path = %report.path, "change detected while command is running");
                if interrupt {
                    info!(cmd = %command.line(), "interrupting command");
                    match child.start_kill() {
                        Ok(()) => interrupted = true,
                        Err(e) => warn!(error = %e, "failed to kill command"),
                    }
                }
                changed = Some(report);
            }
        }
    };

    let status = match status {
        Ok(status) => {
            log_exit(command, status, interrupted);
            Some(status)
        }
        Err(err) => {
            error!(cmd = %command.line(), error = %format!("{err:#}"), "lost track of command");
            None
        }
    };

    Ok(CycleOutcome {
        status,
        changed,
        interrupted,
    })
}

fn log_exit(command: &ShellCommand, status: ExitStatus, interrupted: bool) {
    if interrupted {
        info!(cmd = %command.line(), "command interrupted");
    } else if status.success() {
        info!(cmd = %command.line(), "command finished");
    } else {
        error!(
            cmd = %command.line(),
            exit_code = status.code().unwrap_or(-1),
            "command failed"
        );
    }
}
