// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod ignore;
pub mod logging;
pub mod types;
pub mod watch;

use std::sync::Arc;

use tracing::info;

use crate::cli::CliArgs;
use crate::config::resolve_settings;
use crate::engine::{run_command_loop, run_once, WatchEngine};
use crate::errors::Result;
use crate::exec::ShellCommand;
use crate::fs::{FileSystem, RealFileSystem};
use crate::ignore::IgnoreRuleSet;
use crate::watch::NotifyBackend;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - settings (CLI flags over the optional config file)
/// - ignore rules for the current directory
/// - the `notify` backend and the watch engine
/// - one-shot or command-runner mode
///
/// In one-shot mode this returns `Ok(())` once a relevant change happened.
/// In command mode it only returns on error.
pub async fn run(args: CliArgs) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let settings = resolve_settings(&args, &cwd)?;

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let rules = IgnoreRuleSet::load(fs.as_ref(), &settings.root, &settings.watch)?;
    info!(root = ?settings.root, patterns = rules.len(), "ignore rules loaded");

    let backend = NotifyBackend::new()?;
    let mut engine = WatchEngine::new(settings.root.clone(), rules, backend, fs);

    match settings.command.as_deref() {
        None => {
            run_once(&mut engine).await?;
            Ok(())
        }
        Some(line) => {
            let command = ShellCommand::new(line);
            info!(cmd = %command.line(), "command mode");
            run_command_loop(&mut engine, &command, settings.run).await
        }
    }
}
