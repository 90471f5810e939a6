// src/engine/runtime.rs

use std::time::Duration;

use tracing::{debug, info};

use crate::config::RunSettings;
use crate::engine::{ChangeReport, EngineState, WatchEngine};
use crate::errors::Result;
use crate::exec::{run_cycle, ShellCommand};
use crate::watch::WatchBackend;

/// One-shot mode: watch until the first relevant change and report it.
pub async fn run_once<B: WatchBackend>(engine: &mut WatchEngine<B>) -> Result<ChangeReport> {
    engine.initialize()?;
    info!("watching for changes");
    let report = engine.run_until_change().await?;
    info!(path = %report.path, kind = ?report.kind, "change detected; exiting");
    Ok(report)
}

/// Command-runner mode: run `command`, then run it again after every
/// relevant change, forever.
///
/// Each cycle waits `run.quiet_period` and drains the events that piled up
/// before starting the command, so a burst of writes leads to one run.
/// Only engine failures end the loop.
pub async fn run_command_loop<B: WatchBackend>(
    engine: &mut WatchEngine<B>,
    command: &ShellCommand,
    run: RunSettings,
) -> Result<()> {
    if engine.state() == EngineState::Initializing {
        engine.initialize()?;
    }

    loop {
        settle(engine, run.quiet_period).await;

        let outcome = run_cycle(command, engine, run.interrupt).await?;
        if let Some(report) = &outcome.changed {
            debug!(path = %report.path, "tree changed during run; starting next cycle");
            continue;
        }

        let report = engine.run_until_change().await?;
        info!(path = %report.path, kind = ?report.kind, "change detected");
    }
}

async fn settle<B: WatchBackend>(engine: &mut WatchEngine<B>, quiet_period: Duration) {
    engine.rearm();
    if !quiet_period.is_zero() {
        tokio::time::sleep(quiet_period).await;
    }
    engine.drain_pending();
}
