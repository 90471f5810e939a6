// tests/command_mode.rs

#![cfg(unix)]

use std::time::{Duration, Instant};

use watchit::config::RunSettings;
use watchit::engine::{run_command_loop, EngineState};
use watchit::errors::WatchitError;
use watchit::exec::{run_cycle, ShellCommand};
use watchit_test_utils::{init_tracing, with_timeout, EngineBuilder, RepoBuilder, TestEngine, TestResult};

fn engine() -> TestEngine {
    init_tracing();
    EngineBuilder::new(RepoBuilder::scenario().build()).start()
}

#[tokio::test]
async fn quiet_cycle_reports_exit_status() -> TestResult {
    let mut t = engine();
    let outcome = with_timeout(run_cycle(&ShellCommand::new("exit 4"), &mut t.engine, false)).await?;

    assert_eq!(outcome.status.and_then(|s| s.code()), Some(4));
    assert!(!outcome.is_dirty());
    assert!(!outcome.interrupted);
    assert_eq!(t.engine.state(), EngineState::Watching);
    Ok(())
}

#[tokio::test]
async fn change_during_run_marks_cycle_dirty() -> TestResult {
    let mut t = engine();
    t.events.modified("existing_file");

    let outcome =
        with_timeout(run_cycle(&ShellCommand::new("sleep 0.2"), &mut t.engine, false)).await?;

    assert!(outcome.is_dirty());
    assert!(!outcome.interrupted);
    assert!(outcome.status.is_some_and(|s| s.success()));
    assert_eq!(outcome.changed.map(|c| c.path), Some("existing_file".to_string()));
    Ok(())
}

#[tokio::test]
async fn interrupt_kills_running_command_on_change() -> TestResult {
    let mut t = engine();
    t.events.modified("existing_file");

    let started = Instant::now();
    let outcome =
        with_timeout(run_cycle(&ShellCommand::new("sleep 30"), &mut t.engine, true)).await?;

    assert!(outcome.interrupted);
    assert!(outcome.is_dirty());
    assert!(outcome.status.is_some_and(|s| !s.success()));
    assert!(started.elapsed() < Duration::from_secs(5));
    Ok(())
}

#[tokio::test]
async fn ignored_change_leaves_cycle_clean() -> TestResult {
    let mut t = engine();
    t.events.created("build.ignored_file");

    let outcome =
        with_timeout(run_cycle(&ShellCommand::new("sleep 0.2"), &mut t.engine, false)).await?;
    assert!(!outcome.is_dirty());
    Ok(())
}

#[tokio::test]
async fn command_loop_stops_when_backend_closes() {
    let t = engine();
    let TestEngine { mut engine, events, .. } = t;
    drop(events);

    let run = RunSettings {
        quiet_period: Duration::ZERO,
        interrupt: false,
    };
    let err = with_timeout(run_command_loop(&mut engine, &ShellCommand::new("true"), run))
        .await
        .unwrap_err();
    assert!(matches!(err, WatchitError::BackendClosed));
}
