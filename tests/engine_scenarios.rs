// tests/engine_scenarios.rs

//! Change-detection scenarios against a mock tree and a scripted backend.

use std::path::PathBuf;

use watchit::engine::{ChangeReport, EngineState, Step};
use watchit::errors::WatchitError;
use watchit::types::EntryKind;
use watchit::watch::{RawEvent, RawEventKind};
use watchit_test_utils::{
    init_tracing, with_timeout, EngineBuilder, RepoBuilder, TestEngine, TestResult,
};

fn scenario_engine() -> TestEngine {
    init_tracing();
    EngineBuilder::new(RepoBuilder::scenario().build()).start()
}

fn changed(path: &str, kind: RawEventKind) -> Step {
    Step::Changed(ChangeReport {
        path: path.to_string(),
        kind,
    })
}

fn dir_created(rel: &str) -> RawEvent {
    RawEvent::created(PathBuf::from("/repo").join(rel)).with_hint(EntryKind::Directory)
}

fn file_created(rel: &str) -> RawEvent {
    RawEvent::created(PathBuf::from("/repo").join(rel))
}

#[test]
fn initialize_watches_every_kept_directory() {
    init_tracing();
    let fs = RepoBuilder::scenario()
        .with_file("src/main.rs", "")
        .with_file("src/bin/tool.rs", "")
        .with_file("ignored_directory/out.bin", "")
        .with_file(".git/HEAD", "ref: refs/heads/main")
        .build();
    let t = EngineBuilder::new(fs).start();

    assert_eq!(t.engine.state(), EngineState::Watching);
    assert_eq!(t.engine.registry().watched_dirs(), vec!["", "src", "src/bin"]);
}

#[tokio::test]
async fn scenario_new_file_is_a_change() -> TestResult {
    let mut t = scenario_engine();
    t.fs.add_file("new_file", "New stuff");
    t.events.created("new_file");

    let report = with_timeout(t.engine.run_until_change()).await?;

    assert_eq!(report.path, "new_file");
    assert_eq!(report.kind, RawEventKind::Created);
    assert_eq!(t.engine.state(), EngineState::Terminating);
    Ok(())
}

#[tokio::test]
async fn scenario_overwrite_existing_file_is_a_change() -> TestResult {
    let mut t = scenario_engine();
    t.events.modified("existing_file");

    let report = with_timeout(t.engine.run_until_change()).await?;
    assert_eq!(report.path, "existing_file");
    assert_eq!(report.kind, RawEventKind::Modified);
    Ok(())
}

#[tokio::test]
async fn scenario_delete_existing_file_is_a_change() -> TestResult {
    let mut t = scenario_engine();
    t.fs.remove("existing_file");
    t.events.removed("existing_file");

    let report = with_timeout(t.engine.run_until_change()).await?;
    assert_eq!(report.path, "existing_file");
    assert_eq!(report.kind, RawEventKind::Removed);
    Ok(())
}

#[tokio::test]
async fn scenario_rename_existing_file_is_a_change() -> TestResult {
    let mut t = scenario_engine();
    t.fs.remove("existing_file");
    t.fs.add_file("moved_file", "Existing contents");
    t.events.renamed("existing_file", "moved_file");

    let report = with_timeout(t.engine.run_until_change()).await?;
    assert_eq!(report.path, "existing_file");
    assert_eq!(report.kind, RawEventKind::RenamedFrom);
    Ok(())
}

#[test]
fn scenario_new_subdirectory_alone_is_not_a_change() {
    let mut t = scenario_engine();
    t.fs.add_dir("subdirectory");

    assert_eq!(t.engine.handle_event(dir_created("subdirectory")), Step::Continue);
    assert_eq!(t.engine.state(), EngineState::Watching);
    assert!(t.engine.registry().contains("subdirectory"));

    t.fs.add_file("subdirectory/new_file", "New stuff");
    assert_eq!(
        t.engine.handle_event(file_created("subdirectory/new_file")),
        changed("subdirectory/new_file", RawEventKind::Created)
    );
}

#[test]
fn scenario_ignored_file_is_not_a_change() {
    let mut t = scenario_engine();
    t.fs.add_file("new_file.ignored_file", "New stuff");

    assert_eq!(
        t.engine.handle_event(file_created("new_file.ignored_file")),
        Step::Continue
    );
    assert_eq!(t.engine.state(), EngineState::Watching);
}

#[test]
fn scenario_ignored_directory_and_its_contents_are_not_changes() {
    let mut t = scenario_engine();
    t.fs.add_dir("ignored_directory");

    assert_eq!(t.engine.handle_event(dir_created("ignored_directory")), Step::Continue);
    assert!(!t.engine.registry().contains("ignored_directory"));

    t.fs.add_file("ignored_directory/new_file", "New stuff");
    assert_eq!(
        t.engine.handle_event(file_created("ignored_directory/new_file")),
        Step::Continue
    );
    assert_eq!(t.engine.state(), EngineState::Watching);
}

#[test]
fn file_written_before_new_directory_was_watched_is_caught() {
    let mut t = scenario_engine();
    t.fs.add_file("subdirectory/early_file", "raced");

    assert_eq!(
        t.engine.handle_event(dir_created("subdirectory")),
        changed("subdirectory/early_file", RawEventKind::Created)
    );
}

#[test]
fn ignored_files_in_new_directory_scan_are_not_changes() {
    let mut t = scenario_engine();
    t.fs.add_file("subdirectory/a.ignored_file", "");
    t.fs.add_file("subdirectory/deeper/b.ignored_file", "");

    assert_eq!(t.engine.handle_event(dir_created("subdirectory")), Step::Continue);
    assert_eq!(
        t.engine.registry().watched_dirs(),
        vec!["", "subdirectory", "subdirectory/deeper"]
    );
}

#[test]
fn nested_new_directories_are_all_registered() {
    let mut t = scenario_engine();
    t.fs.add_dir("a/b/c");
    t.fs.add_dir("a/ignored_directory");

    assert_eq!(t.engine.handle_event(dir_created("a")), Step::Continue);
    // `/ignored_directory` is anchored, so the nested one is kept.
    assert_eq!(
        t.engine.registry().watched_dirs(),
        vec!["", "a", "a/b", "a/b/c", "a/ignored_directory"]
    );
}

#[test]
fn directory_removal_is_a_change_and_releases_watches() {
    init_tracing();
    let fs = RepoBuilder::scenario().with_dir("sub/inner").build();
    let mut t = EngineBuilder::new(fs).start();
    assert!(t.engine.registry().contains("sub/inner"));

    t.fs.remove("sub");
    let ev = RawEvent::removed("/repo/sub").with_hint(EntryKind::Directory);
    assert_eq!(t.engine.handle_event(ev), changed("sub", RawEventKind::Removed));
    assert_eq!(t.engine.registry().watched_dirs(), vec![""]);
    assert_eq!(t.events.active(), vec![PathBuf::from("/repo")]);
}

#[test]
fn renamed_directory_moves_its_watches() {
    init_tracing();
    let fs = RepoBuilder::scenario().with_dir("old/inner").build();
    let mut t = EngineBuilder::new(fs).start();

    t.fs.remove("old");
    t.fs.add_dir("new/inner");
    t.events.renamed("old", "new");

    assert_eq!(t.engine.drain_pending(), 2);
    assert_eq!(t.engine.registry().watched_dirs(), vec!["", "new", "new/inner"]);
    assert_eq!(t.engine.state(), EngineState::Watching);
}

#[test]
fn first_relevant_change_wins() {
    let mut t = scenario_engine();

    assert!(matches!(
        t.engine.handle_event(RawEvent::modified("/repo/existing_file")),
        Step::Changed(_)
    ));
    // Further events are not processed once terminating.
    t.fs.add_dir("subdirectory");
    assert_eq!(t.engine.handle_event(dir_created("subdirectory")), Step::Continue);
    assert!(!t.engine.registry().contains("subdirectory"));
    assert_eq!(t.engine.state(), EngineState::Terminating);
}

#[test]
fn vcs_directory_is_excluded_by_default() {
    init_tracing();
    let fs = RepoBuilder::scenario().with_file(".git/index", "").build();
    let mut t = EngineBuilder::new(fs).start();

    assert!(!t.engine.registry().contains(".git"));
    assert_eq!(
        t.engine.handle_event(RawEvent::modified("/repo/.git/index")),
        Step::Continue
    );
}

#[test]
fn events_outside_the_root_are_ignored() {
    let mut t = scenario_engine();
    assert_eq!(
        t.engine.handle_event(RawEvent::modified("/elsewhere/file")),
        Step::Continue
    );
}

#[test]
fn unwatchable_subdirectory_is_skipped_at_startup() {
    init_tracing();
    let fs = RepoBuilder::scenario().with_dir("docs/api").with_dir("src").build();
    let mut t = EngineBuilder::new(fs).build();
    t.events.fail_registration("docs");

    t.engine.initialize().unwrap();

    assert_eq!(t.engine.state(), EngineState::Watching);
    assert_eq!(t.engine.registry().watched_dirs(), vec!["", "src"]);
}

#[test]
fn unwatchable_root_is_fatal() {
    init_tracing();
    let mut t = EngineBuilder::new(RepoBuilder::scenario().build()).build();
    t.events.fail_registration("");

    let err = t.engine.initialize().unwrap_err();
    assert!(matches!(err, WatchitError::WatchError { .. }));
    assert_eq!(t.engine.state(), EngineState::Initializing);
}

#[test]
fn unwatchable_new_directory_does_not_stop_the_engine() {
    let mut t = scenario_engine();
    t.fs.add_file("subdirectory/file", "");
    t.events.fail_registration("subdirectory");

    assert_eq!(t.engine.handle_event(dir_created("subdirectory")), Step::Continue);
    assert_eq!(t.engine.state(), EngineState::Watching);
    assert!(!t.engine.registry().contains("subdirectory"));
}

#[tokio::test]
async fn closed_backend_is_an_error() {
    let t = scenario_engine();
    let TestEngine { mut engine, events, .. } = t;
    drop(events);

    let err = with_timeout(engine.run_until_change()).await.unwrap_err();
    assert!(matches!(err, WatchitError::BackendClosed));
}

#[tokio::test]
async fn run_until_change_rearms_after_a_change() -> TestResult {
    let mut t = scenario_engine();
    t.events.modified("existing_file");
    t.events.created("second.ignored_file");
    t.events.modified("existing_file");

    let first = with_timeout(t.engine.run_until_change()).await?;
    let second = with_timeout(t.engine.run_until_change()).await?;

    assert_eq!(first.path, "existing_file");
    assert_eq!(second.path, "existing_file");
    Ok(())
}

#[tokio::test]
async fn run_until_change_initializes_lazily() -> TestResult {
    init_tracing();
    let mut t = EngineBuilder::new(RepoBuilder::scenario().build()).build();
    assert_eq!(t.engine.state(), EngineState::Initializing);

    t.events.modified("existing_file");
    let report = with_timeout(t.engine.run_until_change()).await?;

    assert_eq!(report.path, "existing_file");
    assert!(t.engine.registry().contains(""));
    Ok(())
}

#[test]
fn drain_absorbs_changes_without_terminating() {
    let mut t = scenario_engine();
    t.fs.add_dir("subdirectory");
    t.events.modified("existing_file");
    t.events.created_dir("subdirectory");

    assert_eq!(t.engine.drain_pending(), 2);
    assert_eq!(t.engine.state(), EngineState::Watching);
    assert!(t.engine.registry().contains("subdirectory"));
    assert_eq!(t.engine.drain_pending(), 0);
}
