// tests/notify_scenarios.rs

//! The change-detection scenarios against the real `notify` backend.

#![cfg(target_os = "linux")]

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use watchit::config::WatchSettings;
use watchit::engine::{ChangeReport, WatchEngine};
use watchit::fs::{FileSystem, RealFileSystem};
use watchit::ignore::IgnoreRuleSet;
use watchit::watch::NotifyBackend;
use watchit_test_utils::{init_tracing, within, TestResult, SCENARIO_GITIGNORE};

const CHANGE_WAIT: Duration = Duration::from_secs(5);
const SILENCE_WAIT: Duration = Duration::from_millis(1500);

struct Scenario {
    dir: TempDir,
    engine: WatchEngine<NotifyBackend>,
}

impl Scenario {
    fn start() -> Result<Self, Box<dyn std::error::Error>> {
        init_tracing();
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join(".gitignore"), SCENARIO_GITIGNORE)?;
        fs::write(dir.path().join("existing_file"), "Existing contents")?;

        let root = dir.path().canonicalize()?;
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let rules = IgnoreRuleSet::load(fs.as_ref(), &root, &WatchSettings::default())?;
        let mut engine = WatchEngine::new(root, rules, NotifyBackend::new()?, fs);
        engine.initialize()?;
        Ok(Self { dir, engine })
    }

    fn path(&self, rel: &str) -> std::path::PathBuf {
        self.dir.path().join(rel)
    }

    async fn expect_change(&mut self) -> Result<ChangeReport, Box<dyn std::error::Error>> {
        let report = within(CHANGE_WAIT, self.engine.run_until_change())
            .await
            .ok_or("no change detected in time")??;
        Ok(report)
    }

    async fn expect_silence(&mut self) {
        let res = within(SILENCE_WAIT, self.engine.run_until_change()).await;
        assert!(res.is_none(), "unexpected change: {res:?}");
    }
}

fn write(path: &Path, contents: &str) -> std::io::Result<()> {
    fs::write(path, contents)
}

#[tokio::test]
async fn writing_a_new_file_exits() -> TestResult {
    let mut s = Scenario::start()?;
    write(&s.path("new_file"), "New stuff")?;

    let report = s.expect_change().await?;
    assert_eq!(report.path, "new_file");
    Ok(())
}

#[tokio::test]
async fn overwriting_an_existing_file_exits() -> TestResult {
    let mut s = Scenario::start()?;
    write(&s.path("existing_file"), "New contents")?;

    let report = s.expect_change().await?;
    assert_eq!(report.path, "existing_file");
    Ok(())
}

#[tokio::test]
async fn deleting_an_existing_file_exits() -> TestResult {
    let mut s = Scenario::start()?;
    fs::remove_file(s.path("existing_file"))?;

    let report = s.expect_change().await?;
    assert_eq!(report.path, "existing_file");
    Ok(())
}

#[tokio::test]
async fn renaming_an_existing_file_exits() -> TestResult {
    let mut s = Scenario::start()?;
    fs::rename(s.path("existing_file"), s.path("moved_file"))?;

    let report = s.expect_change().await?;
    assert!(
        report.path == "existing_file" || report.path == "moved_file",
        "unexpected path {}",
        report.path
    );
    Ok(())
}

#[tokio::test]
async fn new_subdirectory_waits_for_activity_inside() -> TestResult {
    let mut s = Scenario::start()?;
    fs::create_dir(s.path("subdirectory"))?;
    s.expect_silence().await;
    assert!(s.engine.registry().contains("subdirectory"));

    write(&s.path("subdirectory/new_file"), "New stuff")?;
    let report = s.expect_change().await?;
    assert_eq!(report.path, "subdirectory/new_file");
    Ok(())
}

#[tokio::test]
async fn creating_an_ignored_file_does_not_exit() -> TestResult {
    let mut s = Scenario::start()?;
    write(&s.path("new_file.ignored_file"), "New stuff")?;
    s.expect_silence().await;
    Ok(())
}

#[tokio::test]
async fn activity_in_an_ignored_directory_does_not_exit() -> TestResult {
    let mut s = Scenario::start()?;
    fs::create_dir(s.path("ignored_directory"))?;
    s.expect_silence().await;

    write(&s.path("ignored_directory/new_file"), "New stuff")?;
    s.expect_silence().await;
    assert!(!s.engine.registry().contains("ignored_directory"));
    Ok(())
}

#[tokio::test]
async fn removing_a_subdirectory_exits() -> TestResult {
    let mut s = Scenario::start()?;
    fs::create_dir(s.path("subdirectory"))?;
    s.expect_silence().await;

    fs::remove_dir(s.path("subdirectory"))?;
    let report = s.expect_change().await?;
    assert_eq!(report.path, "subdirectory");
    assert!(!s.engine.registry().contains("subdirectory"));
    Ok(())
}
