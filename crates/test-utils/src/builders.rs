#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use watchit::engine::WatchEngine;
use watchit::fs::mock::MockFileSystem;
use watchit::ignore::IgnoreRuleSet;

use crate::fake_backend::{FakeBackend, FakeBackendHandle};

/// Root of every mock repository.
pub const REPO_ROOT: &str = "/repo";

/// The ignore file used by the change-detection scenarios.
pub const SCENARIO_GITIGNORE: &str = "/ignored_directory\n*.ignored_file\n";

/// Builder for a mock repository tree.
pub struct RepoBuilder {
    fs: MockFileSystem,
}

impl RepoBuilder {
    pub fn new() -> Self {
        Self {
            fs: MockFileSystem::new(REPO_ROOT),
        }
    }

    /// `.gitignore` with the scenario rules plus `existing_file`.
    pub fn scenario() -> Self {
        Self::new()
            .with_gitignore(SCENARIO_GITIGNORE)
            .with_file("existing_file", "Existing contents")
    }

    pub fn with_gitignore(self, contents: &str) -> Self {
        self.with_file(".gitignore", contents)
    }

    pub fn with_file(self, rel: &str, contents: &str) -> Self {
        self.fs.add_file(rel, contents);
        self
    }

    pub fn with_dir(self, rel: &str) -> Self {
        self.fs.add_dir(rel);
        self
    }

    pub fn build(self) -> MockFileSystem {
        self.fs
    }
}

impl Default for RepoBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// An engine over a mock tree and a fake backend.
pub struct TestEngine {
    pub engine: WatchEngine<FakeBackend>,
    pub fs: MockFileSystem,
    pub events: FakeBackendHandle,
}

/// Builder for [`TestEngine`].
pub struct EngineBuilder {
    fs: MockFileSystem,
    rules: Option<IgnoreRuleSet>,
}

impl EngineBuilder {
    pub fn new(fs: MockFileSystem) -> Self {
        Self { fs, rules: None }
    }

    /// Use explicit rules instead of loading them from the tree.
    pub fn with_rules(mut self, rules: IgnoreRuleSet) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Build without initializing.
    pub fn build(self) -> TestEngine {
        let root = PathBuf::from(REPO_ROOT);
        let rules = match self.rules {
            Some(rules) => rules,
            None => IgnoreRuleSet::load(&self.fs, &root, &Default::default())
                .expect("Failed to load ignore rules for test repo"),
        };
        let (backend, events) = FakeBackend::new(&root);
        let engine = WatchEngine::new(root, rules, backend, Arc::new(self.fs.clone()));
        TestEngine {
            engine,
            fs: self.fs,
            events,
        }
    }

    /// Build and initialize.
    pub fn start(self) -> TestEngine {
        let mut t = self.build();
        t.engine
            .initialize()
            .expect("Failed to initialize test engine");
        t
    }
}
