// src/ignore/mod.rs

//! Gitignore-compatible exclusion rules.
//!
//! - [`pattern`] parses single lines of gitignore syntax into compiled
//!   [`IgnorePattern`]s.
//! - [`rules`] holds the ordered [`IgnoreRuleSet`] and answers
//!   "is this root-relative path ignored?".
//!
//! Evaluation is a pure function of the ordered rule list, the candidate
//! path and whether it is a directory. Nothing here touches the watcher.

pub mod pattern;
pub mod rules;

pub use pattern::IgnorePattern;
pub use rules::{IgnoreRuleSet, IgnoreRuleSetBuilder, GIT_EXCLUDE_FILE, VCS_DIR_PATTERN};
