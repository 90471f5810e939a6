// src/exec/mod.rs

//! Process execution layer.
//!
//! Command-runner mode runs a user command through the platform shell
//! with `tokio::process::Command`, while the watch engine keeps listening
//! for changes.
//!
//! - [`command`] builds and spawns the shell command and runs one cycle.

pub mod command;

pub use command::{run_cycle, CycleOutcome, ShellCommand};
