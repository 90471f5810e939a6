// src/engine/mod.rs

//! Orchestration engine for watchit.
//!
//! This module ties together:
//! - the ignore rules loaded at startup
//! - the watch registry and tree walker
//! - the event classifier
//!
//! The synchronous state machine lives in [`core`]; the async drivers for
//! one-shot and command-runner mode are implemented in [`runtime`].

use crate::types::RelPath;
use crate::watch::RawEventKind;

/// Lifecycle of a [`WatchEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Watches are not established yet; events are not processed.
    Initializing,
    /// Waiting for a relevant change.
    Watching,
    /// A relevant change was seen. No further events are processed until
    /// the engine is re-armed.
    Terminating,
}

/// The change that ended a watch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeReport {
    pub path: RelPath,
    pub kind: RawEventKind,
}

/// Result of feeding one event to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Keep watching.
    Continue,
    /// A relevant change; the engine is now `Terminating`.
    Changed(ChangeReport),
}

pub mod core;
pub mod runtime;

pub use core::WatchEngine;
pub use runtime::{run_command_loop, run_once};
