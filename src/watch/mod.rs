// src/watch/mod.rs

//! Directory watching and change classification.
//!
//! This module is responsible for:
//! - Translating `notify` events into [`RawEvent`]s ([`event`]).
//! - Abstracting the OS notification source ([`backend`]).
//! - Keeping exactly one watch per kept directory ([`registry`]).
//! - Finding the directories to watch ([`walker`]).
//! - Deciding whether an event is a relevant change ([`classifier`]).
//!
//! It does **not** decide when to stop; that is the engine's job.

pub mod backend;
pub mod classifier;
pub mod event;
pub mod path_utils;
pub mod registry;
pub mod walker;

pub use backend::{NotifyBackend, WatchBackend, WatchHandle};
pub use classifier::{classify, Decision};
pub use event::{RawEvent, RawEventKind};
pub use registry::{DirScan, WatchRegistry, WatchedDirectory};
pub use walker::{Discover, TreeWalker};
