// src/config/mod.rs

//! Configuration loading and validation for watchit.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Locate and load an optional config file (`loader.rs`).
//! - Validate values and merge them with CLI flags (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, resolve_settings};
pub use model::{ConfigFile, RawConfigFile, RunSection, RunSettings, Settings, WatchSection, WatchSettings};
