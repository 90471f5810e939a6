// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchitError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A single directory could not be watched. Never fatal to the run.
    #[error("Could not watch {path:?}: {message}")]
    WatchError { path: PathBuf, message: String },

    #[error("Could not classify event: {0}")]
    Classify(String),

    #[error("Filesystem notification stream closed")]
    BackendClosed,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, WatchitError>;
