//! Error handling for the hidkey binary.

use std::{io, result};

use thiserror::Error;

/// Convenient result type for CLI operations.
pub type Result<T> = result::Result<T, Error>;

/// Errors that can occur while running a subcommand.
#[derive(Debug, Error)]
pub enum Error {
    /// Wrapper for standard I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Configuration loading or validation errors.
    #[error("Configuration error: {}", .0.pretty())]
    Config(#[from] config::Error),
    /// Errors surfaced by the gesture engine.
    #[error("Engine error: {0}")]
    Engine(#[from] hidkey_engine::Error),
    /// Failed to serialize output.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// A sample script line could not be parsed.
    #[error("script line {line}: {message}")]
    Script {
        /// 1-based line number.
        line: usize,
        /// What was wrong with it.
        message: String,
    },
}

impl Error {
    /// Helper to build a script error for `line`.
    pub fn script<M: Into<String>>(line: usize, msg: M) -> Self {
        Self::Script {
            line,
            message: msg.into(),
        }
    }
}
