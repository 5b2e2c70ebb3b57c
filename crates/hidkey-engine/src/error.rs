//! Error types for the hidkey engine.

use std::result::Result as StdResult;

use thiserror::Error;
use tokio::task::JoinError;

/// Convenient result type for the engine crate.
pub type Result<T> = StdResult<T, Error>;

/// Unified error type for the hidkey engine.
#[derive(Debug, Error)]
pub enum Error {
    /// The engine loop has stopped and no longer accepts samples.
    #[error("Engine closed")]
    Closed,

    /// Timers were requested outside a tokio runtime.
    #[error("No tokio runtime available for timers")]
    NoRuntime,

    /// Configuration could not be loaded or validated.
    #[error("Config error: {0}")]
    Config(#[from] config::Error),

    /// The engine task panicked or was aborted.
    #[error("Engine task failed: {0}")]
    Task(#[from] JoinError),
}
