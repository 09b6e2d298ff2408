//! Error types for the port watcher

use thiserror::Error;

/// Errors returned by the watcher handle
#[derive(Debug, Error)]
pub enum WatchError {
    /// The watcher task is no longer running
    #[error("port watcher has stopped")]
    Stopped,

    /// The watcher task panicked or was cancelled
    #[error("port watcher task failed: {0}")]
    TaskFailed(String),
}
