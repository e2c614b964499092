use thiserror::Error;

use super::lifecycle::LifecycleState;

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Install failed fetching {url}: {reason}")]
    InstallFailed { url: String, reason: String },

    #[error("Cannot {operation} while {actual} (expected {expected})")]
    InvalidState {
        operation: &'static str,
        expected: LifecycleState,
        actual: LifecycleState,
    },

    #[error("Invalid shell path {path}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Cache storage error: {0}")]
    Storage(#[from] anyhow::Error),
}
