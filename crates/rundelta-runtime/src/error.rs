//! Runtime errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Invalid config: {0}")]
    InvalidConfig(#[from] serde_json::Error),

    #[error("Session closed")]
    SessionClosed,

    #[error("Session task failed: {0}")]
    SessionTask(String),

    #[error("Logging init failed: {0}")]
    Logging(String),
}

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;
