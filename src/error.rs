//! Error types for passlock.

use thiserror::Error;

/// Main error type for generator and store operations.
#[derive(Error, Debug)]
pub enum PasslockError {
    #[error("Invalid generation criteria: {0}")]
    InvalidCriteria(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Entry not found: {0}")]
    NotFound(String),

    #[error("Credential store has not been hydrated yet")]
    NotHydrated,

    #[error("A generation request is already in flight")]
    GenerationInFlight,

    #[error("Strength evaluation did not complete: {0}")]
    TransientFailure(String),

    #[error("Clipboard operation failed")]
    ClipboardFailed,

    #[error("Operation cancelled by user")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PasslockError>;
