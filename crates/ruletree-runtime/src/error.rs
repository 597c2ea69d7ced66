//! Runtime error types

use thiserror::Error;

/// Runtime error
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Materializing a persisted condition tree failed
    #[error("condition tree error: {0}")]
    Core(#[from] ruletree_core::CoreError),
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;
