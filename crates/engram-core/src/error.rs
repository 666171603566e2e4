//! Error types for engram-core.

use thiserror::Error;

use crate::storage::StoreError;

/// Result type alias using the engram-core Error
pub type Result<T> = std::result::Result<T, EngramError>;

/// Core error taxonomy for engram operations
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum EngramError {
    /// Empty content, out-of-range importance, or a reference to an id that
    /// does not exist
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Id-targeted operation on a missing entry
    #[error("Memory not found: {0}")]
    NotFound(String),

    /// The underlying store refused or failed; carries the originating detail
    #[error("Storage failure: {0}")]
    Storage(#[from] StoreError),

    /// Out-of-range configuration parameter
    #[error("Config error: {0}")]
    Config(String),
}

impl EngramError {
    /// Shorthand for invalid-input errors
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
