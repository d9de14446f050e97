//! Error types for the store and its command front end.

use thiserror::Error;

/// Main error type for store, transaction and command operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// `COMMIT` or `ROLLBACK` issued with an empty transaction stack.
    #[error("NO TRANSACTION")]
    NoActiveTransaction,

    #[error("Unable to find {0} command.")]
    UnknownCommand(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
