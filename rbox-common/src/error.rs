//! Common error types for Recipe Box

use thiserror::Error;

/// Common result type for Recipe Box operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the Recipe Box crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed data received at a boundary (wire payload, user input)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
