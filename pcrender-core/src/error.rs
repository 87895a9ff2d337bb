//! Error types for pcrender

use thiserror::Error;

/// Main error type for pcrender operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Result type alias for pcrender operations
pub type Result<T> = std::result::Result<T, Error>;
