//! Error types for zvd-shape

use thiserror::Error;

/// Result type alias for adapter and resampler operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for zvd-shape
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Fewer bytes are queued than the caller asked for
    #[error("Buffer too small: need {need}, have {have}")]
    BufferTooSmall { need: usize, have: usize },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Initialization error
    #[error("Initialization error: {0}")]
    Init(String),
}

impl Error {
    /// Create an undersupply error
    pub fn too_small(need: usize, have: usize) -> Self {
        Error::BufferTooSmall { need, have }
    }

    /// Create an invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Whether this error means "push more data and try again"
    pub fn is_underflow(&self) -> bool {
        matches!(self, Error::BufferTooSmall { .. })
    }
}
