//! Unified error type for APDU operations

use thiserror::Error;

/// Transport error type
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection error
    #[error("Failed to connect to device")]
    Connection,

    /// Transmission error
    #[error("Failed to transmit data")]
    Transmission,

    /// Device error
    #[error("Device error")]
    Device,

    /// Timeout error
    #[error("Operation timed out")]
    Timeout,

    /// Cancelled operation
    #[error("Operation cancelled")]
    Cancelled,

    /// Other error with message
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Create a general other error
    pub fn other<S: Into<String>>(message: S) -> Self {
        Self::Other(message.into())
    }
}

/// The main error type for APDU operations
#[derive(Debug, Error)]
pub enum Error {
    /// Transport-related errors
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Parse errors
    #[error("Parse error: {0}")]
    Parse(&'static str),

    /// Command frame has an impossible length
    #[error("Invalid command length: {0}")]
    InvalidCommandLength(usize),

    /// Other errors with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a parse error
    pub const fn parse(message: &'static str) -> Self {
        Self::Parse(message)
    }

    /// Create a generic other error
    pub fn other<S: Into<String>>(message: S) -> Self {
        Self::Other(message.into())
    }
}

/// Result type for APDU operations
pub type Result<T> = core::result::Result<T, Error>;
