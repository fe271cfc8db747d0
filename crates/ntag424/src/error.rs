//! Error types for NTAG 424 DNA operations
//!
//! This module centralizes all error variants to simplify error handling
//! and propagation throughout the driver. Secure-messaging failures that
//! leave the host and card counters in disagreement tear the session down
//! before the error is surfaced.

use ntag424_apdu_core::StatusWord;
use thiserror::Error;

/// Result type for NTAG 424 DNA operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for NTAG 424 DNA operations
#[derive(Debug, Error)]
pub enum Error {
    /// Transport or framing failure below the secure-messaging layer
    #[error(transparent)]
    Transport(#[from] ntag424_apdu_core::Error),

    /// The card answered a command with an error status word
    #[error("command {command:02X?} failed with status {sw} ({})", .sw.description())]
    CardStatus {
        /// CLA and INS of the failing command
        command: [u8; 2],
        /// The status word returned by the card
        sw: StatusWord,
    },

    /// Response MAC verification failed
    #[error("response MAC mismatch")]
    MacMismatch,

    /// A secured operation was attempted without an authenticated session
    #[error("not authenticated")]
    NotAuthenticated,

    /// Arguments rejected before any APDU was issued
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The session state no longer matches the card
    #[error("protocol desynchronised: {0}")]
    ProtocolDesync(&'static str),

    /// Context with source error
    #[error("{context}: {source}")]
    Context {
        /// Contextual message
        context: String,
        /// Source error
        source: Box<Self>,
    },

    /// Other error with a static message
    #[error("{0}")]
    Other(&'static str),

    /// Other error with a dynamic message
    #[error("{0}")]
    Message(String),
}

impl Error {
    /// Create a new error with context information
    pub fn with_context<S: Into<String>>(self, context: S) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create a new card status error
    pub const fn card_status(cla: u8, ins: u8, sw: StatusWord) -> Self {
        Self::CardStatus {
            command: [cla, ins],
            sw,
        }
    }

    /// Create a new error with a static message
    pub const fn other(message: &'static str) -> Self {
        Self::Other(message)
    }

    /// Create a new error with a dynamic message
    pub fn message<S: Into<String>>(message: S) -> Self {
        Self::Message(message.into())
    }
}

/// Extension trait for Result with context addition
pub trait ResultExt<T> {
    /// Add context to an error
    fn context<S: Into<String>>(self, context: S) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context<S: Into<String>>(self, context: S) -> Self {
        self.map_err(|e| e.with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_status_display() {
        let err = Error::card_status(0x90, 0xF5, StatusWord::new(0x91, 0x9D));
        let text = err.to_string();
        assert!(text.contains("90"), "{text}");
        assert!(text.contains("Permission denied"), "{text}");
    }

    #[test]
    fn test_context_chain() {
        let err: Result<()> = Err(Error::NotAuthenticated);
        let err = err.context("reading NDEF file").unwrap_err();
        assert_eq!(err.to_string(), "reading NDEF file: not authenticated");
    }
}
