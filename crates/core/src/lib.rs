//! Core types for APDU (Application Protocol Data Unit) exchanges
//!
//! This crate provides the foundational pieces for talking to an
//! ISO/IEC 7816-4 card over an ISO-DEP style transport:
//!
//! - Building and parsing short-form APDU commands and responses
//! - Status word interpretation for the NXP `91xx` family alongside the
//!   common ISO codes
//! - The [`CardTransport`] trait that concrete NFC/PC-SC bindings implement
//!
//! Secure messaging lives in the driver crates built on top of this one;
//! nothing here holds key material.
#![forbid(unsafe_code)]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]

// Re-export bytes for convenience
pub use bytes::{Bytes, BytesMut};

pub mod command;
pub mod error;
pub mod response;
pub mod transport;

pub use command::Command;
pub use error::{Error, Result, TransportError};
pub use response::status::StatusWord;
pub use response::Response;
pub use transport::CardTransport;

/// Prelude module containing commonly used traits and types
pub mod prelude {
    pub use crate::{Bytes, BytesMut, CardTransport, Command, Error, Response, Result, StatusWord};
}
