//! Host-side driver for the NXP NTAG 424 DNA
//!
//! The chip speaks ISO-7816-4 APDUs over ISO-DEP and protects its native
//! command set with EV2 secure messaging: a challenge-response mutual
//! authentication derives per-session AES keys, and every subsequent
//! command is framed plain, MAC-protected or encrypted depending on the
//! target file's policy.
//!
//! [`Ntag424`] is the entry point; it is generic over any
//! [`CardTransport`](ntag424_apdu_core::CardTransport) implementation.
#![forbid(unsafe_code)]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]

mod application;
mod commands;
mod constants;
mod crypto;
mod error;
mod secure_channel;
mod session;
mod types;

pub use application::Ntag424;
pub use commands::*;
pub use error::{Error, Result, ResultExt};
pub use secure_channel::{Ev2Channel, SecuredResponse};
pub use session::Session;
pub use types::{CommMode, File, FileSettings};

pub use constants::*;

// Re-export the APDU layer for transport implementors
pub use ntag424_apdu_core as apdu_core;
