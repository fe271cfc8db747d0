//! Constants used by the NTAG 424 DNA command set
//!
//! Instruction codes, selection identifiers and wire-format sizes as fixed
//! by the chip's native (wrapped) command set.

/// Command classes
pub mod cla {
    /// ISO7816 command class
    pub const ISO7816: u8 = 0x00;
    /// Wrapped native command class
    pub const NXP: u8 = 0x90;
}

/// Instruction codes
pub mod ins {
    /// ISO SELECT FILE command
    pub const SELECT_FILE: u8 = 0xA4;
    /// AuthenticateEV2First, part 1
    pub const AUTHENTICATE_EV2_FIRST: u8 = 0x71;
    /// AuthenticateEV2NonFirst, part 1
    pub const AUTHENTICATE_EV2_NON_FIRST: u8 = 0x77;
    /// Part 2 of either authentication exchange
    pub const ADDITIONAL_FRAME: u8 = 0xAF;
    /// GetCardUID command
    pub const GET_CARD_UID: u8 = 0x51;
    /// GetFileSettings command
    pub const GET_FILE_SETTINGS: u8 = 0xF5;
    /// ChangeFileSettings command
    pub const CHANGE_FILE_SETTINGS: u8 = 0x5F;
    /// ReadData command
    pub const READ_DATA: u8 = 0xAD;
    /// WriteData command
    pub const WRITE_DATA: u8 = 0x8D;
    /// ChangeKey command
    pub const CHANGE_KEY: u8 = 0xC4;
    /// GetKeyVersion command
    pub const GET_KEY_VERSION: u8 = 0x64;
}

/// Parameter values for SELECT FILE (P1)
pub mod select_p1 {
    /// Select by file identifier
    pub const BY_FILE_ID: u8 = 0x00;
}

/// Parameter values for SELECT FILE (P2)
pub mod select_p2 {
    /// No FCI in the response
    pub const NO_FCI: u8 = 0x0C;
}

/// Number of AES key slots on the chip
pub const KEY_SLOT_COUNT: u8 = 5;

/// Slot of the application master key
pub const MASTER_KEY_SLOT: u8 = 0;

/// PCD capability vector trailing the key number in the first
/// authentication frame
pub const CAPABILITY_VECTOR: [u8; 4] = [0x03, 0x00, 0x00, 0x00];

/// Length of the truncated CMAC carried on the wire
pub const WIRE_MAC_LENGTH: usize = 8;

/// Length of the card UID returned by GetCardUID
pub const UID_LENGTH: usize = 7;

/// Length of the transaction identifier delivered during EV2First
pub const TI_LENGTH: usize = 4;

/// Commonly referenced status words
pub mod status {
    pub use ntag424_apdu_core::response::status::common::*;
}
