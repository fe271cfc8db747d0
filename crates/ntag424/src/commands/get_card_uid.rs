//! GetCardUID command
//!
//! Sent MAC-protected, but the card answers with an encrypted payload:
//! the wrapper verifies the response MAC and the caller decrypts the
//! 16-byte ciphertext, of which the first 7 bytes are the UID.

use crate::constants::{cla, ins};

/// GetCardUID: read the 7-byte UID under the session keys
#[derive(Debug, Clone, Copy, Default)]
pub struct GetCardUidCommand;

impl GetCardUidCommand {
    /// Create the command
    pub const fn new() -> Self {
        Self
    }

    pub(crate) const fn header(&self) -> [u8; 4] {
        [cla::NXP, ins::GET_CARD_UID, 0x00, 0x00]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header() {
        assert_eq!(GetCardUidCommand::new().header(), [0x90, 0x51, 0x00, 0x00]);
    }
}
