//! GetKeyVersion command

use crate::constants::{cla, ins};

/// GetKeyVersion: read the one-byte version of a key slot
#[derive(Debug, Clone, Copy)]
pub struct GetKeyVersionCommand {
    slot: u8,
}

impl GetKeyVersionCommand {
    /// Query the given key slot
    pub const fn new(slot: u8) -> Self {
        Self { slot }
    }

    pub(crate) const fn header(&self) -> [u8; 4] {
        [cla::NXP, ins::GET_KEY_VERSION, 0x00, 0x00]
    }

    pub(crate) const fn cmd_header(&self) -> [u8; 1] {
        [self.slot]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parts() {
        let cmd = GetKeyVersionCommand::new(4);
        assert_eq!(cmd.header(), [0x90, 0x64, 0x00, 0x00]);
        assert_eq!(cmd.cmd_header(), [0x04]);
    }
}
