//! ChangeKey command
//!
//! Two data layouts, depending on which slot changes:
//!
//! - slot 0 (the key the session was opened with): `newKey || newVersion`
//! - slots 1..4: `(oldKey xor newKey) || currentVersion || JAMCRC(newKey)`,
//!   which lets the card recover the new key without it ever travelling
//!   in the clear even inside the encrypted frame.

use bytes::{BufMut, Bytes, BytesMut};

use crate::constants::{cla, ins};
use crate::crypto;

/// ChangeKey: replace one of the five AES key slots
#[derive(Debug, Clone)]
pub struct ChangeKeyCommand {
    slot: u8,
    data: Bytes,
}

impl ChangeKeyCommand {
    /// Change the application master key (slot 0)
    pub fn master(new_key: &[u8; 16], new_version: u8) -> Self {
        let mut data = BytesMut::with_capacity(17);
        data.put_slice(new_key);
        data.put_u8(new_version);
        Self {
            slot: 0,
            data: data.freeze(),
        }
    }

    /// Change one of the application keys (slots 1..4)
    pub fn application(
        slot: u8,
        old_key: &[u8; 16],
        new_key: &[u8; 16],
        current_version: u8,
    ) -> Self {
        let mut data = BytesMut::with_capacity(21);
        for (old, new) in old_key.iter().zip(new_key) {
            data.put_u8(old ^ new);
        }
        data.put_u8(current_version);
        data.put_slice(&crypto::jamcrc(new_key));
        Self {
            slot,
            data: data.freeze(),
        }
    }

    pub(crate) const fn header(&self) -> [u8; 4] {
        [cla::NXP, ins::CHANGE_KEY, 0x00, 0x00]
    }

    pub(crate) const fn cmd_header(&self) -> [u8; 1] {
        [self.slot]
    }

    pub(crate) fn data(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_master_key_layout() {
        let cmd = ChangeKeyCommand::master(&[0x42; 16], 0x01);
        assert_eq!(cmd.header(), [0x90, 0xC4, 0x00, 0x00]);
        assert_eq!(cmd.cmd_header(), [0x00]);
        assert_eq!(cmd.data().len(), 17);
        assert_eq!(&cmd.data()[..16], &[0x42; 16]);
        assert_eq!(cmd.data()[16], 0x01);
    }

    #[test]
    fn test_application_key_layout() {
        // old = 00*16, new = 01*16: the xor buffer is the new key itself
        let cmd = ChangeKeyCommand::application(3, &[0x00; 16], &[0x01; 16], 0x00);
        assert_eq!(cmd.cmd_header(), [0x03]);
        assert_eq!(cmd.data().len(), 21);
        assert_eq!(&cmd.data()[..16], &[0x01; 16]);
        assert_eq!(cmd.data()[16], 0x00);
        assert_eq!(&cmd.data()[17..], &hex!("48D75FAD"));
    }

    #[test]
    fn test_xor_buffer() {
        let old = hex!("000102030405060708090A0B0C0D0E0F");
        let new = hex!("0F0E0D0C0B0A09080706050403020100");
        let cmd = ChangeKeyCommand::application(1, &old, &new, 0x07);
        for (i, b) in cmd.data()[..16].iter().enumerate() {
            assert_eq!(*b, old[i] ^ new[i]);
        }
        assert_eq!(cmd.data()[16], 0x07);
    }
}
