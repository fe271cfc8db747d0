//! Parsed GetFileSettings payload

use bytes::Bytes;

use crate::error::Error;
use crate::types::CommMode;

/// The settings block returned by GetFileSettings
///
/// Layout: file type (1) || file option (1) || access rights (2) ||
/// file size (3, little-endian) || optional SDM configuration.
#[derive(Debug, Clone)]
pub struct FileSettings {
    raw: Bytes,
}

impl FileSettings {
    /// Wrap a raw settings payload, validating the fixed prefix is present
    pub fn from_payload(raw: Bytes) -> Result<Self, Error> {
        if raw.len() < 7 {
            return Err(Error::ProtocolDesync("file settings payload truncated"));
        }
        Ok(Self { raw })
    }

    /// The file type byte
    pub fn file_type(&self) -> u8 {
        self.raw[0]
    }

    /// The file option byte
    pub fn file_option(&self) -> u8 {
        self.raw[1]
    }

    /// The communication mode required for reads and writes of this file
    pub fn comm_mode(&self) -> CommMode {
        CommMode::from_file_option(self.file_option())
    }

    /// The two access-rights bytes
    pub fn access_rights(&self) -> [u8; 2] {
        [self.raw[2], self.raw[3]]
    }

    /// The file size as reported by the card
    pub fn file_size(&self) -> u32 {
        u32::from_le_bytes([self.raw[4], self.raw[5], self.raw[6], 0])
    }

    /// The raw settings payload
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_parse_settings() {
        let settings =
            FileSettings::from_payload(Bytes::from_static(&hex!("0003E0EE000100"))).unwrap();
        assert_eq!(settings.file_type(), 0x00);
        assert_eq!(settings.file_option(), 0x03);
        assert_eq!(settings.comm_mode(), CommMode::Full);
        assert_eq!(settings.access_rights(), hex!("E0EE"));
        assert_eq!(settings.file_size(), 256);
    }

    #[test]
    fn test_truncated_settings_rejected() {
        let err = FileSettings::from_payload(Bytes::from_static(&hex!("0000"))).unwrap_err();
        assert!(matches!(err, Error::ProtocolDesync(_)));
    }
}
