//! File identifiers of the NTAG 424 DNA
//!
//! The chip exposes two selectable structures (the master DF and the
//! application DF) plus three data files. Data files are addressed by
//! their one-byte file number in the native command set and by an ISO
//! file identifier for SELECT FILE.

/// A selectable or addressable file on the chip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum File {
    /// The card-level master DF (`3F 00`)
    Master,
    /// The NTAG 424 DNA application DF (`E1 10`)
    Application,
    /// Capability container file, file number 01, 32 bytes
    CapabilityContainer,
    /// NDEF file, file number 02, 256 bytes
    Ndef,
    /// Proprietary file, file number 03, 128 bytes
    Proprietary,
}

impl File {
    /// The ISO file identifier used by SELECT FILE
    pub(crate) const fn selection_id(self) -> [u8; 2] {
        match self {
            Self::Master => [0x3F, 0x00],
            Self::Application => [0xE1, 0x10],
            Self::CapabilityContainer => [0xE1, 0x03],
            Self::Ndef => [0xE1, 0x04],
            Self::Proprietary => [0xE1, 0x05],
        }
    }

    /// The native file number, for data files only
    pub const fn file_no(self) -> Option<u8> {
        match self {
            Self::CapabilityContainer => Some(0x01),
            Self::Ndef => Some(0x02),
            Self::Proprietary => Some(0x03),
            Self::Master | Self::Application => None,
        }
    }

    /// Total size of a data file in bytes
    pub const fn size(self) -> Option<usize> {
        match self {
            Self::CapabilityContainer => Some(32),
            Self::Ndef => Some(256),
            Self::Proprietary => Some(128),
            Self::Master | Self::Application => None,
        }
    }

    /// Largest payload a single WriteData may carry for this file
    ///
    /// The NDEF file accepts at most 248 bytes per command; the other data
    /// files take their full size in one write.
    pub const fn write_capacity(self) -> Option<usize> {
        match self {
            Self::CapabilityContainer => Some(32),
            Self::Ndef => Some(248),
            Self::Proprietary => Some(128),
            Self::Master | Self::Application => None,
        }
    }

    /// Whether this identifier names one of the three data files
    pub const fn is_data_file(self) -> bool {
        self.file_no().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_numbers() {
        assert_eq!(File::CapabilityContainer.file_no(), Some(0x01));
        assert_eq!(File::Ndef.file_no(), Some(0x02));
        assert_eq!(File::Proprietary.file_no(), Some(0x03));
        assert_eq!(File::Master.file_no(), None);
        assert_eq!(File::Application.file_no(), None);
    }

    #[test]
    fn test_selection_ids() {
        assert_eq!(File::Master.selection_id(), [0x3F, 0x00]);
        assert_eq!(File::Application.selection_id(), [0xE1, 0x10]);
        assert_eq!(File::CapabilityContainer.selection_id(), [0xE1, 0x03]);
        assert_eq!(File::Ndef.selection_id(), [0xE1, 0x04]);
        assert_eq!(File::Proprietary.selection_id(), [0xE1, 0x05]);
    }

    #[test]
    fn test_sizes() {
        assert_eq!(File::Ndef.size(), Some(256));
        assert_eq!(File::Ndef.write_capacity(), Some(248));
        assert_eq!(File::CapabilityContainer.write_capacity(), Some(32));
        assert_eq!(File::Proprietary.write_capacity(), Some(128));
    }
}
