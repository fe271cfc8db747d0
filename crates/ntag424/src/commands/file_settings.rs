//! GetFileSettings and ChangeFileSettings commands

use bytes::Bytes;

use crate::constants::{cla, ins};

/// GetFileSettings: read the settings block of a data file
#[derive(Debug, Clone, Copy)]
pub struct GetFileSettingsCommand {
    file_no: u8,
}

impl GetFileSettingsCommand {
    /// Read the settings of the given file number
    pub const fn new(file_no: u8) -> Self {
        Self { file_no }
    }

    pub(crate) const fn header(&self) -> [u8; 4] {
        [cla::NXP, ins::GET_FILE_SETTINGS, 0x00, 0x00]
    }

    pub(crate) const fn cmd_header(&self) -> [u8; 1] {
        [self.file_no]
    }
}

/// ChangeFileSettings: replace the settings block of a data file
///
/// Always framed in full mode; the settings payload is supplied raw.
#[derive(Debug, Clone)]
pub struct ChangeFileSettingsCommand {
    file_no: u8,
    settings: Bytes,
}

impl ChangeFileSettingsCommand {
    /// Write the given settings to the given file number
    pub fn new(file_no: u8, settings: impl Into<Bytes>) -> Self {
        Self {
            file_no,
            settings: settings.into(),
        }
    }

    pub(crate) const fn header(&self) -> [u8; 4] {
        [cla::NXP, ins::CHANGE_FILE_SETTINGS, 0x00, 0x00]
    }

    pub(crate) const fn cmd_header(&self) -> [u8; 1] {
        [self.file_no]
    }

    pub(crate) fn data(&self) -> &[u8] {
        &self.settings
    }
}
