//! WriteData command

use bytes::Bytes;

use crate::constants::{cla, ins};

/// WriteData: write a zero-padded payload at `offset` into a data file
///
/// The payload handed in here is already padded to the file's write
/// capacity; the length field mirrors the padded length.
#[derive(Debug, Clone)]
pub struct WriteDataCommand {
    file_no: u8,
    offset: u8,
    payload: Bytes,
}

impl WriteDataCommand {
    /// Write the padded payload to the given file number
    pub fn new(file_no: u8, offset: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            file_no,
            offset,
            payload: payload.into(),
        }
    }

    pub(crate) const fn header(&self) -> [u8; 4] {
        [cla::NXP, ins::WRITE_DATA, 0x00, 0x00]
    }

    // [fileNo, off_lo, 0, 0, len_lo, 0, 0]
    pub(crate) fn cmd_header(&self) -> [u8; 7] {
        [
            self.file_no,
            self.offset,
            0x00,
            0x00,
            self.payload.len() as u8,
            0x00,
            0x00,
        ]
    }

    pub(crate) fn data(&self) -> &[u8] {
        &self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmd_header_tracks_payload_length() {
        let cmd = WriteDataCommand::new(0x02, 0x00, vec![0xAA; 248]);
        assert_eq!(cmd.header(), [0x90, 0x8D, 0x00, 0x00]);
        assert_eq!(cmd.cmd_header(), [0x02, 0x00, 0x00, 0x00, 248, 0x00, 0x00]);
        assert_eq!(cmd.data().len(), 248);
    }
}
