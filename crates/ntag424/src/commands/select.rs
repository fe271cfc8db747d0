//! ISO SELECT FILE command

use crate::constants::{cla, ins, select_p1, select_p2};
use crate::types::File;

/// SELECT FILE by ISO file identifier, no FCI requested
#[derive(Debug, Clone, Copy)]
pub struct SelectFileCommand {
    file: File,
}

impl SelectFileCommand {
    /// Select the given file or DF
    pub const fn new(file: File) -> Self {
        Self { file }
    }

    pub(crate) const fn header(&self) -> [u8; 4] {
        [
            cla::ISO7816,
            ins::SELECT_FILE,
            select_p1::BY_FILE_ID,
            select_p2::NO_FCI,
        ]
    }

    pub(crate) const fn data(&self) -> [u8; 2] {
        self.file.selection_id()
    }
}
