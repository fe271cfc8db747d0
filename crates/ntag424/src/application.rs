//! High-level NTAG 424 DNA application interface
//!
//! [`Ntag424`] wraps an [`Ev2Channel`] and exposes the chip's command set
//! as typed operations. Argument validation happens here, before any APDU
//! is issued; everything that touches the wire goes through the channel.

use bytes::{Bytes, BytesMut};
use tracing::debug;

use ntag424_apdu_core::CardTransport;

use crate::commands::{
    ChangeFileSettingsCommand, ChangeKeyCommand, GetCardUidCommand, GetFileSettingsCommand,
    GetKeyVersionCommand, ReadDataCommand, SelectFileCommand, WriteDataCommand,
};
use crate::constants::{KEY_SLOT_COUNT, MASTER_KEY_SLOT, UID_LENGTH};
use crate::error::{Error, Result};
use crate::secure_channel::Ev2Channel;
use crate::session::Session;
use crate::types::{CommMode, File, FileSettings};

/// NTAG 424 DNA driver over a card transport
pub struct Ntag424<T: CardTransport> {
    channel: Ev2Channel<T>,
}

impl<T: CardTransport> Ntag424<T> {
    /// Create a new driver over the given transport
    pub const fn new(transport: T) -> Self {
        Self {
            channel: Ev2Channel::new(transport),
        }
    }

    /// Bind the transport
    pub fn initiate(&mut self) -> Result<()> {
        self.channel.transport_mut().reset().map_err(Error::Transport)
    }

    /// Release the transport, clearing any session first
    pub fn terminate(&mut self) -> Result<()> {
        self.channel.close();
        self.channel.transport_mut().reset().map_err(Error::Transport)
    }

    /// Get a reference to the underlying transport
    pub const fn transport(&self) -> &T {
        self.channel.transport()
    }

    /// Get a mutable reference to the underlying transport
    pub fn transport_mut(&mut self) -> &mut T {
        self.channel.transport_mut()
    }

    /// The current session, if one is established
    pub const fn session(&self) -> Option<&Session> {
        self.channel.session()
    }

    /// Whether an authenticated session is live
    pub const fn is_authenticated(&self) -> bool {
        self.channel.is_authenticated()
    }

    /// Select a file or DF by its ISO identifier
    ///
    /// Selecting one of the data files implicitly selects the application
    /// DF first, so two plain exchanges go over the wire in that case.
    pub fn select_file(&mut self, file: File) -> Result<()> {
        if file.is_data_file() {
            self.select(SelectFileCommand::new(File::Application))?;
        }
        self.select(SelectFileCommand::new(file))
    }

    fn select(&mut self, command: SelectFileCommand) -> Result<()> {
        self.channel
            .transceive(command.header(), &[], &command.data(), CommMode::Plain, true)?;
        Ok(())
    }

    /// Open a fresh session with `AuthenticateEV2First`
    pub fn authenticate_ev2_first(&mut self, slot: u8, key: &[u8; 16]) -> Result<()> {
        self.channel.authenticate_ev2_first(slot, key)
    }

    /// Rotate the session keys with `AuthenticateEV2NonFirst`
    pub fn authenticate_ev2_non_first(&mut self, slot: u8, key: &[u8; 16]) -> Result<()> {
        self.channel.authenticate_ev2_non_first(slot, key)
    }

    /// Read the 7-byte card UID
    ///
    /// The request is MAC-protected but the card encrypts its answer; the
    /// ciphertext decrypts under the response-phase IV.
    pub fn get_card_uid(&mut self) -> Result<[u8; 7]> {
        let command = GetCardUidCommand::new();
        let response =
            self.channel
                .transceive(command.header(), &[], &[], CommMode::Mac, true)?;

        let plaintext = self.channel.decrypt_response_payload(response.data())?;
        if plaintext.len() < UID_LENGTH {
            self.channel.close();
            return Err(Error::ProtocolDesync("card UID response too short"));
        }

        let mut uid = [0u8; UID_LENGTH];
        uid.copy_from_slice(&plaintext[..UID_LENGTH]);
        debug!(uid = %hex::encode(uid), "read card UID");
        Ok(uid)
    }

    /// Read the settings block of a data file
    pub fn get_file_settings(&mut self, file: File) -> Result<FileSettings> {
        let file_no = data_file_no(file)?;
        let command = GetFileSettingsCommand::new(file_no);
        let response = self.channel.transceive(
            command.header(),
            &command.cmd_header(),
            &[],
            CommMode::Mac,
            true,
        )?;
        FileSettings::from_payload(response.into_data())
    }

    /// Replace the settings block of a data file
    pub fn change_file_settings(&mut self, file: File, settings: &[u8]) -> Result<()> {
        let file_no = data_file_no(file)?;
        if settings.is_empty() {
            return Err(Error::InvalidArgument("file settings must not be empty"));
        }
        let command = ChangeFileSettingsCommand::new(file_no, settings.to_vec());
        self.channel.transceive(
            command.header(),
            &command.cmd_header(),
            command.data(),
            CommMode::Full,
            true,
        )?;
        Ok(())
    }

    /// Read `length` bytes at `offset` from a data file
    ///
    /// The communication mode is taken from the file's settings, so this
    /// issues a `GetFileSettings` first; that lookup advances the command
    /// counter like any other secured command.
    pub fn read_data(&mut self, file: File, offset: u8, length: u8) -> Result<Bytes> {
        let file_no = data_file_no(file)?;
        let size = file.size().unwrap_or_default();
        if length == 0 {
            return Err(Error::InvalidArgument("read length must be non-zero"));
        }
        if usize::from(offset) + usize::from(length) > size {
            return Err(Error::InvalidArgument("read range exceeds the file"));
        }

        let mode = self.get_file_settings(file)?.comm_mode();
        let command = ReadDataCommand::new(file_no, offset, length);
        let response = self.channel.transceive(
            command.header(),
            &command.cmd_header(),
            &[],
            mode,
            true,
        )?;

        // Full-mode responses keep their protocol padding; slice to the
        // requested length.
        let data = response.into_data();
        if data.len() < usize::from(length) {
            self.channel.close();
            return Err(Error::ProtocolDesync("read returned fewer bytes than requested"));
        }
        Ok(data.slice(..usize::from(length)))
    }

    /// Write a payload at `offset` into a data file
    ///
    /// The payload is zero-padded to the file's write capacity before
    /// wrapping; a write whose padded extent would leave the file is
    /// rejected before any I/O. Like [`read_data`], the communication mode
    /// comes from a leading `GetFileSettings`.
    ///
    /// [`read_data`]: Self::read_data
    pub fn write_data(&mut self, file: File, data: &[u8], offset: u8) -> Result<()> {
        let file_no = data_file_no(file)?;
        let size = file.size().unwrap_or_default();
        let capacity = file.write_capacity().unwrap_or_default();
        if data.len() > capacity {
            return Err(Error::InvalidArgument("payload exceeds the file's write capacity"));
        }
        if usize::from(offset) + capacity > size {
            return Err(Error::InvalidArgument("write range exceeds the file"));
        }

        let mut payload = BytesMut::with_capacity(capacity);
        payload.extend_from_slice(data);
        payload.resize(capacity, 0x00);

        let mode = self.get_file_settings(file)?.comm_mode();
        let command = WriteDataCommand::new(file_no, offset, payload.freeze());
        self.channel.transceive(
            command.header(),
            &command.cmd_header(),
            command.data(),
            mode,
            true,
        )?;
        Ok(())
    }

    /// Replace the application master key (slot 0)
    ///
    /// The new version is the card's current version plus one; fetching it
    /// costs one `GetKeyVersion` exchange.
    pub fn change_master_key(&mut self, new_key: &[u8; 16]) -> Result<()> {
        self.require_master_session()?;
        let current = self.get_key_version(MASTER_KEY_SLOT)?;
        let command = ChangeKeyCommand::master(new_key, current.wrapping_add(1));
        self.change_key(command)
    }

    /// Replace one of the application keys (slots 1..4)
    ///
    /// Only the master session may change other slots; the old key is
    /// folded into the payload so the card can verify it.
    pub fn change_application_key(
        &mut self,
        slot: u8,
        old_key: &[u8; 16],
        new_key: &[u8; 16],
    ) -> Result<()> {
        if slot == MASTER_KEY_SLOT || slot >= KEY_SLOT_COUNT {
            return Err(Error::InvalidArgument("key slot out of range"));
        }
        self.require_master_session()?;
        let current = self.get_key_version(slot)?;
        let command = ChangeKeyCommand::application(slot, old_key, new_key, current);
        self.change_key(command)
    }

    fn change_key(&mut self, command: ChangeKeyCommand) -> Result<()> {
        self.channel.transceive(
            command.header(),
            &command.cmd_header(),
            command.data(),
            CommMode::Full,
            true,
        )?;
        Ok(())
    }

    fn require_master_session(&self) -> Result<()> {
        match self.channel.session() {
            None => Err(Error::NotAuthenticated),
            Some(session) if session.slot() != MASTER_KEY_SLOT => Err(Error::InvalidArgument(
                "key changes require a master-key session",
            )),
            Some(_) => Ok(()),
        }
    }

    /// Read the one-byte version of a key slot
    pub fn get_key_version(&mut self, slot: u8) -> Result<u8> {
        if slot >= KEY_SLOT_COUNT {
            return Err(Error::InvalidArgument("key slot out of range"));
        }
        let command = GetKeyVersionCommand::new(slot);
        let response = self.channel.transceive(
            command.header(),
            &command.cmd_header(),
            &[],
            CommMode::Mac,
            true,
        )?;
        match response.data() {
            [version, ..] => Ok(*version),
            [] => {
                self.channel.close();
                Err(Error::ProtocolDesync("key version response empty"))
            }
        }
    }
}

fn data_file_no(file: File) -> Result<u8> {
    file.file_no()
        .ok_or(Error::InvalidArgument("operation needs a data file"))
}
