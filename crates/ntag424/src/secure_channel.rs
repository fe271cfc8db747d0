//! EV2 secure messaging over a card transport
//!
//! [`Ev2Channel`] owns the transport and the optional [`Session`], and is
//! the single place where commands are framed, counters advance and
//! responses are verified. Within one `transceive` call the order of
//! observable effects is fixed: build request, transmit, check the status
//! word (failing before the counter moves), bump the counter, decrypt
//! (full mode only), verify the response MAC. A failed secured command
//! therefore never desynchronises the counter, and a successful one
//! consumes exactly one tick.

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};
use cipher::{Iv, Key};
use rand::RngCore;
use subtle::ConstantTimeEq;
use tracing::{debug, trace, warn};
use zeroize::Zeroizing;

use ntag424_apdu_core::prelude::*;

use crate::commands::authenticate;
use crate::constants::{KEY_SLOT_COUNT, TI_LENGTH, WIRE_MAC_LENGTH};
use crate::crypto::{self, Ev2};
use crate::error::{Error, Result};
use crate::session::Session;
use crate::types::CommMode;

/// A verified response returned by [`Ev2Channel::transceive`]
#[derive(Debug, Clone)]
pub struct SecuredResponse {
    data: Bytes,
    mac: Option<[u8; 8]>,
    status: StatusWord,
}

impl SecuredResponse {
    /// The response data with any wire MAC stripped
    ///
    /// In full mode this is the decrypted plaintext, still carrying its
    /// protocol padding; callers slice to the documented length.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Take the response data out of the response
    pub fn into_data(self) -> Bytes {
        self.data
    }

    /// The verified response MAC, absent in plain mode
    pub const fn mac(&self) -> Option<[u8; 8]> {
        self.mac
    }

    /// The status word the card answered with
    pub const fn status(&self) -> StatusWord {
        self.status
    }
}

/// EV2 secure channel over a card transport
pub struct Ev2Channel<T: CardTransport> {
    /// The underlying transport
    transport: T,
    /// Session state (None if not authenticated)
    session: Option<Session>,
}

impl<T: CardTransport> fmt::Debug for Ev2Channel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ev2Channel")
            .field("authenticated", &self.session.is_some())
            .finish()
    }
}

impl<T: CardTransport> Ev2Channel<T> {
    /// Create a new channel over the given transport
    ///
    /// No session exists until [`authenticate_ev2_first`] succeeds.
    ///
    /// [`authenticate_ev2_first`]: Self::authenticate_ev2_first
    pub const fn new(transport: T) -> Self {
        Self {
            transport,
            session: None,
        }
    }

    /// Get a reference to the underlying transport
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Get a mutable reference to the underlying transport
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// The current session, if one is established
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Whether an authenticated session is live
    pub const fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Drop the session, zeroising its keys
    pub fn close(&mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if self.session.take().is_some() {
            debug!("secure session torn down");
        }
    }

    /// Run `AuthenticateEV2First` against the given key slot
    ///
    /// On success a fresh session is installed: new TI, counter reset to
    /// zero, keys derived from the exchanged nonces. Any failure leaves the
    /// channel unauthenticated.
    pub fn authenticate_ev2_first(&mut self, slot: u8, key: &[u8; 16]) -> Result<()> {
        if slot >= KEY_SLOT_COUNT {
            return Err(Error::InvalidArgument("key slot out of range"));
        }

        // Whatever session existed dies the moment a new handshake starts.
        self.teardown();

        let key = Key::<Ev2>::from(*key);
        let (payload, rand_a, rand_b) = self.run_handshake(authenticate::first_frame(slot), &key)?;

        if payload.len() != 32 {
            return Err(Error::ProtocolDesync("unexpected session payload length"));
        }
        let plaintext = crypto::cbc_decrypt(&key, &Iv::<Ev2>::default(), &payload)?;

        // Plaintext layout: TI (4) || RandA' (16) || PDCap (6) || PCDCap (6)
        if plaintext[TI_LENGTH..TI_LENGTH + 16] != crypto::rotate_left_one(&rand_a) {
            return Err(Error::ProtocolDesync("card challenge mismatch"));
        }
        let mut ti = [0u8; TI_LENGTH];
        ti.copy_from_slice(&plaintext[..TI_LENGTH]);

        let (k_enc, k_mac) = crypto::derive_session_keys(&key, &rand_a, &rand_b);
        self.session = Some(Session::new(k_enc, k_mac, ti, slot));
        debug!(slot, "EV2First authentication established a new session");
        Ok(())
    }

    /// Run `AuthenticateEV2NonFirst` against the given key slot
    ///
    /// Requires a live session. Only the session keys rotate; TI and the
    /// command counter persist. Any failure tears the session down.
    pub fn authenticate_ev2_non_first(&mut self, slot: u8, key: &[u8; 16]) -> Result<()> {
        if slot >= KEY_SLOT_COUNT {
            return Err(Error::InvalidArgument("key slot out of range"));
        }
        if self.session.is_none() {
            return Err(Error::NotAuthenticated);
        }

        let key = Key::<Ev2>::from(*key);
        let outcome = self.run_non_first(slot, &key);
        if outcome.is_err() {
            self.teardown();
        }
        outcome
    }

    fn run_non_first(&mut self, slot: u8, key: &Key<Ev2>) -> Result<()> {
        let (payload, rand_a, rand_b) =
            self.run_handshake(authenticate::non_first_frame(slot), key)?;

        if payload.len() != 16 {
            return Err(Error::ProtocolDesync("unexpected session payload length"));
        }
        let plaintext = crypto::cbc_decrypt(key, &Iv::<Ev2>::default(), &payload)?;
        if plaintext[..] != crypto::rotate_left_one(&rand_a) {
            return Err(Error::ProtocolDesync("card challenge mismatch"));
        }

        let (k_enc, k_mac) = crypto::derive_session_keys(key, &rand_a, &rand_b);
        if let Some(session) = self.session.as_mut() {
            session.rotate_keys(k_enc, k_mac, slot);
        }
        debug!(slot, "EV2NonFirst rotated the session keys");
        Ok(())
    }

    /// The challenge/response part shared by both authentication flavours.
    /// Returns the final-frame payload plus the two nonces.
    fn run_handshake(
        &mut self,
        opening: Command,
        key: &Key<Ev2>,
    ) -> Result<(Bytes, Zeroizing<[u8; 16]>, Zeroizing<[u8; 16]>)> {
        let command = opening.header();
        let response = self.transmit(opening)?;
        let status = response.status();
        if !status.is_additional_frame() {
            return Err(Error::card_status(command[0], command[1], status));
        }
        let payload = response.into_payload();
        if payload.len() != 16 {
            return Err(Error::ProtocolDesync("unexpected challenge length"));
        }

        let mut encrypted_challenge = [0u8; 16];
        encrypted_challenge.copy_from_slice(&payload);
        let mut rand_b = Zeroizing::new([0u8; 16]);
        rand_b.copy_from_slice(&crypto::cbc_decrypt(
            key,
            &Iv::<Ev2>::default(),
            &encrypted_challenge,
        )?);

        let mut rand_a = Zeroizing::new([0u8; 16]);
        rand::rng().fill_bytes(rand_a.as_mut_slice());

        // Host cryptogram: E(RandA || rotl1(RandB)), zero IV
        let mut challenge = Zeroizing::new([0u8; 32]);
        challenge[..16].copy_from_slice(&rand_a[..]);
        challenge[16..].copy_from_slice(&crypto::rotate_left_one(&rand_b));
        let cryptogram = crypto::cbc_encrypt(key, &Iv::<Ev2>::default(), &challenge[..])?;

        let response = self.transmit(authenticate::continue_frame(cryptogram))?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::card_status(command[0], 0xAF, status));
        }
        Ok((response.into_payload(), rand_a, rand_b))
    }

    /// Send one command under the given mode and verify the answer
    ///
    /// `header` is the four-byte APDU header; `cmd_header` rides
    /// unencrypted in every mode (it is still MACed), while `cmd_data` is
    /// encrypted in full mode.
    pub fn transceive(
        &mut self,
        header: [u8; 4],
        cmd_header: &[u8],
        cmd_data: &[u8],
        mode: CommMode,
        expect_le: bool,
    ) -> Result<SecuredResponse> {
        match mode {
            CommMode::Plain => self.transceive_plain(header, cmd_header, cmd_data, expect_le),
            CommMode::Mac => self.transceive_mac(header, cmd_header, cmd_data, expect_le),
            CommMode::Full => self.transceive_full(header, cmd_header, cmd_data, expect_le),
        }
    }

    fn transceive_plain(
        &mut self,
        header: [u8; 4],
        cmd_header: &[u8],
        cmd_data: &[u8],
        expect_le: bool,
    ) -> Result<SecuredResponse> {
        let mut body = BytesMut::with_capacity(cmd_header.len() + cmd_data.len());
        body.put_slice(cmd_header);
        body.put_slice(cmd_data);

        let response = self.exchange(header, body.freeze(), expect_le)?;
        let status = response.status();
        if !status.is_success() && !status.is_additional_frame() {
            return Err(Error::card_status(header[0], header[1], status));
        }
        self.tick_counter()?;
        Ok(SecuredResponse {
            data: response.into_payload(),
            mac: None,
            status,
        })
    }

    fn transceive_mac(
        &mut self,
        header: [u8; 4],
        cmd_header: &[u8],
        cmd_data: &[u8],
        expect_le: bool,
    ) -> Result<SecuredResponse> {
        let mac = {
            let session = self.session.as_ref().ok_or(Error::NotAuthenticated)?;
            // MAC input: INS || CC_le || TI || cmd_header || cmd_data
            let mut mac_input =
                BytesMut::with_capacity(7 + cmd_header.len() + cmd_data.len());
            mac_input.put_u8(header[1]);
            mac_input.put_slice(&session.counter_le());
            mac_input.put_slice(session.ti());
            mac_input.put_slice(cmd_header);
            mac_input.put_slice(cmd_data);
            crypto::truncate_mac(&crypto::aes_cmac(session.keys().mac(), &mac_input))
        };

        let mut body =
            BytesMut::with_capacity(cmd_header.len() + cmd_data.len() + WIRE_MAC_LENGTH);
        body.put_slice(cmd_header);
        body.put_slice(cmd_data);
        body.put_slice(&mac);

        let response = self.exchange(header, body.freeze(), expect_le)?;
        let status = response.status();
        if !status.is_success() {
            self.teardown();
            return Err(Error::card_status(header[0], header[1], status));
        }
        self.tick_counter()?;

        let (data, rmac) = self.verify_response_mac(response.into_payload(), status)?;
        Ok(SecuredResponse {
            data,
            mac: Some(rmac),
            status,
        })
    }

    fn transceive_full(
        &mut self,
        header: [u8; 4],
        cmd_header: &[u8],
        cmd_data: &[u8],
        expect_le: bool,
    ) -> Result<SecuredResponse> {
        let (enc_data, mac) = {
            let session = self.session.as_ref().ok_or(Error::NotAuthenticated)?;

            let mut plaintext = BytesMut::with_capacity(cmd_data.len() + 16);
            plaintext.extend_from_slice(cmd_data);
            crypto::pad_iso7816(&mut plaintext);

            let iv = crypto::data_phase_iv(
                session.keys().enc(),
                crypto::IV_LABEL_COMMAND,
                session.ti(),
                session.counter_le(),
            );
            let enc_data = crypto::cbc_encrypt(session.keys().enc(), &iv, &plaintext)?;

            // MAC input: INS || CC_le || TI || cmd_header || enc_data
            let mut mac_input = BytesMut::with_capacity(7 + cmd_header.len() + enc_data.len());
            mac_input.put_u8(header[1]);
            mac_input.put_slice(&session.counter_le());
            mac_input.put_slice(session.ti());
            mac_input.put_slice(cmd_header);
            mac_input.put_slice(&enc_data);
            let mac = crypto::truncate_mac(&crypto::aes_cmac(session.keys().mac(), &mac_input));
            (enc_data, mac)
        };

        let mut body =
            BytesMut::with_capacity(cmd_header.len() + enc_data.len() + WIRE_MAC_LENGTH);
        body.put_slice(cmd_header);
        body.put_slice(&enc_data);
        body.put_slice(&mac);

        let response = self.exchange(header, body.freeze(), expect_le)?;
        let status = response.status();
        if !status.is_success() {
            self.teardown();
            return Err(Error::card_status(header[0], header[1], status));
        }
        self.tick_counter()?;

        let payload = response.into_payload();
        if payload.len() < WIRE_MAC_LENGTH {
            self.teardown();
            return Err(Error::ProtocolDesync("secured response shorter than its MAC"));
        }
        let ciphertext = payload.slice(..payload.len() - WIRE_MAC_LENGTH);

        // Decrypt before MAC verification; both use the post-increment counter.
        let plaintext = self.decrypt_response_payload(&ciphertext)?;
        let (_, rmac) = self.verify_response_mac(payload, status)?;

        Ok(SecuredResponse {
            data: plaintext,
            mac: Some(rmac),
            status,
        })
    }

    /// Decrypt an encrypted response payload under the response-phase IV
    ///
    /// Exposed for GetCardUID, whose request travels MAC-only while its
    /// response body is encrypted. Protocol padding is not stripped.
    pub fn decrypt_response_payload(&mut self, data: &[u8]) -> Result<Bytes> {
        if data.is_empty() {
            return Ok(Bytes::new());
        }
        if data.len() % 16 != 0 {
            self.teardown();
            return Err(Error::ProtocolDesync("encrypted response is not block aligned"));
        }
        let session = self.session.as_ref().ok_or(Error::NotAuthenticated)?;
        let iv = crypto::data_phase_iv(
            session.keys().enc(),
            crypto::IV_LABEL_RESPONSE,
            session.ti(),
            session.counter_le(),
        );
        crypto::cbc_decrypt(session.keys().enc(), &iv, data)
    }

    /// Split off and check the 8-byte response MAC
    ///
    /// The expected MAC is CMAC over `SW2 || CC_le || TI || data`, using
    /// the already-incremented counter; only the second status byte
    /// participates.
    fn verify_response_mac(
        &mut self,
        payload: Bytes,
        status: StatusWord,
    ) -> Result<(Bytes, [u8; 8])> {
        if payload.len() < WIRE_MAC_LENGTH {
            self.teardown();
            return Err(Error::ProtocolDesync("secured response shorter than its MAC"));
        }
        let split = payload.len() - WIRE_MAC_LENGTH;
        let data = payload.slice(..split);
        let mut rmac = [0u8; WIRE_MAC_LENGTH];
        rmac.copy_from_slice(&payload[split..]);

        let expected = {
            let session = self.session.as_ref().ok_or(Error::NotAuthenticated)?;
            let mut mac_input = BytesMut::with_capacity(7 + data.len());
            mac_input.put_u8(status.sw2);
            mac_input.put_slice(&session.counter_le());
            mac_input.put_slice(session.ti());
            mac_input.put_slice(&data);
            crypto::truncate_mac(&crypto::aes_cmac(session.keys().mac(), &mac_input))
        };

        if !bool::from(expected.as_slice().ct_eq(&rmac)) {
            warn!("response MAC verification failed");
            self.teardown();
            return Err(Error::MacMismatch);
        }
        Ok((data, rmac))
    }

    fn tick_counter(&mut self) -> Result<()> {
        let result = match self.session.as_mut() {
            Some(session) => session.bump_counter(),
            None => Ok(()),
        };
        if result.is_err() {
            self.teardown();
        }
        result
    }

    fn exchange(&mut self, header: [u8; 4], body: Bytes, expect_le: bool) -> Result<Response> {
        let mut command = Command::new(header[0], header[1], header[2], header[3]);
        if !body.is_empty() {
            command = command.with_data(body);
        }
        if expect_le {
            command = command.with_le(0x00);
        }
        self.transmit(command)
    }

    fn transmit(&mut self, command: Command) -> Result<Response> {
        let raw = command.to_bytes();
        trace!(command = %hex::encode(&raw), "transmitting APDU");

        let response = match self.transport.transmit_raw(&raw) {
            Ok(bytes) => bytes,
            Err(err) => {
                // The card may have processed the command and advanced its
                // counter while we did not; the session is indeterminate.
                self.teardown();
                return Err(Error::Transport(err));
            }
        };
        trace!(response = %hex::encode(&response), "received response");

        match Response::from_bytes(&response) {
            Ok(response) => Ok(response),
            Err(_) => {
                self.teardown();
                Err(Error::ProtocolDesync("malformed response frame"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    // Session keys derived from K = 00*16 and the S1 nonces
    const K_ENC: [u8; 16] = hex!("CF830B4583E37CA6BAACD4B95C9AB7DC");
    const K_MAC: [u8; 16] = hex!("537BF744FF66A4CAB977347F5497B6BF");
    const TI: [u8; 4] = hex!("11223344");

    // Test transport that records commands and replays queued responses
    #[derive(Debug)]
    struct TestMockTransport {
        commands: Vec<Vec<u8>>,
        responses: Vec<Vec<u8>>,
    }

    impl TestMockTransport {
        fn new() -> Self {
            Self {
                commands: Vec::new(),
                responses: Vec::new(),
            }
        }

        fn with_response(mut self, response: Vec<u8>) -> Self {
            self.responses.push(response);
            self
        }
    }

    impl CardTransport for TestMockTransport {
        fn transmit_raw(&mut self, command: &[u8]) -> std::result::Result<Bytes, ntag424_apdu_core::Error> {
            self.commands.push(command.to_vec());
            if self.responses.is_empty() {
                return Err(ntag424_apdu_core::Error::Transport(
                    ntag424_apdu_core::TransportError::Transmission,
                ));
            }
            Ok(Bytes::from(self.responses.remove(0)))
        }

        fn reset(&mut self) -> std::result::Result<(), ntag424_apdu_core::Error> {
            Ok(())
        }
    }

    fn channel_with_session(transport: TestMockTransport) -> Ev2Channel<TestMockTransport> {
        Ev2Channel {
            transport,
            session: Some(Session::from_raw(&K_ENC, &K_MAC, TI, 0, 0)),
        }
    }

    #[test]
    fn test_mac_mode_wire_format() {
        // GetFileSettings(ndef) with TI = 11223344, CC = 0000
        let response = hex!("0000E0EE000100 1E743C88D575E1A7 9100").to_vec();
        let transport = TestMockTransport::new().with_response(response);
        let mut channel = channel_with_session(transport);

        let response = channel
            .transceive([0x90, 0xF5, 0x00, 0x00], &[0x02], &[], CommMode::Mac, true)
            .unwrap();

        // Lc = 1 (header) + 0 (data) + 8 (mac) = 9
        assert_eq!(
            channel.transport().commands[0],
            hex!("90F5000009 02 AE4A06D480A6A519 00")
        );
        assert_eq!(response.data(), hex!("0000E0EE000100"));
        assert_eq!(response.mac(), Some(hex!("1E743C88D575E1A7")));
        assert_eq!(channel.session().unwrap().counter(), 1);
    }

    #[test]
    fn test_full_mode_wire_format() {
        // ChangeFileSettings(ndef) with a 4-byte settings payload
        let response = hex!("4C45A2BA5777EB94 9100").to_vec();
        let transport = TestMockTransport::new().with_response(response);
        let mut channel = channel_with_session(transport);

        let response = channel
            .transceive(
                [0x90, 0x5F, 0x00, 0x00],
                &[0x02],
                &hex!("4000E000"),
                CommMode::Full,
                true,
            )
            .unwrap();

        assert_eq!(
            channel.transport().commands[0],
            hex!("905F000019 02 22C2B2344971472FED60A8E3A03279D3 22A49D595E99E416 00")
        );
        assert!(response.data().is_empty());
        assert_eq!(channel.session().unwrap().counter(), 1);
    }

    #[test]
    fn test_full_mode_decrypts_response() {
        // GetCardUID-shaped exchange done fully in full mode: the response
        // body decrypts under the response-phase IV at CC = 0100.
        let response = hex!("693CB917002A13752B623344D85E3E5B 05B341B51821F85C 9100").to_vec();
        let transport = TestMockTransport::new().with_response(response);
        let mut channel = channel_with_session(transport);

        let response = channel
            .transceive([0x90, 0x51, 0x00, 0x00], &[], &[], CommMode::Full, true)
            .unwrap();

        // Padded plaintext: UID || 80 || zeros
        assert_eq!(response.data(), hex!("04112233445566 80 0000000000000000"));
    }

    #[test]
    fn test_mac_mismatch_tears_down_session() {
        let mut response = hex!("0000E0EE000100 1E743C88D575E1A7 9100").to_vec();
        response[7] ^= 0x01; // flip one MAC byte
        let transport = TestMockTransport::new().with_response(response);
        let mut channel = channel_with_session(transport);

        let err = channel
            .transceive([0x90, 0xF5, 0x00, 0x00], &[0x02], &[], CommMode::Mac, true)
            .unwrap_err();
        assert!(matches!(err, Error::MacMismatch));
        assert!(!channel.is_authenticated());

        // Subsequent secured commands fail before any I/O happens
        let err = channel
            .transceive([0x90, 0x51, 0x00, 0x00], &[], &[], CommMode::Mac, true)
            .unwrap_err();
        assert!(matches!(err, Error::NotAuthenticated));
        assert_eq!(channel.transport().commands.len(), 1);
    }

    #[test]
    fn test_error_status_tears_down_before_counter_moves() {
        let transport = TestMockTransport::new().with_response(hex!("919D").to_vec());
        let mut channel = channel_with_session(transport);

        let err = channel
            .transceive([0x90, 0xF5, 0x00, 0x00], &[0x02], &[], CommMode::Mac, true)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::CardStatus {
                command: [0x90, 0xF5],
                ..
            }
        ));
        assert!(!channel.is_authenticated());
    }

    #[test]
    fn test_short_secured_response_is_a_desync() {
        let transport = TestMockTransport::new().with_response(hex!("AABB 9100").to_vec());
        let mut channel = channel_with_session(transport);

        let err = channel
            .transceive([0x90, 0x64, 0x00, 0x00], &[0x00], &[], CommMode::Mac, true)
            .unwrap_err();
        assert!(matches!(err, Error::ProtocolDesync(_)));
        assert!(!channel.is_authenticated());
    }

    #[test]
    fn test_plain_mode_needs_no_session() {
        let transport = TestMockTransport::new().with_response(hex!("9100").to_vec());
        let mut channel = Ev2Channel::new(transport);

        let response = channel
            .transceive(
                [0x00, 0xA4, 0x00, 0x0C],
                &[],
                &hex!("E110"),
                CommMode::Plain,
                true,
            )
            .unwrap();
        assert!(response.status().is_success());
        assert_eq!(channel.transport().commands[0], hex!("00A4000C02E11000"));
    }

    #[test]
    fn test_plain_mode_ticks_counter_inside_session() {
        let transport = TestMockTransport::new()
            .with_response(hex!("9100").to_vec())
            .with_response(hex!("91AF").to_vec());
        let mut channel = channel_with_session(transport);

        channel
            .transceive([0x00, 0xA4, 0x00, 0x0C], &[], &hex!("E104"), CommMode::Plain, true)
            .unwrap();
        assert_eq!(channel.session().unwrap().counter(), 1);

        // 91AF counts as success in plain mode only
        channel
            .transceive([0x90, 0x71, 0x00, 0x00], &[], &[0x00], CommMode::Plain, true)
            .unwrap();
        assert_eq!(channel.session().unwrap().counter(), 2);
    }

    #[test]
    fn test_secured_modes_require_authentication() {
        let transport = TestMockTransport::new();
        let mut channel = Ev2Channel::new(transport);

        for mode in [CommMode::Mac, CommMode::Full] {
            let err = channel
                .transceive([0x90, 0x51, 0x00, 0x00], &[], &[], mode, true)
                .unwrap_err();
            assert!(matches!(err, Error::NotAuthenticated));
        }
        assert!(channel.transport().commands.is_empty());
    }

    #[test]
    fn test_transport_failure_tears_down_session() {
        // No queued responses: the mock fails the transmission
        let transport = TestMockTransport::new();
        let mut channel = channel_with_session(transport);

        let err = channel
            .transceive([0x90, 0xF5, 0x00, 0x00], &[0x02], &[], CommMode::Mac, true)
            .unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert!(!channel.is_authenticated());
    }

    #[test]
    fn test_authenticate_rejects_bad_slot() {
        let mut channel = Ev2Channel::new(TestMockTransport::new());
        let err = channel.authenticate_ev2_first(5, &[0u8; 16]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(channel.transport().commands.is_empty());
    }

    #[test]
    fn test_authenticate_surfaces_card_rejection() {
        // Card refuses the opening frame with an authentication error
        let transport = TestMockTransport::new().with_response(hex!("91AE").to_vec());
        let mut channel = Ev2Channel::new(transport);

        let err = channel.authenticate_ev2_first(0, &[0u8; 16]).unwrap_err();
        assert!(matches!(
            err,
            Error::CardStatus {
                command: [0x90, 0x71],
                ..
            }
        ));
        assert!(!channel.is_authenticated());
    }

    #[test]
    fn test_non_first_requires_live_session() {
        let mut channel = Ev2Channel::new(TestMockTransport::new());
        let err = channel
            .authenticate_ev2_non_first(1, &[0u8; 16])
            .unwrap_err();
        assert!(matches!(err, Error::NotAuthenticated));
    }
}
