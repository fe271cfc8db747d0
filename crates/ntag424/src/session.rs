//! Session state for EV2 secure messaging
//!
//! A [`Session`] is installed by a successful `AuthenticateEV2First` and
//! holds the two derived AES keys, the transaction identifier, the 16-bit
//! command counter and the slot that authenticated. All fields live and
//! die together; teardown drops the whole value, zeroising the keys.

use std::fmt;

use cipher::Key;
use zeroize::Zeroize;

use crate::crypto::Ev2;
use crate::error::Error;

/// EV2 session keys
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub(crate) struct Keys {
    /// Encryption key
    enc: [u8; 16],
    /// MAC key
    mac: [u8; 16],
}

impl Keys {
    /// Create a new key set with the specified encryption and MAC keys
    pub(crate) fn new(enc: Key<Ev2>, mac: Key<Ev2>) -> Self {
        Self {
            enc: enc.into(),
            mac: mac.into(),
        }
    }

    /// Get the encryption key
    pub(crate) fn enc(&self) -> &Key<Ev2> {
        Key::<Ev2>::from_slice(&self.enc)
    }

    /// Get the MAC key
    pub(crate) fn mac(&self) -> &Key<Ev2> {
        Key::<Ev2>::from_slice(&self.mac)
    }
}

/// Session state installed by a successful EV2 authentication
#[derive(Clone)]
pub struct Session {
    /// Session keys derived from the challenge nonces
    keys: Keys,
    /// Transaction identifier, fixed for the life of the session
    ti: [u8; 4],
    /// Command counter, little-endian on the wire
    counter: u16,
    /// Key slot that established the session
    slot: u8,
}

impl Session {
    pub(crate) fn new(enc: Key<Ev2>, mac: Key<Ev2>, ti: [u8; 4], slot: u8) -> Self {
        Self {
            keys: Keys::new(enc, mac),
            ti,
            counter: 0,
            slot,
        }
    }

    #[cfg(test)]
    pub(crate) fn from_raw(
        enc: &[u8; 16],
        mac: &[u8; 16],
        ti: [u8; 4],
        counter: u16,
        slot: u8,
    ) -> Self {
        Self {
            keys: Keys::new((*enc).into(), (*mac).into()),
            ti,
            counter,
            slot,
        }
    }

    pub(crate) const fn keys(&self) -> &Keys {
        &self.keys
    }

    /// The transaction identifier delivered by the card
    pub const fn ti(&self) -> &[u8; 4] {
        &self.ti
    }

    /// Current value of the command counter
    pub const fn counter(&self) -> u16 {
        self.counter
    }

    /// The command counter as it appears on the wire
    pub(crate) const fn counter_le(&self) -> [u8; 2] {
        self.counter.to_le_bytes()
    }

    /// The key slot that established (or last rotated) the session
    pub const fn slot(&self) -> u8 {
        self.slot
    }

    /// Advance the command counter by one
    ///
    /// The counter is a 16-bit little-endian value; the chip leaves its
    /// behaviour past 0xFFFF undefined, so overflow is unrecoverable.
    pub(crate) fn bump_counter(&mut self) -> Result<(), Error> {
        self.counter = self
            .counter
            .checked_add(1)
            .ok_or(Error::ProtocolDesync("command counter exhausted"))?;
        Ok(())
    }

    /// Replace the session keys after `AuthenticateEV2NonFirst`
    ///
    /// TI and the command counter carry over untouched.
    pub(crate) fn rotate_keys(&mut self, enc: Key<Ev2>, mac: Key<Ev2>, slot: u8) {
        self.keys = Keys::new(enc, mac);
        self.slot = slot;
    }
}

// Keys are deliberately absent from the debug output.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("ti", &format_args!("{}", hex::encode(self.ti)))
            .field("counter", &self.counter)
            .field("slot", &self.slot)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_session(counter: u16) -> Session {
        Session::from_raw(&[0u8; 16], &[1u8; 16], [0x11, 0x22, 0x33, 0x44], counter, 0)
    }

    #[test]
    fn test_counter_increments_by_one() {
        let mut session = test_session(0);
        for expected in 1..=5u16 {
            session.bump_counter().unwrap();
            assert_eq!(session.counter(), expected);
        }
        assert_eq!(session.counter_le(), [0x05, 0x00]);
    }

    #[test]
    fn test_counter_is_little_endian_past_one_byte() {
        let mut session = test_session(0x00FF);
        session.bump_counter().unwrap();
        assert_eq!(session.counter(), 0x0100);
        assert_eq!(session.counter_le(), [0x00, 0x01]);
    }

    #[test]
    fn test_counter_overflow_is_a_desync() {
        let mut session = test_session(0xFFFF);
        assert!(matches!(
            session.bump_counter(),
            Err(Error::ProtocolDesync(_))
        ));
    }

    #[test]
    fn test_rotate_keys_preserves_ti_and_counter() {
        let mut session = test_session(7);
        session.rotate_keys([9u8; 16].into(), [8u8; 16].into(), 3);
        assert_eq!(session.counter(), 7);
        assert_eq!(session.ti(), &[0x11, 0x22, 0x33, 0x44]);
        assert_eq!(session.slot(), 3);
        assert_eq!(session.keys().enc().as_slice(), &[9u8; 16]);
    }

    #[test]
    fn test_debug_does_not_leak_keys() {
        let session = test_session(0);
        let dump = format!("{session:?}");
        assert!(!dump.contains("01010101"));
    }
}
