//! Transport layer for card communication
//!
//! This module provides the trait that concrete ISO-DEP bindings implement.
//! The transport is assumed to preserve byte order and add or strip no
//! framing of its own.

use bytes::Bytes;
use std::fmt;

use crate::Error;

/// Trait for card transport connections
///
/// Implementors must provide methods for raw transmit and reset. `reset`
/// doubles as the session lifecycle hook: it is invoked both when a driver
/// binds the transport and when it releases it.
pub trait CardTransport: fmt::Debug + Send + Sync {
    /// Send a raw APDU command and get the response (`data || SW1 SW2`)
    fn transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, Error>;

    /// Reset the transport
    fn reset(&mut self) -> Result<(), Error>;
}

impl<T: CardTransport + ?Sized> CardTransport for &mut T {
    fn transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, Error> {
        (**self).transmit_raw(command)
    }

    fn reset(&mut self) -> Result<(), Error> {
        (**self).reset()
    }
}

#[cfg(test)]
pub(crate) use mock::MockTransport;

#[cfg(test)]
mod mock {
    use super::*;

    /// Mock transport for testing
    #[derive(Debug)]
    pub(crate) struct MockTransport {
        /// Response bytes to return
        pub response: Bytes,
    }

    impl MockTransport {
        /// Create a new mock transport with a fixed response
        pub(crate) fn with_response(response: Bytes) -> Self {
            Self { response }
        }
    }

    impl CardTransport for MockTransport {
        fn transmit_raw(&mut self, _command: &[u8]) -> Result<Bytes, Error> {
            Ok(self.response.clone())
        }

        fn reset(&mut self) -> Result<(), Error> {
            Ok(())
        }
    }

    #[test]
    fn test_mock_transport() {
        let mut transport = MockTransport::with_response(Bytes::from_static(&[0x91, 0x00]));
        let response = transport.transmit_raw(&[0x90, 0x51, 0x00, 0x00, 0x00]).unwrap();
        assert_eq!(response.as_ref(), &[0x91, 0x00]);
        assert!(transport.reset().is_ok());
    }
}
