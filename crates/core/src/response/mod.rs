//! APDU response definitions
//!
//! This module provides types for working with APDU responses according to
//! ISO/IEC 7816-4: a payload followed by a two-byte status word.

pub mod status;

use bytes::{BufMut, Bytes, BytesMut};
use tracing::trace;

use crate::Error;
use status::StatusWord;

/// Basic APDU response structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Response payload data
    payload: Bytes,
    /// Status word
    status: StatusWord,
}

impl Response {
    /// Create a new response with payload and status
    pub fn new(payload: impl Into<Bytes>, status: impl Into<StatusWord>) -> Self {
        Self {
            payload: payload.into(),
            status: status.into(),
        }
    }

    /// Create a success response (SW=9100)
    pub fn success(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
            status: StatusWord::new(0x91, 0x00),
        }
    }

    /// Parse response from raw bytes (including status word)
    pub fn from_bytes(data: &[u8]) -> Result<Self, Error> {
        if data.len() < 2 {
            return Err(Error::parse("response shorter than a status word"));
        }

        let (payload, sw) = data.split_at(data.len() - 2);
        let status = StatusWord::new(sw[0], sw[1]);

        trace!(
            sw1 = format_args!("{:#04x}", status.sw1),
            sw2 = format_args!("{:#04x}", status.sw2),
            payload_len = payload.len(),
            "Parsed APDU response"
        );

        Ok(Self {
            payload: Bytes::copy_from_slice(payload),
            status,
        })
    }

    /// Get the response payload data
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Take the payload out of the response
    pub fn into_payload(self) -> Bytes {
        self.payload
    }

    /// Get the status word
    pub const fn status(&self) -> StatusWord {
        self.status
    }
}

impl TryFrom<&[u8]> for Response {
    type Error = Error;

    fn try_from(data: &[u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(data)
    }
}

impl From<Response> for Bytes {
    fn from(response: Response) -> Self {
        let mut buf = BytesMut::with_capacity(response.payload.len() + 2);
        buf.put_slice(&response.payload);
        buf.put_u8(response.status.sw1);
        buf.put_u8(response.status.sw2);
        buf.freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_from_bytes() {
        let data = [0x01, 0x02, 0x03, 0x91, 0x00];
        let resp = Response::from_bytes(&data).unwrap();
        assert_eq!(resp.payload(), &[0x01, 0x02, 0x03]);
        assert_eq!(resp.status(), StatusWord::new(0x91, 0x00));
        assert!(resp.status().is_success());

        let data = [0x91, 0xAF];
        let resp = Response::from_bytes(&data).unwrap();
        assert_eq!(resp.payload(), &[]);
        assert!(resp.status().is_additional_frame());

        let data = [0x01];
        assert!(Response::from_bytes(&data).is_err());
    }

    #[test]
    fn test_response_roundtrip() {
        let resp = Response::new(Bytes::from_static(&[0xAA, 0xBB]), (0x91, 0x7E));
        let bytes: Bytes = resp.clone().into();
        assert_eq!(bytes.as_ref(), &[0xAA, 0xBB, 0x91, 0x7E]);
        assert_eq!(Response::from_bytes(&bytes).unwrap(), resp);
    }
}
