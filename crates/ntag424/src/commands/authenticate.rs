//! The two-part EV2 authentication exchanges
//!
//! Both `AuthenticateEV2First` and `AuthenticateEV2NonFirst` open with a
//! key-number frame answered by `91 AF`, and complete with an
//! additional-frame APDU carrying the host cryptogram. These frames travel
//! outside the secure-messaging wrapper and never tick the command counter.

use bytes::{BufMut, Bytes, BytesMut};
use ntag424_apdu_core::Command;

use crate::constants::{cla, ins, CAPABILITY_VECTOR};

/// Opening frame of `AuthenticateEV2First`
pub(crate) fn first_frame(slot: u8) -> Command {
    Command::new_with_data(
        cla::NXP,
        ins::AUTHENTICATE_EV2_FIRST,
        0x00,
        0x00,
        frame_payload(slot),
    )
    .with_le(0x00)
}

/// Opening frame of `AuthenticateEV2NonFirst`
pub(crate) fn non_first_frame(slot: u8) -> Command {
    Command::new_with_data(
        cla::NXP,
        ins::AUTHENTICATE_EV2_NON_FIRST,
        0x00,
        0x00,
        frame_payload(slot),
    )
    .with_le(0x00)
}

/// Closing frame carrying `E(RandA || RandB')`
pub(crate) fn continue_frame(cryptogram: Bytes) -> Command {
    Command::new_with_data(cla::NXP, ins::ADDITIONAL_FRAME, 0x00, 0x00, cryptogram).with_le(0x00)
}

fn frame_payload(slot: u8) -> Bytes {
    let mut payload = BytesMut::with_capacity(1 + CAPABILITY_VECTOR.len());
    payload.put_u8(slot);
    payload.put_slice(&CAPABILITY_VECTOR);
    payload.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_first_frame_wire_format() {
        let apdu = first_frame(0).to_bytes();
        assert_eq!(apdu.as_ref(), hex!("90710000050003000000 00"));

        let apdu = first_frame(3).to_bytes();
        assert_eq!(apdu.as_ref(), hex!("90710000050303000000 00"));
    }

    #[test]
    fn test_non_first_frame_uses_its_own_ins() {
        let apdu = non_first_frame(1).to_bytes();
        assert_eq!(apdu.as_ref(), hex!("90770000050103000000 00"));
    }

    #[test]
    fn test_continue_frame_wire_format() {
        let cryptogram = Bytes::from(vec![0xAB; 32]);
        let apdu = continue_frame(cryptogram).to_bytes();
        assert_eq!(&apdu[..5], hex!("90AF000020"));
        assert_eq!(apdu.len(), 5 + 32 + 1);
        assert_eq!(apdu[apdu.len() - 1], 0x00);
    }
}
