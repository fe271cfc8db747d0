//! Cryptographic primitives for EV2 secure messaging
//!
//! AES-128 in CBC (unpadded) and single-block ECB, AES-CMAC with the
//! NXP wire truncation, the JAMCRC variant used by ChangeKey, and the
//! SV1/SV2 session-key derivation.

use aes::Aes128;
use bytes::{Bytes, BytesMut};
use cipher::{
    block_padding::NoPadding, consts::U16, BlockDecryptMut, BlockEncrypt, BlockEncryptMut, Iv,
    IvSizeUser, Key, KeyInit, KeyIvInit, KeySizeUser,
};
use cmac::{Cmac, Mac};
use crc::{Crc, CRC_32_JAMCRC};

use crate::error::Error;

type Encryptor = cbc::Encryptor<Aes128>;
type Decryptor = cbc::Decryptor<Aes128>;

/// Marker type carrying the key and IV sizes of the EV2 secure channel
#[derive(Debug, Clone, Copy)]
pub struct Ev2;

impl KeySizeUser for Ev2 {
    type KeySize = U16;
}

impl IvSizeUser for Ev2 {
    type IvSize = U16;
}

/// Label of the command-direction data-phase IV block
pub(crate) const IV_LABEL_COMMAND: [u8; 2] = [0xA5, 0x5A];
/// Label of the response-direction data-phase IV block
pub(crate) const IV_LABEL_RESPONSE: [u8; 2] = [0x5A, 0xA5];

const SV1_LABEL: [u8; 2] = [0xA5, 0x5A];
const SV2_LABEL: [u8; 2] = [0x5A, 0xA5];

const JAMCRC: Crc<u32> = Crc::<u32>::new(&CRC_32_JAMCRC);

/// Encrypt `data` with AES-128-CBC, no padding
///
/// The input length must be a positive multiple of the block size; the
/// output has the same length as the input.
pub(crate) fn cbc_encrypt(key: &Key<Ev2>, iv: &Iv<Ev2>, data: &[u8]) -> Result<Bytes, Error> {
    if data.is_empty() || data.len() % 16 != 0 {
        return Err(Error::InvalidArgument(
            "CBC input must be a positive multiple of the block size",
        ));
    }

    let mut buf = BytesMut::from(data);
    let len = buf.len();
    let encrypted = Encryptor::new(key, iv)
        .encrypt_padded_mut::<NoPadding>(&mut buf, len)
        .map_err(|_| Error::InvalidArgument("CBC input exceeds the working buffer"))?;
    Ok(Bytes::copy_from_slice(encrypted))
}

/// Decrypt `data` with AES-128-CBC, no padding removal
///
/// Callers slice any protocol padding off themselves.
pub(crate) fn cbc_decrypt(key: &Key<Ev2>, iv: &Iv<Ev2>, data: &[u8]) -> Result<Bytes, Error> {
    if data.is_empty() || data.len() % 16 != 0 {
        return Err(Error::InvalidArgument(
            "CBC input must be a positive multiple of the block size",
        ));
    }

    let mut buf = BytesMut::from(data);
    let decrypted = Decryptor::new(key, iv)
        .decrypt_padded_mut::<NoPadding>(&mut buf)
        .map_err(|_| Error::InvalidArgument("CBC input is not block aligned"))?;
    Ok(Bytes::copy_from_slice(decrypted))
}

/// Encrypt a single block with AES-128-ECB
///
/// Used only to derive the data-phase CBC IVs from the session state.
pub(crate) fn encrypt_block(key: &Key<Ev2>, block: &[u8; 16]) -> [u8; 16] {
    let cipher = Aes128::new(key);
    let mut out = aes::Block::clone_from_slice(block);
    cipher.encrypt_block(&mut out);
    out.into()
}

/// AES-CMAC per RFC 4493; accepts a zero-length message
pub(crate) fn aes_cmac(key: &Key<Ev2>, message: &[u8]) -> [u8; 16] {
    let mut mac = <Cmac<Aes128> as Mac>::new(key);
    mac.update(message);
    mac.finalize().into_bytes().into()
}

/// Truncate a full CMAC to the 8 bytes carried on the wire
///
/// The chip transmits the odd-indexed bytes (1, 3, .., 15) of the 16-byte
/// CMAC; the full tag never appears on the wire.
pub(crate) fn truncate_mac(full: &[u8; 16]) -> [u8; 8] {
    [
        full[1], full[3], full[5], full[7], full[9], full[11], full[13], full[15],
    ]
}

/// ISO/IEC 7816-4 padding method 2: append `0x80`, then zeros up to the
/// next block boundary. Padding is always added, so an aligned input grows
/// by a whole block.
pub(crate) fn pad_iso7816(data: &mut BytesMut) {
    data.extend_from_slice(&[0x80]);
    let padded_len = data.len().div_ceil(16) * 16;
    data.resize(padded_len, 0x00);
}

/// CRC-32 in the JAMCRC variant (complement of IEEE 802.3), little-endian
pub(crate) fn jamcrc(data: &[u8]) -> [u8; 4] {
    JAMCRC.checksum(data).to_le_bytes()
}

/// Rotate a challenge left by one whole byte
pub(crate) fn rotate_left_one(input: &[u8; 16]) -> [u8; 16] {
    let mut out = [0u8; 16];
    out[..15].copy_from_slice(&input[1..]);
    out[15] = input[0];
    out
}

/// Extract bits `lo..=hi` of `byte`
pub(crate) const fn bits(byte: u8, lo: u8, hi: u8) -> u8 {
    (byte >> lo) & (((1u16 << (hi - lo + 1)) - 1) as u8)
}

/// Derive the session key pair from the authentication key and the two
/// challenge nonces
///
/// `K_enc = CMAC(K, SV1)` and `K_mac = CMAC(K, SV2)`, where the two
/// 32-byte derivation inputs differ only in their leading label
/// (`A5 5A` for SV1, `5A A5` for SV2).
pub(crate) fn derive_session_keys(
    key: &Key<Ev2>,
    rand_a: &[u8; 16],
    rand_b: &[u8; 16],
) -> (Key<Ev2>, Key<Ev2>) {
    let sv1 = session_vector(SV1_LABEL, rand_a, rand_b);
    let sv2 = session_vector(SV2_LABEL, rand_a, rand_b);
    let enc = Key::<Ev2>::from(aes_cmac(key, &sv1));
    let mac = Key::<Ev2>::from(aes_cmac(key, &sv2));
    (enc, mac)
}

// Layout: label || 00 01 00 80 || RandA[0..2] || RandA[2..8] xor RandB[0..6]
//         || RandB[6..16] || RandA[8..16]
fn session_vector(label: [u8; 2], rand_a: &[u8; 16], rand_b: &[u8; 16]) -> [u8; 32] {
    let mut sv = [0u8; 32];
    sv[..2].copy_from_slice(&label);
    sv[2..6].copy_from_slice(&[0x00, 0x01, 0x00, 0x80]);
    sv[6..8].copy_from_slice(&rand_a[..2]);
    for i in 0..6 {
        sv[8 + i] = rand_a[2 + i] ^ rand_b[i];
    }
    sv[14..24].copy_from_slice(&rand_b[6..]);
    sv[24..32].copy_from_slice(&rand_a[8..]);
    sv
}

/// Compute a data-phase CBC IV by encrypting the labelled session block
///
/// Block layout: `label || TI || CC_le || 00*8`, encrypted as a single
/// AES-128-ECB block under the session encryption key.
pub(crate) fn data_phase_iv(
    enc_key: &Key<Ev2>,
    label: [u8; 2],
    ti: &[u8; 4],
    counter_le: [u8; 2],
) -> Iv<Ev2> {
    let mut block = [0u8; 16];
    block[..2].copy_from_slice(&label);
    block[2..6].copy_from_slice(ti);
    block[6..8].copy_from_slice(&counter_le);
    Iv::<Ev2>::from(encrypt_block(enc_key, &block))
}
