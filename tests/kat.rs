//! Known-answer tests pinning wire constants and the PRF vector.

use sechan::algorithms::{hmac_once, DigestAlgorithm};
use sechan::kdf::prf;
use sechan::wire::{Sdu, HEADER_BYTES, SECURED_PREFIX_BYTES};

#[test]
fn wire_constants() {
    assert_eq!(HEADER_BYTES, 4);
    assert_eq!(SECURED_PREFIX_BYTES, 8);
}

/// S1's pinned total length: header(4) + prefix(8) + ciphertext(16) + mac(20).
#[test]
fn s1_sdu_length_is_pinned() {
    let sdu = Sdu::allocate_secured(16, 20, 6);
    assert_eq!(sdu.length(), 44);
    assert_eq!(sdu.total_length(), 48);
}

/// S6 — PRF vector: sha1, 32 zero-byte key, label "TEST", 64 bytes
/// output. Pinned against a direct one-shot HMAC computation so any
/// future change to the feedback loop is caught.
#[test]
fn s6_prf_vector() {
    let key = [0u8; 32];
    let out = prf(DigestAlgorithm::Sha1, &key, b"TEST", 64);
    assert_eq!(out.len(), 64);

    let t1 = hmac_once(DigestAlgorithm::Sha1, &key, b"TEST");
    assert_eq!(&out[..20], &t1[..]);

    let mut t2_input = t1.clone();
    t2_input.extend_from_slice(b"TEST");
    let t2 = hmac_once(DigestAlgorithm::Sha1, &key, &t2_input);
    assert_eq!(&out[20..40], &t2[..20]);
}

#[test]
fn sdu_header_bytes_are_big_endian() {
    let sdu = Sdu::allocate_plain(b"x");
    // type = 0 (PLAIN), length = 1
    assert_eq!(&sdu.as_bytes()[..4], &[0x00, 0x00, 0x00, 0x01]);
}

#[test]
fn sequence_number_and_context_index_are_big_endian() {
    let mut sdu = Sdu::allocate_secured(8, 16, 4);
    sdu.set_context_index(0x0A0B);
    sdu.set_sequence_number(0x0102_0304_0506);
    let bytes = sdu.as_bytes();
    assert_eq!(&bytes[HEADER_BYTES..HEADER_BYTES + 2], &[0x0A, 0x0B]);
    assert_eq!(
        &bytes[HEADER_BYTES + 2..HEADER_BYTES + SECURED_PREFIX_BYTES],
        &[0x01, 0x02, 0x03, 0x04, 0x05, 0x06]
    );
}
