//! Counter-block construction, keystream XOR, and HMAC compute/verify.
//!
//! The block cipher is *only* ever applied to counter values here —
//! there is no code path that hands plaintext to a block-cipher ECB
//! call directly (spec design note: never expose ECB to plaintext).

use subtle::ConstantTimeEq;

use crate::context::Context;
use crate::wire::{Sdu, HEADER_BYTES};

/// Combines `sequence_number` (48 bits) and `context_index` (16 bits)
/// into a 64-bit tag (`sequence_number << 16 | context_index`), masks
/// it with the context's sequence-masking subkey, and zero-pads it
/// into the low-order bytes of a `block_size`-byte counter block.
pub fn compute_counter(ctx: &Context, sdu: &Sdu) -> Vec<u8> {
    let tag = (sdu.sequence_number() << 16) | sdu.context_index() as u64;
    let masked = tag ^ ctx.seq_mask();

    let block_size = ctx.block_size();
    let mut block = vec![0u8; block_size];
    let masked_bytes = masked.to_be_bytes();
    let n = masked_bytes.len().min(block_size);
    block[block_size - n..].copy_from_slice(&masked_bytes[8 - n..]);
    block
}

fn increment_low64(counter: &mut [u8], i: u64) {
    let block_size = counter.len();
    let n = 8.min(block_size);
    let start = block_size - n;
    let mut low = [0u8; 8];
    low[8 - n..].copy_from_slice(&counter[start..]);
    let v = u64::from_be_bytes(low).wrapping_add(i);
    let v_bytes = v.to_be_bytes();
    counter[start..].copy_from_slice(&v_bytes[8 - n..]);
}

/// XORs `data` in place with the keystream generated by encrypting
/// successive increments of `counter`. Same function decrypts (XOR is
/// its own inverse). Returns the number of cipher-block operations
/// performed (`ceil(data.len() / block_size)`).
pub fn apply_keystream(ctx: &Context, data: &mut [u8], counter: &[u8]) -> u64 {
    let block_size = ctx.block_size();
    let n_blocks = data.len().div_ceil(block_size.max(1));

    for i in 0..n_blocks {
        let mut counter_i = counter.to_vec();
        increment_low64(&mut counter_i, i as u64);
        ctx.cipher().encrypt_block(&mut counter_i);

        let start = i * block_size;
        let end = (start + block_size).min(data.len());
        for (byte, ks) in data[start..end].iter_mut().zip(counter_i.iter()) {
            *byte ^= ks;
        }
    }
    n_blocks as u64
}

/// Computes `HMAC(header || sequence_number(6) || context_index(2) || ciphertext)`
/// and writes it into the trailing MAC bytes of `sdu`'s fragment.
pub fn compute_digest(ctx: &Context, sdu: &mut Sdu) {
    let mac_len = ctx.mac_len();
    let header = sdu.as_bytes()[..HEADER_BYTES].to_vec();
    let seq = sdu.sequence_number();
    let ctx_idx = sdu.context_index();
    let ciphertext = sdu.ciphertext(mac_len).to_vec();

    let tag = mac_input(&header, seq, ctx_idx, &ciphertext);
    let digest = ctx.mac().finish(&tag);
    sdu.mac_mut(mac_len).copy_from_slice(&digest);
}

/// Recomputes the MAC over the same range and compares it against the
/// trailing tag in constant time. Never returns `true` on mismatch,
/// and the caller must never surface plaintext when this returns
/// `false`.
pub fn verify_digest(ctx: &Context, sdu: &Sdu) -> bool {
    let mac_len = ctx.mac_len();
    if sdu.fragment().len() < mac_len {
        return false;
    }
    let header = sdu.as_bytes()[..HEADER_BYTES].to_vec();
    let seq = sdu.sequence_number();
    let ctx_idx = sdu.context_index();
    let ciphertext = sdu.ciphertext(mac_len).to_vec();

    let tag = mac_input(&header, seq, ctx_idx, &ciphertext);
    let expected = ctx.mac().finish(&tag);
    let actual = sdu.mac(mac_len);

    expected.ct_eq(actual).into()
}

fn mac_input(header: &[u8], sequence_number: u64, context_index: u16, ciphertext: &[u8]) -> Vec<u8> {
    let mut v = Vec::with_capacity(header.len() + 8 + ciphertext.len());
    v.extend_from_slice(header);
    v.extend_from_slice(&sequence_number.to_be_bytes()[2..]); // 48 bits
    v.extend_from_slice(&context_index.to_be_bytes());
    v.extend_from_slice(ciphertext);
    v
}
