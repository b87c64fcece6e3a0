//! Key expansion PRF (HKDF-Expand-style iterated HMAC feedback).
//!
//! `T(0) = empty`, `T(i) = HMAC(master_key, T(i-1) || label)`, output is
//! `T(1) || T(2) || ...` truncated to the requested length. This must
//! stay byte-exact across implementations given the same digest, so
//! the loop below is the one normative definition — don't "simplify"
//! it into a call to the `hkdf` crate's `expand`, which mixes in a
//! counter byte this construction doesn't use.

use crate::algorithms::{hmac_once, DigestAlgorithm};

pub fn prf(digest: DigestAlgorithm, master_key: &[u8], label: &[u8], output_len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(output_len + digest.output_len());
    let mut t = Vec::new();
    while out.len() < output_len {
        let mut input = t;
        input.extend_from_slice(label);
        t = hmac_once(digest, master_key, &input);
        out.extend_from_slice(&t);
    }
    out.truncate(output_len);
    out
}
