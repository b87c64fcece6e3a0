//! Epoch key sets: derivation, usage accounting, and destruction.

use std::time::{Duration, Instant};

use zeroize::Zeroizing;

use crate::algorithms::{BlockFunction, KeyedDigest};
use crate::kdf::prf;
use crate::profile::Profile;

/// One epoch of the channel: a derived `(enc_key, mac_key, seq_key)`
/// triple plus the cipher/digest instances built from them, and the
/// usage counters that decide when this epoch must be rotated.
pub struct Context {
    context_id: u32,
    enc_key: Zeroizing<Vec<u8>>,
    mac_key: Zeroizing<Vec<u8>>,
    seq_key: Zeroizing<Vec<u8>>,
    cipher: BlockFunction,
    digest: crate::algorithms::DigestAlgorithm,
    block_size: usize,
    bytes_limit: u64,
    key_lifetime: Duration,
    bytes: u64,
    blocks: u64,
    created_at: Instant,
}

impl Context {
    /// Derives a fresh epoch from `profile` under `context_id`, with
    /// `this_nonce`/`that_nonce` giving the derivation its directional
    /// asymmetry (sender and receiver swap which nonce is "this" and
    /// "that", so the same `context_id` yields distinct key schedules
    /// for the two directions).
    pub fn create(profile: &Profile, context_id: u32, this_nonce: &[u8], that_nonce: &[u8]) -> Self {
        let mut label = Vec::with_capacity(4 + this_nonce.len() + that_nonce.len());
        label.extend_from_slice(&context_id.to_be_bytes());
        label.extend_from_slice(this_nonce);
        label.extend_from_slice(that_nonce);

        let k_c = profile.cipher.key_len();
        let k_m = profile.digest.output_len();

        let enc_key = Zeroizing::new(prf(profile.digest, &profile.master_key, &labeled(b"ENC", &label), k_c));
        let mac_key = Zeroizing::new(prf(profile.digest, &profile.master_key, &labeled(b"MAC", &label), k_m));
        let seq_key = Zeroizing::new(prf(profile.digest, &profile.master_key, &labeled(b"SEQ", &label), k_m));

        let cipher = BlockFunction::new(profile.cipher, &enc_key);
        let block_size = profile.cipher.block_size();

        Self {
            context_id,
            bytes_limit: profile.block_limit as u64 * block_size as u64,
            key_lifetime: Duration::from_secs(profile.key_lifetime as u64),
            cipher,
            digest: profile.digest,
            block_size,
            enc_key,
            mac_key,
            seq_key,
            bytes: 0,
            blocks: 0,
            created_at: Instant::now(),
        }
    }

    pub fn context_id(&self) -> u32 {
        self.context_id
    }

    pub fn cipher(&self) -> &BlockFunction {
        &self.cipher
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Low 64 bits of the sequence-masking subkey, used to blind the
    /// counter block (spec §4.E — not a security-critical step, part
    /// of the wire contract).
    pub fn seq_mask(&self) -> u64 {
        let k = &self.seq_key;
        let len = k.len();
        let mut bytes = [0u8; 8];
        let n = len.min(8);
        bytes[8 - n..].copy_from_slice(&k[len - n..]);
        u64::from_be_bytes(bytes)
    }

    pub fn mac(&self) -> KeyedDigest {
        KeyedDigest::new(self.digest, &self.mac_key)
    }

    /// `K_m`: the MAC/digest output length in bytes.
    pub fn mac_len(&self) -> usize {
        self.digest.output_len()
    }

    pub fn bytes_limit(&self) -> u64 {
        self.bytes_limit
    }

    /// True once a write of `next_write_len` more bytes would exceed
    /// the epoch's byte budget, or once the epoch has outlived the
    /// profile's key lifetime. The C original this crate reimplements
    /// declares `key_lifetime` but never checks it in the send loop —
    /// this crate enforces it.
    pub fn is_exhausted(&self, next_write_len: usize) -> bool {
        self.bytes + next_write_len as u64 > self.bytes_limit
            || self.created_at.elapsed() >= self.key_lifetime
    }

    pub fn record_write(&mut self, n: usize) {
        self.bytes += n as u64;
        self.blocks += (n as u64).div_ceil(self.block_size as u64);
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    pub fn blocks(&self) -> u64 {
        self.blocks
    }

    /// Releases cipher/digest state and zeros subkeys. Equivalent to
    /// dropping the context — `Zeroizing` already wipes `enc_key`,
    /// `mac_key`, and `seq_key` on drop — but spelled out as an
    /// explicit call at epoch boundaries for readability.
    pub fn destroy(self) {
        drop(self)
    }
}

fn labeled(tag: &[u8], label: &[u8]) -> Vec<u8> {
    let mut v = Vec::with_capacity(tag.len() + label.len());
    v.extend_from_slice(tag);
    v.extend_from_slice(label);
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::{CipherAlgorithm, DigestAlgorithm};

    fn test_profile() -> Profile {
        Profile {
            cipher: CipherAlgorithm::Aes128Ecb,
            digest: DigestAlgorithm::Sha1,
            master_key: vec![0u8; 16],
            key_lifetime: 3600,
            block_limit: 1024,
        }
    }

    #[test]
    fn directional_asymmetry() {
        let profile = test_profile();
        let sender = Context::create(&profile, 0, b"5000", b"5001");
        let receiver = Context::create(&profile, 0, b"5001", b"5000");
        // Same context_id, swapped nonces -> different enc key material
        // manifests as different keystream for the same counter.
        let mut a = [0u8; 16];
        let mut b = [0u8; 16];
        sender.cipher().encrypt_block(&mut a);
        receiver.cipher().encrypt_block(&mut b);
        assert_ne!(a, b);
    }

    #[test]
    fn exhaustion_on_byte_limit() {
        let mut profile = test_profile();
        profile.block_limit = 1;
        let mut ctx = Context::create(&profile, 0, b"a", b"b");
        assert!(!ctx.is_exhausted(16));
        ctx.record_write(16);
        assert!(ctx.is_exhausted(1));
    }
}
