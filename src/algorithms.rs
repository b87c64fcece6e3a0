//! Cipher and digest name resolution, and the concrete primitive
//! instances a [`Context`](crate::context::Context) wraps.
//!
//! The profile format accepts the full canonical name sets from the
//! original OpenSSL-backed tool (spec-mandated for interoperability of
//! profile files), but this crate only *implements* a modern subset.
//! A canonical name outside that subset parses fine and then fails
//! validation with the same `CipherNotFound`/`DigestNotFound` a truly
//! unknown name would raise — the wire-visible behavior is identical.

use aes::{Aes128, Aes192, Aes256};
use blowfish::Blowfish;
use cast5::Cast5;
use cipher::{BlockEncrypt, KeyInit};
use des::{Des, TdesEde3};
use hmac::{Hmac, Mac};
use md5::Md5;
use sha1::Sha1;

use crate::error::{fail_invariant, ChannelError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherAlgorithm {
    Aes128Ecb,
    Aes192Ecb,
    Aes256Ecb,
    DesEcb,
    Des3,
    BfEcb,
    Cast5Ecb,
}

impl CipherAlgorithm {
    pub fn parse(name: &str) -> Result<Self, ChannelError> {
        match name {
            "aes-128-ecb" => Ok(Self::Aes128Ecb),
            "aes-192-ecb" => Ok(Self::Aes192Ecb),
            "aes-256-ecb" => Ok(Self::Aes256Ecb),
            "des-ecb" => Ok(Self::DesEcb),
            "des3" => Ok(Self::Des3),
            "bf-ecb" => Ok(Self::BfEcb),
            "cast5-ecb" => Ok(Self::Cast5Ecb),
            // Canonical but not implemented by this build.
            "desx" | "rc2-ecb" | "rc5-ecb" | "seed-ecb" => {
                Err(ChannelError::CipherNotFound(name.to_string()))
            }
            other => Err(ChannelError::CipherNotFound(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Aes128Ecb => "aes-128-ecb",
            Self::Aes192Ecb => "aes-192-ecb",
            Self::Aes256Ecb => "aes-256-ecb",
            Self::DesEcb => "des-ecb",
            Self::Des3 => "des3",
            Self::BfEcb => "bf-ecb",
            Self::Cast5Ecb => "cast5-ecb",
        }
    }

    /// Block size `B` in bytes.
    pub fn block_size(&self) -> usize {
        match self {
            Self::Aes128Ecb | Self::Aes192Ecb | Self::Aes256Ecb => 16,
            Self::DesEcb | Self::Des3 | Self::BfEcb | Self::Cast5Ecb => 8,
        }
    }

    /// Key length `K_c` in bytes.
    pub fn key_len(&self) -> usize {
        match self {
            Self::Aes128Ecb => 16,
            Self::Aes192Ecb => 24,
            Self::Aes256Ecb => 32,
            Self::DesEcb => 8,
            Self::Des3 => 24,
            Self::BfEcb => 16,
            Self::Cast5Ecb => 16,
        }
    }
}

/// A raw block-cipher instance keyed for counter-block encryption only.
///
/// This type deliberately exposes nothing resembling an ECB-mode
/// "encrypt this plaintext" entry point — the only operation is
/// [`BlockFunction::encrypt_block`], applied to counter values in
/// `transform.rs`.
pub enum BlockFunction {
    Aes128(Box<Aes128>),
    Aes192(Box<Aes192>),
    Aes256(Box<Aes256>),
    Des(Box<Des>),
    Des3(Box<TdesEde3>),
    Blowfish(Box<Blowfish>),
    Cast5(Box<Cast5>),
}

impl BlockFunction {
    pub fn new(alg: CipherAlgorithm, key: &[u8]) -> Self {
        if key.len() != alg.key_len() {
            fail_invariant("block cipher key length mismatch");
        }
        match alg {
            CipherAlgorithm::Aes128Ecb => Self::Aes128(Box::new(
                Aes128::new_from_slice(key).unwrap_or_else(|_| fail_invariant("aes-128 key")),
            )),
            CipherAlgorithm::Aes192Ecb => Self::Aes192(Box::new(
                Aes192::new_from_slice(key).unwrap_or_else(|_| fail_invariant("aes-192 key")),
            )),
            CipherAlgorithm::Aes256Ecb => Self::Aes256(Box::new(
                Aes256::new_from_slice(key).unwrap_or_else(|_| fail_invariant("aes-256 key")),
            )),
            CipherAlgorithm::DesEcb => Self::Des(Box::new(
                Des::new_from_slice(key).unwrap_or_else(|_| fail_invariant("des key")),
            )),
            CipherAlgorithm::Des3 => Self::Des3(Box::new(
                TdesEde3::new_from_slice(key).unwrap_or_else(|_| fail_invariant("des3 key")),
            )),
            CipherAlgorithm::BfEcb => Self::Blowfish(Box::new(
                Blowfish::new_from_slice(key).unwrap_or_else(|_| fail_invariant("blowfish key")),
            )),
            CipherAlgorithm::Cast5Ecb => Self::Cast5(Box::new(
                Cast5::new_from_slice(key).unwrap_or_else(|_| fail_invariant("cast5 key")),
            )),
        }
    }

    pub fn block_size(&self) -> usize {
        match self {
            Self::Aes128(_) | Self::Aes192(_) | Self::Aes256(_) => 16,
            Self::Des(_) | Self::Des3(_) | Self::Blowfish(_) | Self::Cast5(_) => 8,
        }
    }

    /// Encrypts exactly one block in place. `block.len()` must equal
    /// `block_size()`.
    pub fn encrypt_block(&self, block: &mut [u8]) {
        if block.len() != self.block_size() {
            fail_invariant("counter block size mismatch");
        }
        macro_rules! run {
            ($cipher:expr) => {{
                let ga = cipher::generic_array::GenericArray::from_mut_slice(block);
                $cipher.encrypt_block(ga);
            }};
        }
        match self {
            Self::Aes128(c) => run!(c),
            Self::Aes192(c) => run!(c),
            Self::Aes256(c) => run!(c),
            Self::Des(c) => run!(c),
            Self::Des3(c) => run!(c),
            Self::Blowfish(c) => run!(c),
            Self::Cast5(c) => run!(c),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Md5,
    Sha1,
}

impl DigestAlgorithm {
    pub fn parse(name: &str) -> Result<Self, ChannelError> {
        match name {
            "md5" => Ok(Self::Md5),
            "sha" | "sha1" => Ok(Self::Sha1),
            "md2" | "md4" | "mdc2" | "rmd160" => Err(ChannelError::DigestNotFound(name.to_string())),
            other => Err(ChannelError::DigestNotFound(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
        }
    }

    /// Digest/MAC output length `K_m` in bytes.
    pub fn output_len(&self) -> usize {
        match self {
            Self::Md5 => 16,
            Self::Sha1 => 20,
        }
    }
}

/// A keyed MAC instance (also the primitive iterated by the PRF).
pub enum KeyedDigest {
    Md5(Box<Hmac<Md5>>),
    Sha1(Box<Hmac<Sha1>>),
}

impl KeyedDigest {
    pub fn new(alg: DigestAlgorithm, key: &[u8]) -> Self {
        match alg {
            DigestAlgorithm::Md5 => Self::Md5(Box::new(
                <Hmac<Md5> as Mac>::new_from_slice(key).unwrap_or_else(|_| fail_invariant("hmac-md5 key")),
            )),
            DigestAlgorithm::Sha1 => Self::Sha1(Box::new(
                <Hmac<Sha1> as Mac>::new_from_slice(key).unwrap_or_else(|_| fail_invariant("hmac-sha1 key")),
            )),
        }
    }

    /// One-shot HMAC over `data`, consuming this instance.
    pub fn finish(self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::Md5(mut m) => {
                m.update(data);
                m.finalize().into_bytes().to_vec()
            }
            Self::Sha1(mut m) => {
                m.update(data);
                m.finalize().into_bytes().to_vec()
            }
        }
    }
}

/// One-shot `HMAC(digest, key, data)`.
pub fn hmac_once(alg: DigestAlgorithm, key: &[u8], data: &[u8]) -> Vec<u8> {
    KeyedDigest::new(alg, key).finish(data)
}
