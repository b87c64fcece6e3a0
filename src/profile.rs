//! Immutable channel parameters, loaded once from a configuration file
//! and shared by reference with every context derived from them.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::algorithms::{CipherAlgorithm, DigestAlgorithm};
use crate::error::ChannelError;

/// Parameters shared by every epoch of one channel run. Read-only
/// after [`Profile::load_and_validate`]; contexts take it by shared
/// reference and never mutate it.
#[derive(Debug, Clone)]
pub struct Profile {
    pub cipher: CipherAlgorithm,
    pub digest: DigestAlgorithm,
    pub master_key: Vec<u8>,
    /// Seconds; a context must be rotated once older than this.
    pub key_lifetime: u32,
    /// Maximum number of cipher blocks permitted under one epoch's key.
    pub block_limit: u32,
}

impl Profile {
    /// Parses a `key = value` configuration file. `#`-prefixed lines
    /// and blank lines are ignored; unknown keys are ignored
    /// (forward-compatible). Required keys: `cipher`, `digest`,
    /// `master_key` (hex), `key_lifetime`, `block_limit`.
    pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Self, ChannelError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|_| ChannelError::FileNotFound(path.to_path_buf()))?;

        let mut cipher_name = None;
        let mut digest_name = None;
        let mut master_key_hex = None;
        let mut key_lifetime = None;
        let mut block_limit = None;

        for (lineno, raw_line) in text.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (key, value) = line.split_once('=').ok_or_else(|| {
                ChannelError::ParseError(format!("line {}: expected `key = value'", lineno + 1))
            })?;
            let key = key.trim();
            let value = value.trim();
            match key {
                "cipher" => cipher_name = Some(value.to_string()),
                "digest" => digest_name = Some(value.to_string()),
                "master_key" => master_key_hex = Some(value.to_string()),
                "key_lifetime" => key_lifetime = Some(value.to_string()),
                "block_limit" => block_limit = Some(value.to_string()),
                _ => {} // forward-compatible: ignore unrecognized keys
            }
        }

        let cipher_name = cipher_name.ok_or_else(|| ChannelError::ParseError("missing `cipher'".into()))?;
        let digest_name = digest_name.ok_or_else(|| ChannelError::ParseError("missing `digest'".into()))?;
        let master_key_hex =
            master_key_hex.ok_or_else(|| ChannelError::ParseError("missing `master_key'".into()))?;
        let key_lifetime = key_lifetime.ok_or_else(|| ChannelError::ParseError("missing `key_lifetime'".into()))?;
        let block_limit = block_limit.ok_or_else(|| ChannelError::ParseError("missing `block_limit'".into()))?;

        let cipher = CipherAlgorithm::parse(&cipher_name)?;
        let digest = DigestAlgorithm::parse(&digest_name)?;

        let master_key = hex::decode(&master_key_hex)
            .map_err(|e| ChannelError::ParseError(format!("invalid `master_key' hex: {}", e)))?;
        if master_key.is_empty() || master_key.len() > 64 {
            return Err(ChannelError::ParseError(
                "`master_key' must be 1..=64 bytes (up to 512 bits)".into(),
            ));
        }

        let key_lifetime: u32 = key_lifetime
            .parse()
            .map_err(|_| ChannelError::ParseError("`key_lifetime' must be a u32".into()))?;
        let block_limit: u32 = block_limit
            .parse()
            .map_err(|_| ChannelError::ParseError("`block_limit' must be a u32".into()))?;

        Ok(Self {
            cipher,
            digest,
            master_key,
            key_lifetime,
            block_limit,
        })
    }

    /// Human-readable dump. Never includes the key material itself.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "cipher:       {}", self.cipher.name());
        let _ = writeln!(out, "digest:       {}", self.digest.name());
        let _ = writeln!(out, "key length:   {} bytes", self.master_key.len());
        let _ = writeln!(out, "key lifetime: {} s", self.key_lifetime);
        let _ = writeln!(out, "block limit:  {} blocks", self.block_limit);
        out
    }
}
