//! Error taxonomy for the secure channel.
//!
//! Every failure the core can raise maps to one variant here. Profile
//! errors are fatal at startup; frame-level errors are logged and the
//! frame is dropped; `InternalInvariant` indicates a programming bug
//! and is never expected to occur at runtime.

use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum ChannelError {
    /// The profile source could not be found.
    FileNotFound(PathBuf),
    /// The profile source was found but its structure is malformed.
    ParseError(String),
    /// The profile named a cipher that is not in the supported set.
    CipherNotFound(String),
    /// The profile named a digest that is not in the supported set.
    DigestNotFound(String),
    /// A received frame has a bad header or an undersized body.
    InvalidFrame(String),
    /// A received frame failed MAC verification.
    IntegrityFailure,
    /// The transport adapter reported a send/receive failure.
    TransportError(String),
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileNotFound(path) => write!(f, "profile not found: {}", path.display()),
            Self::ParseError(msg) => write!(f, "cannot parse profile: {}", msg),
            Self::CipherNotFound(name) => write!(
                f,
                "invalid cipher algorithm `{}'.\nValid algorithms are aes-128-ecb aes-192-ecb aes-256-ecb bf-ecb cast5-ecb des-ecb des3 desx rc2-ecb rc5-ecb seed-ecb",
                name
            ),
            Self::DigestNotFound(name) => write!(
                f,
                "invalid digest algorithm `{}'.\nValid algorithms are md2 md4 md5 mdc2 rmd160 sha sha1",
                name
            ),
            Self::InvalidFrame(msg) => write!(f, "invalid frame: {}", msg),
            Self::IntegrityFailure => write!(f, "integrity check failed"),
            Self::TransportError(msg) => write!(f, "transport error: {}", msg),
        }
    }
}

impl std::error::Error for ChannelError {}

/// An invariant the core relies on internally (cipher block size
/// consistency after profile validation, key length mismatches).
/// These are bugs, not runtime conditions, so callers never receive
/// them as a `ChannelError` — they panic at the point of detection.
#[track_caller]
pub fn fail_invariant(msg: &'static str) -> ! {
    panic!("internal invariant violated: {}", msg);
}
