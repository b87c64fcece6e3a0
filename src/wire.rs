//! SDU framing: bit-exact serialization/parsing of the header and body.
//!
//! Wire layout (all multi-byte integers big-endian, network byte
//! order — the normative choice that resolves the host-byte-order
//! ambiguity in the original design):
//!
//! ```text
//!   type (u16) | length (u16)                           -- header, 4 bytes
//!   -- SECURED body --
//!   context_index (u16) | sequence_number (u48)          -- 8 bytes
//!   ciphertext (ceil(msg_len / B) * B bytes)
//!   MAC (K_m bytes)
//!   -- PLAIN body --
//!   data (length bytes)
//! ```
//!
//! The SDU is represented as an owned byte buffer plus accessor
//! methods, never as a fixed-size struct with a trailing flexible
//! array member.

use crate::error::ChannelError;

pub const HEADER_BYTES: usize = 4;
/// `context_index` (2 bytes) + `sequence_number` (6 bytes).
pub const SECURED_PREFIX_BYTES: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum SduType {
    Plain = 0,
    Secured = 1,
}

impl SduType {
    fn from_u16(v: u16) -> Option<Self> {
        match v {
            0 => Some(Self::Plain),
            1 => Some(Self::Secured),
            _ => None,
        }
    }
}

fn round_up(n: usize, block_size: usize) -> usize {
    n.div_ceil(block_size) * block_size
}

/// Computes the total body length (the `length` header field) for an
/// SDU of the given type carrying `msg_len` plaintext bytes.
pub fn expected_body_length(sdu_type: SduType, block_size: usize, mac_len: usize, msg_len: usize) -> usize {
    match sdu_type {
        SduType::Plain => msg_len,
        SduType::Secured => SECURED_PREFIX_BYTES + round_up(msg_len, block_size) + mac_len,
    }
}

/// An owned SDU frame: header plus body, viewed and mutated through
/// accessor methods.
#[derive(Debug, Clone)]
pub struct Sdu {
    buf: Vec<u8>,
}

impl Sdu {
    /// Allocates a SECURED SDU sized for `msg_len` plaintext bytes,
    /// with the header written and the body zeroed.
    pub fn allocate_secured(block_size: usize, mac_len: usize, msg_len: usize) -> Self {
        let body_len = expected_body_length(SduType::Secured, block_size, mac_len, msg_len);
        let mut buf = vec![0u8; HEADER_BYTES + body_len];
        buf[0..2].copy_from_slice(&(SduType::Secured as u16).to_be_bytes());
        buf[2..4].copy_from_slice(&(body_len as u16).to_be_bytes());
        Self { buf }
    }

    /// Allocates a PLAIN SDU wrapping `data` verbatim.
    pub fn allocate_plain(data: &[u8]) -> Self {
        let mut buf = vec![0u8; HEADER_BYTES + data.len()];
        buf[0..2].copy_from_slice(&(SduType::Plain as u16).to_be_bytes());
        buf[2..4].copy_from_slice(&(data.len() as u16).to_be_bytes());
        buf[HEADER_BYTES..].copy_from_slice(data);
        Self { buf }
    }

    /// Parses and structurally validates a received buffer. Does not
    /// verify the MAC — that's `transform::verify_digest`'s job.
    pub fn parse(bytes: &[u8]) -> Result<Self, ChannelError> {
        if bytes.len() < HEADER_BYTES {
            return Err(ChannelError::InvalidFrame("shorter than header".into()));
        }
        let raw_type = u16::from_be_bytes([bytes[0], bytes[1]]);
        let sdu_type = SduType::from_u16(raw_type)
            .ok_or_else(|| ChannelError::InvalidFrame(format!("unknown SDU type {}", raw_type)))?;
        let length = u16::from_be_bytes([bytes[2], bytes[3]]) as usize;
        if bytes.len() < HEADER_BYTES + length {
            return Err(ChannelError::InvalidFrame("body shorter than length field".into()));
        }
        if sdu_type == SduType::Secured && length < SECURED_PREFIX_BYTES {
            return Err(ChannelError::InvalidFrame("SECURED body shorter than 8 bytes".into()));
        }
        Ok(Self {
            buf: bytes[..HEADER_BYTES + length].to_vec(),
        })
    }

    pub fn sdu_type(&self) -> SduType {
        SduType::from_u16(u16::from_be_bytes([self.buf[0], self.buf[1]])).expect("validated at parse/allocate")
    }

    /// The `length` header field: body byte count.
    pub fn length(&self) -> u16 {
        u16::from_be_bytes([self.buf[2], self.buf[3]])
    }

    pub fn total_length(&self) -> usize {
        self.buf.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn context_index(&self) -> u16 {
        u16::from_be_bytes([self.buf[HEADER_BYTES], self.buf[HEADER_BYTES + 1]])
    }

    pub fn set_context_index(&mut self, idx: u16) {
        self.buf[HEADER_BYTES..HEADER_BYTES + 2].copy_from_slice(&idx.to_be_bytes());
    }

    /// 48-bit sequence number.
    pub fn sequence_number(&self) -> u64 {
        let b = &self.buf[HEADER_BYTES + 2..HEADER_BYTES + SECURED_PREFIX_BYTES];
        let mut out = [0u8; 8];
        out[2..].copy_from_slice(b);
        u64::from_be_bytes(out)
    }

    pub fn set_sequence_number(&mut self, seq: u64) {
        let bytes = seq.to_be_bytes();
        self.buf[HEADER_BYTES + 2..HEADER_BYTES + SECURED_PREFIX_BYTES].copy_from_slice(&bytes[2..]);
    }

    /// The portion of the body after the SECURED prefix: ciphertext || MAC.
    pub fn fragment(&self) -> &[u8] {
        &self.buf[HEADER_BYTES + SECURED_PREFIX_BYTES..]
    }

    pub fn fragment_mut(&mut self) -> &mut [u8] {
        &mut self.buf[HEADER_BYTES + SECURED_PREFIX_BYTES..]
    }

    /// Length of the ciphertext portion of `fragment`: `length - 8 -
    /// mac_len`. For a non-block-aligned message this is `round_up(n,
    /// B)`, not the original plaintext length `n` — recovering `n`
    /// exactly is the channel layer's job, not the codec's.
    pub fn message_length(&self, mac_len: usize) -> usize {
        self.length() as usize - SECURED_PREFIX_BYTES - mac_len
    }

    pub fn ciphertext(&self, mac_len: usize) -> &[u8] {
        let frag = self.fragment();
        &frag[..frag.len() - mac_len]
    }

    pub fn ciphertext_mut(&mut self, mac_len: usize) -> &mut [u8] {
        let frag = self.fragment_mut();
        let end = frag.len() - mac_len;
        &mut frag[..end]
    }

    pub fn mac(&self, mac_len: usize) -> &[u8] {
        let frag = self.fragment();
        &frag[frag.len() - mac_len..]
    }

    pub fn mac_mut(&mut self, mac_len: usize) -> &mut [u8] {
        let frag = self.fragment_mut();
        let len = frag.len();
        &mut frag[len - mac_len..]
    }

    /// Raw body bytes of a PLAIN SDU.
    pub fn plain_data(&self) -> &[u8] {
        &self.buf[HEADER_BYTES..]
    }
}
