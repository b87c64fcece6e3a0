//! # sechan
//!
//! A unidirectional secure datagram channel over UDP: counter-mode
//! encryption built on a raw block cipher, keyed HMAC for integrity,
//! keys derived from a pre-shared master key. No handshake, no replay
//! window, no reliability — see [`channel`] for the send/receive state
//! machines and [`profile`] for what a channel needs to get started.
//!
//! ## Quick start
//!
//! ```no_run
//! use sechan::channel::{ReceiverChannel, SenderChannel};
//! use sechan::profile::Profile;
//!
//! let profile = Profile::load_and_validate("sechan.cfg").unwrap();
//! let mut sender = SenderChannel::new(&profile, b"5000", b"5001");
//! let mut receiver = ReceiverChannel::new(&profile, b"5001", b"5000");
//!
//! let wire = sender.send(b"hello\n");
//! let plaintext = receiver.receive(&wire).unwrap();
//! assert_eq!(plaintext, b"hello\n");
//! ```
//!
//! ## What's NOT provided
//!
//! Key negotiation, replay protection, reliability, fragmentation
//! across datagrams, and mutual authentication handshakes are out of
//! scope — see the module docs on [`channel`] for the exact non-goals.

#![deny(unsafe_code)]

pub mod algorithms;
pub mod channel;
pub mod cli;
pub mod context;
pub mod error;
pub mod kdf;
pub mod profile;
pub mod transform;
pub mod transport;
pub mod wire;

pub use channel::{ReceiverChannel, SenderChannel};
pub use context::Context;
pub use error::ChannelError;
pub use profile::Profile;
pub use wire::{Sdu, SduType};
