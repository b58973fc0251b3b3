//! `ICMPv4` and `IPv4` wire format parsing and building.
//!
//! Zero-copy views over byte buffers are provided for:
//! - `IPv4` headers
//! - `ICMPv4` echo request, echo reply and time exceeded messages
//!
//! On top of these, [`message::IcmpMessage`] decodes a received message into an owned value,
//! including the original probe quoted inside a time exceeded message, and encodes echo request
//! probes.
//!
//! # Endianness
//!
//! The internal representation is held in network byte order (big-endian) and
//! all accessor methods take and return data in host byte order, converting as
//! necessary for the given architecture.
//!
//! # Example
//!
//! The following example builds an echo request probe and decodes it again:
//!
//! ```rust
//! # fn main() -> anyhow::Result<()> {
//! use hoptrace_packet::checksum::is_valid;
//! use hoptrace_packet::message::{encode_echo_request, IcmpMessage};
//!
//! let bytes = encode_echo_request(1234, 10)?;
//! assert_eq!(&bytes[..8], &hex_literal::hex!("08 00 72 44 04 d2 00 0a"));
//! assert!(is_valid(&bytes));
//! assert_eq!(
//!     Some(IcmpMessage::EchoRequest {
//!         identifier: 1234,
//!         sequence: 10
//!     }),
//!     IcmpMessage::decode(&bytes)
//! );
//! # Ok(())
//! # }
//! ```
#![forbid(unsafe_code)]

mod buffer;

/// Packet errors.
pub mod error;

/// Functions for calculating network checksums.
pub mod checksum;

/// `ICMPv4` packets.
pub mod icmpv4;

/// `IPv4` packets.
pub mod ipv4;

/// Decoded `ICMPv4` messages.
pub mod message;

/// The IP packet next layer protocol.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum IpProtocol {
    Icmp,
    Other(u8),
}

impl IpProtocol {
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Self::Icmp => 1,
            Self::Other(id) => id,
        }
    }
}

impl From<u8> for IpProtocol {
    fn from(id: u8) -> Self {
        match id {
            1 => Self::Icmp,
            p => Self::Other(p),
        }
    }
}

/// Format a payload as a hexadecimal string.
#[must_use]
pub fn fmt_payload(bytes: &[u8]) -> String {
    use itertools::Itertools as _;
    format!("{:02x}", bytes.iter().format(" "))
}
