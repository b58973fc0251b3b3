//! A minimal blocking WHOIS client.
//!
//! Each lookup first asks the root registry (`whois.iana.org`) which WHOIS
//! server is authoritative for an address and then queries that server for
//! the network name, origin autonomous system and country of the address.
//!
//! Addresses within the private ranges (see [`is_private`]) are not known to
//! any registry and should not be looked up.
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! # use std::net::Ipv4Addr;
//! use hoptrace_whois::{is_private, Whois};
//!
//! let addr = Ipv4Addr::new(8, 8, 8, 8);
//! if !is_private(addr) {
//!     let info = Whois::default().lookup(addr)?;
//!     println!("{addr} belongs to {info}");
//! }
//! # Ok(())
//! # }
//! ```
#![forbid(unsafe_code)]

mod client;
mod info;
mod range;

pub use client::{Error, Result, Whois, DEFAULT_PORT, DEFAULT_ROOT_SERVER, DEFAULT_TIMEOUT};
pub use info::{parse_referral, WhoisInfo};
pub use range::is_private;
