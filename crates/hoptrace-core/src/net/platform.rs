use crate::error::Result;
use std::net::Ipv4Addr;

#[cfg(unix)]
mod unix;

#[cfg(unix)]
pub use unix::*;

/// Platform specific operations.
pub trait Platform {
    /// The `IPv4` addresses assigned to the local network interfaces.
    fn interface_addrs() -> Result<Vec<Ipv4Addr>>;
}
