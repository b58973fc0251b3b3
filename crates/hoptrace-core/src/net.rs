use crate::error::Result;
use crate::net::channel::Datagram;
use crate::types::TimeToLive;
use std::net::Ipv4Addr;
use std::time::Duration;

/// Platform specific network code.
pub mod platform;

/// A network socket.
pub mod socket;

/// A channel for sending probes and capturing replies.
pub mod channel;

/// The platform specific socket type.
pub use platform::{PlatformImpl, SocketImpl};

/// An abstraction over a capture channel for tracing.
#[cfg_attr(test, mockall::automock)]
pub trait Network {
    /// The local address probes are sent from and replies are captured on.
    fn interface_addr(&self) -> Ipv4Addr;

    /// Set the `ttl` of subsequently sent datagrams.
    fn set_outbound_ttl(&mut self, ttl: TimeToLive) -> Result<()>;

    /// Send `bytes` as the `ICMP` payload of an `IPv4` datagram to `destination`.
    fn send_to(&mut self, bytes: &[u8], destination: Ipv4Addr) -> Result<()>;

    /// Wait up to `timeout` for the next inbound datagram.
    ///
    /// Returns `None` if the wait times out.
    fn receive_within(&mut self, timeout: Duration) -> Result<Option<Datagram>>;

    /// Release the underlying socket.
    fn close(&mut self);
}
