use crate::constants::MAX_PACKET_SIZE;
use crate::error::{Error, IoResult, Result};
use crate::net::socket::Socket;
use crate::net::Network;
use crate::types::TimeToLive;
use hoptrace_packet::ipv4::Ipv4Packet;
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};
use tracing::instrument;

/// An inbound `IPv4` datagram, header included.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Datagram {
    pub bytes: Vec<u8>,
    pub source: Ipv4Addr,
}

/// A raw `ICMP` channel bound to a local interface address.
///
/// A raw `ICMP` socket receives a copy of every inbound `ICMP` datagram for the host; the channel
/// only surfaces those addressed to the interface it is bound to.
///
/// The socket is released by [`RawCaptureChannel::close`] or when the channel is dropped.
pub struct RawCaptureChannel<S: Socket> {
    interface_addr: Ipv4Addr,
    read_timeout: Duration,
    socket: Option<S>,
}

impl<S: Socket> RawCaptureChannel<S> {
    /// Open a channel on `interface_addr`.
    ///
    /// This operation requires the `CAP_NET_RAW` capability on Linux and root elsewhere.
    #[instrument(level = "trace")]
    pub fn open(interface_addr: Ipv4Addr, read_timeout: Duration) -> Result<Self> {
        let open = || -> IoResult<S> {
            let mut socket = S::new_icmp_socket_ipv4()?;
            socket.bind(SocketAddr::new(IpAddr::V4(interface_addr), 0))?;
            Ok(socket)
        };
        let socket = open().map_err(|err| Error::Open(interface_addr, err))?;
        tracing::debug!(%interface_addr, ?read_timeout, "capture channel opened");
        Ok(Self {
            interface_addr,
            read_timeout,
            socket: Some(socket),
        })
    }

    #[must_use]
    pub const fn interface_addr(&self) -> Ipv4Addr {
        self.interface_addr
    }

    #[must_use]
    pub const fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.socket.is_some()
    }

    /// Set the `ttl` of subsequently sent datagrams.
    #[instrument(skip(self), level = "trace")]
    pub fn set_outbound_ttl(&mut self, ttl: TimeToLive) -> Result<()> {
        self.socket()?.set_ttl(u32::from(ttl.0))?;
        Ok(())
    }

    #[instrument(skip(self, bytes), level = "trace")]
    pub fn send_to(&mut self, bytes: &[u8], destination: Ipv4Addr) -> Result<()> {
        self.socket()?
            .send_to(bytes, SocketAddr::new(IpAddr::V4(destination), 0))
            .map_err(Error::Send)
    }

    /// Wait up to the configured read timeout for the next datagram.
    pub fn receive(&mut self) -> Result<Option<Datagram>> {
        self.receive_within(self.read_timeout)
    }

    /// Wait up to `timeout` for the next datagram addressed to the interface.
    ///
    /// Returns `Ok(None)` if nothing arrives in time.
    #[instrument(skip(self), level = "trace")]
    pub fn receive_within(&mut self, timeout: Duration) -> Result<Option<Datagram>> {
        let deadline = Instant::now() + timeout;
        let interface_addr = self.interface_addr;
        let socket = self.socket()?;
        let mut buf = [0_u8; MAX_PACKET_SIZE];
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match socket.is_readable(remaining) {
                Ok(true) => {}
                Ok(false) => return Ok(None),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(Error::Receive(err)),
            }
            let (bytes_read, addr) = match socket.recv_from(&mut buf) {
                Ok(read) => read,
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => continue,
                Err(err) => return Err(Error::Receive(err)),
            };
            if let Some(datagram) = accept(&buf[..bytes_read], addr, interface_addr) {
                return Ok(Some(datagram));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
        }
    }

    /// Release the socket.
    ///
    /// Closing an already closed channel does nothing.
    pub fn close(&mut self) {
        if self.socket.take().is_some() {
            tracing::debug!(interface_addr = %self.interface_addr, "capture channel closed");
        }
    }

    fn socket(&mut self) -> Result<&mut S> {
        self.socket.as_mut().ok_or(Error::Closed)
    }
}

impl<S: Socket> Drop for RawCaptureChannel<S> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<S: Socket> Network for RawCaptureChannel<S> {
    fn interface_addr(&self) -> Ipv4Addr {
        self.interface_addr
    }

    fn set_outbound_ttl(&mut self, ttl: TimeToLive) -> Result<()> {
        Self::set_outbound_ttl(self, ttl)
    }

    fn send_to(&mut self, bytes: &[u8], destination: Ipv4Addr) -> Result<()> {
        Self::send_to(self, bytes, destination)
    }

    fn receive_within(&mut self, timeout: Duration) -> Result<Option<Datagram>> {
        Self::receive_within(self, timeout)
    }

    fn close(&mut self) {
        Self::close(self);
    }
}

/// Keep a received datagram only if it is a well formed `IPv4` datagram for `interface_addr`.
fn accept(bytes: &[u8], addr: Option<SocketAddr>, interface_addr: Ipv4Addr) -> Option<Datagram> {
    let Ok(ipv4) = Ipv4Packet::new_view(bytes) else {
        tracing::trace!(len = bytes.len(), "discarding truncated datagram");
        return None;
    };
    let destination = ipv4.get_destination();
    if destination != interface_addr {
        tracing::trace!(%destination, "discarding datagram for another interface");
        return None;
    }
    let source = match addr {
        Some(SocketAddr::V4(addr)) => *addr.ip(),
        _ => ipv4.get_source(),
    };
    Some(Datagram {
        bytes: bytes.to_vec(),
        source,
    })
}
