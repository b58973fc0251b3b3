use std::fmt::{Display, Formatter};
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use thiserror::Error;

/// A tracer error result.
pub type Result<T> = std::result::Result<T, Error>;

/// A tracer error.
#[derive(Error, Debug)]
pub enum Error {
    /// The capture channel could not be created or bound.
    #[error("failed to open capture channel on {0}: {1}")]
    Open(Ipv4Addr, IoError),
    /// A probe could not be sent.
    #[error("failed to send probe: {0}")]
    Send(IoError),
    /// Waiting for or reading an inbound datagram failed.
    #[error("failed to receive: {0}")]
    Receive(IoError),
    /// The capture channel was used after it was closed.
    #[error("capture channel is closed")]
    Closed,
    #[error("invalid config: {0}")]
    BadConfig(String),
    #[error("invalid packet: {0}")]
    PacketError(#[from] hoptrace_packet::error::Error),
    #[error("IO error: {0}")]
    IoError(#[from] IoError),
}

/// Custom IO error result.
pub type IoResult<T> = std::result::Result<T, IoError>;

/// Custom IO error.
#[derive(Error, Debug)]
pub enum IoError {
    #[error("Bind error for {1}: {0}")]
    Bind(io::Error, SocketAddr),
    #[error("Sendto error for {1}: {0}")]
    SendTo(io::Error, SocketAddr),
    #[error("Failed to {1}: {0}")]
    Other(io::Error, IoOperation),
}

impl IoError {
    /// The kind of the underlying [`io::Error`].
    #[must_use]
    pub fn kind(&self) -> io::ErrorKind {
        match self {
            Self::Bind(e, _) | Self::SendTo(e, _) | Self::Other(e, _) => e.kind(),
        }
    }
}

/// Io operation.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum IoOperation {
    NewSocket,
    SetNonBlocking,
    SetTtl,
    Select,
    RecvFrom,
    InterfaceAddrs,
}

impl Display for IoOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NewSocket => write!(f, "create new socket"),
            Self::SetNonBlocking => write!(f, "set non-blocking"),
            Self::SetTtl => write!(f, "set TTL"),
            Self::Select => write!(f, "select"),
            Self::RecvFrom => write!(f, "recv from"),
            Self::InterfaceAddrs => write!(f, "list interface addresses"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_kind() {
        let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, 0));
        let err = IoError::Bind(io::Error::from(io::ErrorKind::AddrNotAvailable), addr);
        assert_eq!(io::ErrorKind::AddrNotAvailable, err.kind());
        let err = IoError::Other(
            io::Error::from(io::ErrorKind::WouldBlock),
            IoOperation::RecvFrom,
        );
        assert_eq!(io::ErrorKind::WouldBlock, err.kind());
    }

    #[test]
    fn test_display() {
        let err = Error::Open(
            Ipv4Addr::new(10, 0, 0, 2),
            IoError::Other(
                io::Error::from(io::ErrorKind::PermissionDenied),
                IoOperation::NewSocket,
            ),
        );
        assert_eq!(
            "failed to open capture channel on 10.0.0.2: Failed to create new socket: permission denied",
            err.to_string()
        );
    }
}
