use crate::info::{parse_referral, WhoisInfo};
use std::io::{ErrorKind, Read, Write};
use std::net::{Ipv4Addr, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;
use thiserror::Error;
use tracing::instrument;

/// The root registry which refers queries to the authoritative server.
pub const DEFAULT_ROOT_SERVER: &str = "whois.iana.org";

/// The WHOIS port.
pub const DEFAULT_PORT: u16 = 43;

/// The default connect, write and read timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// The largest response accepted from a server.
const MAX_RESPONSE_SIZE: usize = 64 * 1024;

/// A WHOIS error result.
pub type Result<T> = std::result::Result<T, Error>;

/// A WHOIS error.
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to resolve WHOIS server {0}: {1}")]
    Resolve(String, std::io::Error),
    #[error("WHOIS server {0} did not resolve to any address")]
    NoAddress(String),
    #[error("failed to connect to WHOIS server {0}: {1}")]
    Connect(SocketAddr, std::io::Error),
    #[error("failed to query WHOIS server {0}: {1}")]
    Query(SocketAddr, std::io::Error),
}

/// A blocking WHOIS client.
#[derive(Debug, Clone)]
pub struct Whois {
    root_server: String,
    port: u16,
    timeout: Duration,
}

impl Default for Whois {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT_SERVER, DEFAULT_PORT, DEFAULT_TIMEOUT)
    }
}

impl Whois {
    /// Create a client which starts each lookup at `root_server`.
    ///
    /// The `port` is used for both the root and the referred server.
    #[must_use]
    pub fn new(root_server: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            root_server: root_server.into(),
            port,
            timeout,
        }
    }

    /// Lookup the registration details of `addr`.
    ///
    /// If the root server does not refer the address to another server then
    /// every field of the returned [`WhoisInfo`] is `None`.
    #[instrument(skip(self), level = "debug")]
    pub fn lookup(&self, addr: Ipv4Addr) -> Result<WhoisInfo> {
        let response = self.query(&self.root_server, addr)?;
        let Some(server) = parse_referral(&response) else {
            tracing::debug!(root_server = %self.root_server, "no referral");
            return Ok(WhoisInfo::default());
        };
        tracing::debug!(server, "referred");
        let response = self.query(server, addr)?;
        Ok(WhoisInfo::parse(&response))
    }

    /// Send `addr` to `server` and read the response until the server closes
    /// the connection or the read times out.
    #[instrument(skip(self), level = "trace")]
    fn query(&self, server: &str, addr: Ipv4Addr) -> Result<String> {
        let server_addr = (server, self.port)
            .to_socket_addrs()
            .map_err(|err| Error::Resolve(server.to_string(), err))?
            .find(SocketAddr::is_ipv4)
            .ok_or_else(|| Error::NoAddress(server.to_string()))?;
        let mut stream = TcpStream::connect_timeout(&server_addr, self.timeout)
            .map_err(|err| Error::Connect(server_addr, err))?;
        stream
            .set_read_timeout(Some(self.timeout))
            .and_then(|()| stream.set_write_timeout(Some(self.timeout)))
            .and_then(|()| stream.write_all(format!("{addr}\r\n").as_bytes()))
            .map_err(|err| Error::Query(server_addr, err))?;
        let bytes = read_response(&mut stream).map_err(|err| Error::Query(server_addr, err))?;
        tracing::trace!(%server_addr, len = bytes.len(), "response");
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Read until EOF, a read timeout or `MAX_RESPONSE_SIZE` bytes.
fn read_response(stream: &mut impl Read) -> std::io::Result<Vec<u8>> {
    let mut response = Vec::new();
    let mut buf = [0_u8; 4096];
    while response.len() < MAX_RESPONSE_SIZE {
        match stream.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => response.extend_from_slice(&buf[..n]),
            Err(err) if err.kind() == ErrorKind::Interrupted => {}
            Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => break,
            Err(err) => return Err(err),
        }
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Yields its chunks one read at a time and then fails with `kind`.
    struct ChunkedReader {
        chunks: Vec<&'static [u8]>,
        kind: Option<ErrorKind>,
    }

    impl Read for ChunkedReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.chunks.is_empty() {
                return match self.kind {
                    Some(kind) => Err(std::io::Error::from(kind)),
                    None => Ok(0),
                };
            }
            let chunk = self.chunks.remove(0);
            buf[..chunk.len()].copy_from_slice(chunk);
            Ok(chunk.len())
        }
    }

    #[test]
    fn test_read_until_eof() -> anyhow::Result<()> {
        let mut reader = Cursor::new(b"netname: TEST\r\n".to_vec());
        assert_eq!(b"netname: TEST\r\n".to_vec(), read_response(&mut reader)?);
        Ok(())
    }

    #[test]
    fn test_read_until_timeout() -> anyhow::Result<()> {
        let mut reader = ChunkedReader {
            chunks: vec![b"netname: ", b"TEST\r\n"],
            kind: Some(ErrorKind::WouldBlock),
        };
        assert_eq!(b"netname: TEST\r\n".to_vec(), read_response(&mut reader)?);
        Ok(())
    }

    #[test]
    fn test_read_timeout_without_data() -> anyhow::Result<()> {
        let mut reader = ChunkedReader {
            chunks: vec![],
            kind: Some(ErrorKind::TimedOut),
        };
        assert!(read_response(&mut reader)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_read_other_error() {
        let mut reader = ChunkedReader {
            chunks: vec![b"netname: "],
            kind: Some(ErrorKind::ConnectionReset),
        };
        let err = read_response(&mut reader).unwrap_err();
        assert_eq!(ErrorKind::ConnectionReset, err.kind());
    }

    #[test]
    fn test_read_response_is_bounded() -> anyhow::Result<()> {
        let mut reader = Cursor::new(vec![b'x'; MAX_RESPONSE_SIZE * 2]);
        let response = read_response(&mut reader)?;
        assert!(response.len() >= MAX_RESPONSE_SIZE);
        assert!(response.len() < MAX_RESPONSE_SIZE + 4096);
        Ok(())
    }
}
