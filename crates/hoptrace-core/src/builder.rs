use crate::config::defaults;
use crate::constants::MAX_TTL;
use crate::error::{Error, Result};
use crate::types::{Sequence, TimeToLive, TraceId};
use crate::Tracer;
use std::net::Ipv4Addr;
use std::time::Duration;

/// Build a tracer.
///
/// # Examples
///
/// ```no_run
/// # fn main() -> anyhow::Result<()> {
/// use hoptrace_core::Builder;
/// use std::net::Ipv4Addr;
/// use std::time::Duration;
///
/// let tracer = Builder::new(Ipv4Addr::new(192, 168, 1, 21), Ipv4Addr::new(1, 1, 1, 1))
///     .max_ttl(20)
///     .read_timeout(Duration::from_millis(500))
///     .trace_identifier(std::process::id() as u16)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Builder {
    interface_addr: Ipv4Addr,
    target_addr: Ipv4Addr,
    max_ttl: TimeToLive,
    read_timeout: Duration,
    trace_identifier: TraceId,
    initial_sequence: Sequence,
}

impl Builder {
    /// Build a tracer builder which probes `target_addr` from `interface_addr`.
    #[must_use]
    pub const fn new(interface_addr: Ipv4Addr, target_addr: Ipv4Addr) -> Self {
        Self {
            interface_addr,
            target_addr,
            max_ttl: TimeToLive(defaults::DEFAULT_MAX_TTL),
            read_timeout: defaults::DEFAULT_READ_TIMEOUT,
            trace_identifier: TraceId(defaults::DEFAULT_TRACE_IDENTIFIER),
            initial_sequence: Sequence(defaults::DEFAULT_INITIAL_SEQUENCE),
        }
    }

    /// Set the maximum `ttl`, the depth of the trace.
    #[must_use]
    pub fn max_ttl(self, max_ttl: u8) -> Self {
        Self {
            max_ttl: TimeToLive(max_ttl),
            ..self
        }
    }

    /// Set how long to wait for the answer to each probe.
    #[must_use]
    pub fn read_timeout(self, read_timeout: Duration) -> Self {
        Self {
            read_timeout,
            ..self
        }
    }

    /// Set the echo request identifier shared by every probe.
    #[must_use]
    pub fn trace_identifier(self, trace_id: u16) -> Self {
        Self {
            trace_identifier: TraceId(trace_id),
            ..self
        }
    }

    /// Set the sequence number of the first probe.
    #[must_use]
    pub fn initial_sequence(self, initial_sequence: u16) -> Self {
        Self {
            initial_sequence: Sequence(initial_sequence),
            ..self
        }
    }

    /// Build the [`Tracer`].
    ///
    /// # Errors
    ///
    /// This function will return `Error::BadConfig` if the configuration is invalid.
    pub fn build(self) -> Result<Tracer> {
        if self.max_ttl.0 == 0 {
            return Err(Error::BadConfig("max_ttl must be at least 1".to_string()));
        }
        if self.max_ttl.0 > MAX_TTL {
            return Err(Error::BadConfig(format!(
                "max_ttl {} > {MAX_TTL}",
                self.max_ttl.0
            )));
        }
        if self.read_timeout.is_zero() {
            return Err(Error::BadConfig(
                "read_timeout must be greater than zero".to_string(),
            ));
        }
        Ok(Tracer::new(
            self.interface_addr,
            self.target_addr,
            self.max_ttl,
            self.read_timeout,
            self.trace_identifier,
            self.initial_sequence,
        ))
    }
}
