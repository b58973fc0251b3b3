use crate::error::Result;
use crate::net::channel::{Datagram, RawCaptureChannel};
use crate::net::{Network, SocketImpl};
use crate::probe::{Hop, Probe};
use crate::types::{Sequence, TimeToLive, TraceId};
use hoptrace_packet::message::{encode_echo_request, IcmpMessage};
use std::net::Ipv4Addr;
use std::time::{Duration, Instant};
use tracing::instrument;

/// A TTL sweep traceroute over raw `ICMP` echo requests.
///
/// Use the [`crate::Builder`] type to create a [`Tracer`].
///
/// # Example
///
/// ```no_run
/// # fn main() -> anyhow::Result<()> {
/// use hoptrace_core::Builder;
/// use std::net::Ipv4Addr;
///
/// let tracer = Builder::new(Ipv4Addr::new(192, 168, 1, 21), Ipv4Addr::new(1, 1, 1, 1))
///     .max_ttl(30)
///     .build()?;
/// for hop in tracer.trace()? {
///     println!("{hop}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Tracer {
    interface_addr: Ipv4Addr,
    target_addr: Ipv4Addr,
    max_ttl: TimeToLive,
    read_timeout: Duration,
    trace_identifier: TraceId,
    initial_sequence: Sequence,
}

impl Tracer {
    #[must_use]
    pub(crate) const fn new(
        interface_addr: Ipv4Addr,
        target_addr: Ipv4Addr,
        max_ttl: TimeToLive,
        read_timeout: Duration,
        trace_identifier: TraceId,
        initial_sequence: Sequence,
    ) -> Self {
        Self {
            interface_addr,
            target_addr,
            max_ttl,
            read_timeout,
            trace_identifier,
            initial_sequence,
        }
    }

    /// Open a capture channel on the interface and start a trace over it.
    ///
    /// Nothing is sent until the returned [`Trace`] is polled.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Open`] if the channel cannot be opened, typically because the
    /// process lacks the privileges required for raw sockets.
    #[instrument(skip(self), level = "trace")]
    pub fn trace(&self) -> Result<Trace<RawCaptureChannel<SocketImpl>>> {
        let channel = RawCaptureChannel::open(self.interface_addr, self.read_timeout)?;
        Ok(self.trace_with(channel))
    }

    /// Start a trace over the given network.
    #[must_use]
    pub fn trace_with<N: Network>(&self, network: N) -> Trace<N> {
        Trace::new(self.clone(), network)
    }

    #[must_use]
    pub const fn interface_addr(&self) -> Ipv4Addr {
        self.interface_addr
    }

    #[must_use]
    pub const fn target_addr(&self) -> Ipv4Addr {
        self.target_addr
    }

    #[must_use]
    pub const fn max_ttl(&self) -> TimeToLive {
        self.max_ttl
    }

    #[must_use]
    pub const fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    #[must_use]
    pub const fn trace_identifier(&self) -> TraceId {
        self.trace_identifier
    }

    #[must_use]
    pub const fn initial_sequence(&self) -> Sequence {
        self.initial_sequence
    }
}

/// A running trace, yielding one [`Hop`] per `ttl` in ascending order.
///
/// Each call to `next` sends a single probe and waits at most the read timeout for its answer.
/// The trace ends after the hop at which the target answered or after the maximum `ttl`,
/// whichever comes first, and the network is closed at that point. Dropping the trace early
/// stops it without sending anything further.
pub struct Trace<N: Network> {
    tracer: Tracer,
    network: N,
    ttl: TimeToLive,
    sequence: Sequence,
    finished: bool,
}

impl<N: Network> Trace<N> {
    fn new(tracer: Tracer, network: N) -> Self {
        tracing::debug!(?tracer, "starting trace");
        let sequence = tracer.initial_sequence;
        Self {
            tracer,
            network,
            ttl: TimeToLive(1),
            sequence,
            finished: false,
        }
    }

    fn next_probe(&mut self) -> Probe {
        let probe = Probe::new(self.tracer.trace_identifier, self.sequence, self.ttl);
        self.sequence = self.sequence.next();
        probe
    }

    /// Send `probe` and wait for its answer, returning the address of the responder.
    ///
    /// A failed send or receive is reported as no answer.
    #[instrument(skip(self), level = "trace")]
    fn probe_hop(&mut self, probe: Probe) -> Option<Ipv4Addr> {
        if let Err(err) = self.send_probe(probe) {
            tracing::warn!(%err, ?probe, "failed to send probe");
            return None;
        }
        let deadline = Instant::now() + self.tracer.read_timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }
            match self.network.receive_within(remaining) {
                Ok(Some(datagram)) => {
                    if let Some(addr) = self.answer_from(probe, &datagram) {
                        return Some(addr);
                    }
                }
                Ok(None) => return None,
                Err(err) => {
                    tracing::warn!(%err, ?probe, "failed to receive");
                    return None;
                }
            }
        }
    }

    fn send_probe(&mut self, probe: Probe) -> Result<()> {
        tracing::debug!(?probe, "sending probe");
        let bytes = encode_echo_request(probe.identifier.0, probe.sequence.0)?;
        self.network.set_outbound_ttl(probe.ttl)?;
        self.network.send_to(&bytes, self.tracer.target_addr)
    }

    /// The source of `datagram` if it answers `probe`.
    fn answer_from(&self, probe: Probe, datagram: &Datagram) -> Option<Ipv4Addr> {
        if datagram.source == self.network.interface_addr() {
            tracing::trace!(source = %datagram.source, "ignoring datagram from own interface");
            return None;
        }
        let Some(message) = IcmpMessage::decode_ipv4(&datagram.bytes) else {
            tracing::trace!(source = %datagram.source, "ignoring undecodable datagram");
            return None;
        };
        if message.is_answer_to(probe.identifier.0, probe.sequence.0) {
            tracing::debug!(source = %datagram.source, ?message, "received answer");
            Some(datagram.source)
        } else {
            tracing::trace!(source = %datagram.source, ?message, "ignoring unrelated message");
            None
        }
    }

    fn finish(&mut self) {
        self.finished = true;
        self.network.close();
    }
}

impl<N: Network> Iterator for Trace<N> {
    type Item = Hop;

    fn next(&mut self) -> Option<Hop> {
        if self.finished {
            return None;
        }
        let probe = self.next_probe();
        let addr = self.probe_hop(probe);
        let hop = Hop::new(probe.ttl, addr);
        tracing::debug!(%hop);
        if addr == Some(self.tracer.target_addr) || probe.ttl >= self.tracer.max_ttl {
            self.finish();
        } else {
            self.ttl += TimeToLive(1);
        }
        Some(hop)
    }
}
