use crate::types::{Sequence, TimeToLive, TraceId};
use std::fmt::{Display, Formatter};
use std::net::Ipv4Addr;

/// An echo request probe, created immediately before it is sent.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Probe {
    /// The identifier shared by every probe of a trace.
    pub identifier: TraceId,
    /// The sequence number, unique within a trace unless it wraps.
    pub sequence: Sequence,
    /// The outbound time-to-live.
    pub ttl: TimeToLive,
}

impl Probe {
    #[must_use]
    pub const fn new(identifier: TraceId, sequence: Sequence, ttl: TimeToLive) -> Self {
        Self {
            identifier,
            sequence,
            ttl,
        }
    }
}

/// The outcome of probing a single `ttl`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Hop {
    pub ttl: TimeToLive,
    /// The responding host, or `None` if nothing answered within the hop budget.
    pub addr: Option<Ipv4Addr>,
}

impl Hop {
    #[must_use]
    pub const fn new(ttl: TimeToLive, addr: Option<Ipv4Addr>) -> Self {
        Self { ttl, addr }
    }
}

impl Display for Hop {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.addr {
            Some(addr) => write!(f, "{}. {addr}", self.ttl),
            None => write!(f, "{}. *", self.ttl),
        }
    }
}
