//! hoptrace - raw `ICMP` network path discovery.
//!
//! This crate sends `ICMPv4` echo requests with an increasing IP time-to-live and reports, for each
//! `ttl`, the router which answered with a time exceeded message, or the target once it answers
//! with an echo reply.
//!
//! One probe is outstanding at a time and each hop waits at most the configured read timeout.
//! Opening the raw socket requires the `CAP_NET_RAW` capability on Linux or root elsewhere.
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! use hoptrace_core::Builder;
//! use std::net::Ipv4Addr;
//!
//! let interface_addr = Ipv4Addr::new(192, 168, 1, 21);
//! let target_addr = Ipv4Addr::new(93, 184, 216, 34);
//! for hop in Builder::new(interface_addr, target_addr).build()?.trace()? {
//!     println!("{hop}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # See Also
//!
//! - [`Builder`] - Build a [`Tracer`].
//! - [`Tracer::trace`] - Open a capture channel and trace over it.
//! - [`Tracer::trace_with`] - Trace over any [`Network`].

mod builder;
mod config;
mod constants;
mod error;
mod net;
mod probe;
mod tracer;
mod types;

pub use builder::Builder;
pub use config::defaults;
pub use constants::{MAX_PACKET_SIZE, MAX_TTL};
pub use error::{Error, IoError, IoOperation, IoResult, Result};
pub use net::channel::{Datagram, RawCaptureChannel};
pub use net::platform::Platform;
pub use net::socket::Socket;
pub use net::{Network, PlatformImpl, SocketImpl};
pub use probe::{Hop, Probe};
pub use tracer::{Trace, Tracer};
pub use types::{Sequence, TimeToLive, TraceId};
