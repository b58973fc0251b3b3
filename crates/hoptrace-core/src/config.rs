/// Default values for configuration.
pub mod defaults {
    use std::time::Duration;

    /// The default value for `max-ttl` (the trace depth).
    pub const DEFAULT_MAX_TTL: u8 = 15;

    /// The default per-hop budget for awaiting a reply.
    pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(2);

    /// The default echo request identifier.
    pub const DEFAULT_TRACE_IDENTIFIER: u16 = 0;

    /// The default sequence number of the first probe.
    pub const DEFAULT_INITIAL_SEQUENCE: u16 = 16;
}
