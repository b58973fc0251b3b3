use anyhow::anyhow;
use clap::ValueEnum;
use hoptrace_core::{defaults, MAX_TTL};
use hoptrace_privilege::Privilege;
use itertools::Itertools;
use std::net::Ipv4Addr;
use std::time::Duration;

mod cmd;
mod constants;

pub use cmd::Args;
pub use constants::*;

/// How to format log data.
#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
pub enum LogFormat {
    /// Display log data in a compact format.
    Compact,
    /// Display log data in a pretty format.
    Pretty,
    /// Display log data in a json format.
    Json,
}

/// How to log event spans.
#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
pub enum LogSpanEvents {
    /// Do not display event spans.
    Off,
    /// Display enter and exit event spans.
    Active,
    /// Display all event spans.
    Full,
}

/// Fully parsed and validated configuration.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TraceConfig {
    pub interface_addr: Ipv4Addr,
    pub target: String,
    pub max_ttl: u8,
    pub read_timeout: Duration,
    pub whois: bool,
    pub verbose: bool,
    pub log_format: LogFormat,
    pub log_filter: String,
    pub log_span_events: LogSpanEvents,
}

impl TraceConfig {
    /// Validate the command line arguments.
    ///
    /// The `interface_addr` must be one of `interface_addrs`.
    pub fn build_config(
        args: Args,
        privilege: &Privilege,
        interface_addrs: &[Ipv4Addr],
    ) -> anyhow::Result<Self> {
        let max_ttl = args.depth.unwrap_or(u16::from(defaults::DEFAULT_MAX_TTL));
        let read_timeout = args.timeout.unwrap_or(defaults::DEFAULT_READ_TIMEOUT);
        validate_privilege(privilege.has_privileges())?;
        validate_interface_addr(args.interface_addr, interface_addrs)?;
        let max_ttl = validate_depth(max_ttl)?;
        validate_read_timeout(read_timeout)?;
        Ok(Self {
            interface_addr: args.interface_addr,
            target: args.target,
            max_ttl,
            read_timeout,
            whois: !args.no_whois,
            verbose: args.verbose,
            log_format: args.log_format.unwrap_or(DEFAULT_LOG_FORMAT),
            log_filter: args
                .log_filter
                .unwrap_or_else(|| String::from(DEFAULT_LOG_FILTER)),
            log_span_events: args.log_span_events.unwrap_or(DEFAULT_LOG_SPAN_EVENTS),
        })
    }
}

fn validate_privilege(has_privileges: bool) -> anyhow::Result<()> {
    if has_privileges {
        Ok(())
    } else {
        Err(anyhow!(
            "privileges are required (hint: run as root or grant the CAP_NET_RAW capability)"
        ))
    }
}

/// Validate that `interface_addr` is assigned to a local interface.
fn validate_interface_addr(
    interface_addr: Ipv4Addr,
    interface_addrs: &[Ipv4Addr],
) -> anyhow::Result<()> {
    if interface_addrs.contains(&interface_addr) {
        Ok(())
    } else {
        Err(anyhow!(
            "interface-addr ({interface_addr}) is not a local interface address (available: {})",
            interface_addrs.iter().join(", ")
        ))
    }
}

/// Validate `depth` and narrow it to a `ttl`.
fn validate_depth(depth: u16) -> anyhow::Result<u8> {
    match u8::try_from(depth) {
        Ok(max_ttl) if (1..=MAX_TTL).contains(&max_ttl) => Ok(max_ttl),
        _ => Err(anyhow!("depth ({depth}) must be in the range 1..{MAX_TTL}")),
    }
}

/// Validate `read_timeout`.
fn validate_read_timeout(read_timeout: Duration) -> anyhow::Result<()> {
    if read_timeout.is_zero() {
        Err(anyhow!(
            "timeout ({read_timeout:?}) must be greater than zero"
        ))
    } else {
        Ok(())
    }
}
