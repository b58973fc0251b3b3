use crate::config::{LogFormat, LogSpanEvents};
use clap::Parser;
use std::net::Ipv4Addr;
use std::time::Duration;

/// Trace the route to a host over ICMP and describe every hop
#[derive(Parser, Debug)]
#[command(name = "hoptrace", author, version, about, long_about = None, arg_required_else_help(true))]
pub struct Args {
    /// The IPv4 address of the local interface to probe from
    pub interface_addr: Ipv4Addr,

    /// The IPv4 address or hostname to trace
    pub target: String,

    /// The maximum number of hops to probe [default: 15]
    pub depth: Option<u16>,

    /// How long to wait for the answer to each probe [default: 2s]
    #[arg(short = 't', long, value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Do not lookup WHOIS details of each hop
    #[arg(long)]
    pub no_whois: bool,

    /// The debug log format [default: pretty]
    #[arg(value_enum, long)]
    pub log_format: Option<LogFormat>,

    /// The debug log filter [default: hoptrace=debug]
    #[arg(long)]
    pub log_filter: Option<String>,

    /// The debug log span events [default: off]
    #[arg(value_enum, long)]
    pub log_span_events: Option<LogSpanEvents>,

    /// Enable verbose debug logging
    #[arg(short = 'v', long, default_value_t = false)]
    pub verbose: bool,
}

fn parse_duration(value: &str) -> anyhow::Result<Duration> {
    Ok(humantime::parse_duration(value)?)
}
