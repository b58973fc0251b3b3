use crate::config::{LogFormat, LogSpanEvents, TraceConfig};
use crate::report;
use anyhow::anyhow;
use hoptrace_core::Builder;
use hoptrace_privilege::Privilege;
use hoptrace_whois::{is_private, Whois};
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;
use tracing_subscriber::fmt::format::FmtSpan;

/// Run the hoptrace application.
pub fn run_hoptrace(cfg: &TraceConfig, pid: u16) -> anyhow::Result<()> {
    configure_logging(cfg);
    let target_addr = resolve_target(&cfg.target)?;
    let tracer = Builder::new(cfg.interface_addr, target_addr)
        .max_ttl(cfg.max_ttl)
        .read_timeout(cfg.read_timeout)
        .trace_identifier(pid)
        .build()?;
    let trace = tracer.trace()?;
    Privilege::drop_privileges()?;
    let whois = cfg.whois.then(Whois::default);
    report::report(
        trace,
        |addr| describe(whois.as_ref(), addr),
        &mut std::io::stdout().lock(),
    )
}

/// Describe a responding host.
///
/// Private addresses are described as `local`, other addresses by their WHOIS
/// details if enabled.
fn describe(whois: Option<&Whois>, addr: Ipv4Addr) -> Option<String> {
    if is_private(addr) {
        return Some(String::from("local"));
    }
    match whois?.lookup(addr) {
        Ok(info) => Some(info.to_string()),
        Err(err) => {
            tracing::warn!(%addr, %err, "whois lookup failed");
            Some(String::new())
        }
    }
}

/// Resolve the target to an `IPv4` address.
fn resolve_target(target: &str) -> anyhow::Result<Ipv4Addr> {
    if let Ok(addr) = Ipv4Addr::from_str(target) {
        return Ok(addr);
    }
    dns_lookup::lookup_host(target)
        .map_err(|err| anyhow!("failed to resolve target: {target} ({err})"))?
        .into_iter()
        .find_map(|addr| match addr {
            IpAddr::V4(addr) => Some(addr),
            IpAddr::V6(_) => None,
        })
        .ok_or_else(|| anyhow!("failed to find an IPv4 address for {target}"))
}

fn configure_logging(cfg: &TraceConfig) {
    if cfg.verbose {
        let fmt_span = match cfg.log_span_events {
            LogSpanEvents::Off => FmtSpan::NONE,
            LogSpanEvents::Active => FmtSpan::ACTIVE,
            LogSpanEvents::Full => FmtSpan::FULL,
        };
        match cfg.log_format {
            LogFormat::Compact => {
                tracing_subscriber::fmt()
                    .with_writer(std::io::stderr)
                    .with_span_events(fmt_span)
                    .with_env_filter(&cfg.log_filter)
                    .compact()
                    .init();
            }
            LogFormat::Pretty => {
                tracing_subscriber::fmt()
                    .with_writer(std::io::stderr)
                    .with_span_events(fmt_span)
                    .with_env_filter(&cfg.log_filter)
                    .pretty()
                    .init();
            }
            LogFormat::Json => {
                tracing_subscriber::fmt()
                    .with_writer(std::io::stderr)
                    .with_span_events(fmt_span)
                    .with_env_filter(&cfg.log_filter)
                    .json()
                    .init();
            }
        }
    }
}
