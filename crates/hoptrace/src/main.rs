#![forbid(unsafe_code)]

use clap::Parser;
use config::{Args, TraceConfig};
use hoptrace_core::{Platform, PlatformImpl};
use hoptrace_privilege::Privilege;
use std::process;

mod app;
mod config;
mod report;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let privilege = Privilege::acquire_privileges()?;
    let interface_addrs = PlatformImpl::interface_addrs()?;
    let cfg = TraceConfig::build_config(args, &privilege, &interface_addrs)?;
    let pid = u16::try_from(process::id() % u32::from(u16::MAX))?;
    app::run_hoptrace(&cfg, pid)
}
