use hoptrace_core::Hop;
use std::io::Write;
use std::net::Ipv4Addr;

/// Write each hop as it is discovered.
///
/// Every responding hop is followed by a line with the details returned from
/// `describe`, if any, and every hop is followed by a blank line:
///
/// ```text
/// 1. 192.168.1.1
/// local
///
/// 2. *
///
/// 3. 8.8.8.8
/// GOGL, 15169, US
///
/// ```
pub fn report<D>(
    hops: impl IntoIterator<Item = Hop>,
    mut describe: D,
    out: &mut impl Write,
) -> anyhow::Result<()>
where
    D: FnMut(Ipv4Addr) -> Option<String>,
{
    for hop in hops {
        writeln!(out, "{hop}")?;
        if let Some(details) = hop.addr.and_then(&mut describe) {
            writeln!(out, "{details}")?;
        }
        writeln!(out)?;
        out.flush()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoptrace_core::TimeToLive;

    fn hop(ttl: u8, addr: Option<Ipv4Addr>) -> Hop {
        Hop::new(TimeToLive(ttl), addr)
    }

    #[test]
    fn test_report() -> anyhow::Result<()> {
        let hops = [
            hop(1, Some(Ipv4Addr::new(192, 168, 1, 1))),
            hop(2, None),
            hop(3, Some(Ipv4Addr::new(8, 8, 8, 8))),
            hop(4, Some(Ipv4Addr::new(1, 1, 1, 1))),
        ];
        let describe = |addr: Ipv4Addr| match addr.octets() {
            [192, ..] => Some(String::from("local")),
            [8, ..] => Some(String::from("GOGL, 15169, US")),
            _ => None,
        };
        let mut out = Vec::new();
        report(hops, describe, &mut out)?;
        let expected = "\
1. 192.168.1.1
local

2. *

3. 8.8.8.8
GOGL, 15169, US

4. 1.1.1.1

";
        assert_eq!(expected, String::from_utf8(out)?);
        Ok(())
    }

    #[test]
    fn test_report_does_not_describe_silent_hops() -> anyhow::Result<()> {
        let mut described = 0;
        let mut out = Vec::new();
        report(
            [hop(1, None), hop(2, None)],
            |_| {
                described += 1;
                None
            },
            &mut out,
        )?;
        assert_eq!(0, described);
        assert_eq!("1. *\n\n2. *\n\n", String::from_utf8(out)?);
        Ok(())
    }

    #[test]
    fn test_report_empty_details() -> anyhow::Result<()> {
        let mut out = Vec::new();
        report(
            [hop(1, Some(Ipv4Addr::new(9, 9, 9, 9)))],
            |_| Some(String::new()),
            &mut out,
        )?;
        assert_eq!("1. 9.9.9.9\n\n\n", String::from_utf8(out)?);
        Ok(())
    }
}
