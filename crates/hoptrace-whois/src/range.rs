use std::net::Ipv4Addr;

/// The private `IPv4` networks as `(network, prefix length)`.
const PRIVATE_NETWORKS: [(Ipv4Addr, u32); 3] = [
    (Ipv4Addr::new(10, 0, 0, 0), 8),
    (Ipv4Addr::new(172, 16, 0, 0), 12),
    (Ipv4Addr::new(192, 168, 0, 0), 16),
];

/// Is `addr` within one of the private networks `10.0.0.0/8`, `172.16.0.0/12`
/// or `192.168.0.0/16`?
///
/// Loopback, link-local and the shared address space are not included.
#[must_use]
pub fn is_private(addr: Ipv4Addr) -> bool {
    let addr = u32::from(addr);
    PRIVATE_NETWORKS.iter().any(|&(network, prefix_len)| {
        let mask = u32::MAX << (32 - prefix_len);
        addr & mask == u32::from(network)
    })
}
