use hoptrace_core::{Builder, Datagram, Hop, Network, Result, TimeToLive, Tracer};
use hoptrace_packet::checksum::set_checksum;
use hoptrace_packet::ipv4::Ipv4Packet;
use hoptrace_packet::message::IcmpMessage;
use hoptrace_packet::IpProtocol;
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::Once;
use std::time::Duration;
use test_case::test_case;

const INTERFACE_ADDR: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 21);
const TARGET_ADDR: Ipv4Addr = Ipv4Addr::new(93, 184, 216, 34);

static INIT: Once = Once::new();

fn init_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// How the simulated path answers the probe sent with a given `ttl`.
#[derive(Debug, Clone, Copy)]
enum Reply {
    /// Nothing answers.
    Silent,
    /// The router at this hop answers with a time exceeded message.
    Router(Ipv4Addr),
    /// The target answers with an echo reply.
    Target,
}

/// A network which answers probes according to a per-ttl script.
struct ScriptedNetwork {
    script: HashMap<u8, Reply>,
    ttl: TimeToLive,
    /// Datagrams queued for delivery ahead of the scripted reply.
    noise: Vec<Datagram>,
    pending: Option<Datagram>,
    sent: Vec<(TimeToLive, IcmpMessage)>,
    closed: bool,
}

impl ScriptedNetwork {
    fn new(script: impl IntoIterator<Item = (u8, Reply)>) -> Self {
        Self {
            script: script.into_iter().collect(),
            ttl: TimeToLive(0),
            noise: Vec::new(),
            pending: None,
            sent: Vec::new(),
            closed: false,
        }
    }

    fn with_noise(self, noise: Vec<Datagram>) -> Self {
        Self { noise, ..self }
    }
}

impl Network for &mut ScriptedNetwork {
    fn interface_addr(&self) -> Ipv4Addr {
        INTERFACE_ADDR
    }

    fn set_outbound_ttl(&mut self, ttl: TimeToLive) -> Result<()> {
        assert!(!self.closed);
        self.ttl = ttl;
        Ok(())
    }

    fn send_to(&mut self, bytes: &[u8], destination: Ipv4Addr) -> Result<()> {
        assert!(!self.closed);
        assert_eq!(TARGET_ADDR, destination);
        let request = IcmpMessage::decode(bytes).expect("echo request");
        self.pending = match self.script.get(&self.ttl.0).copied().unwrap_or(Reply::Silent) {
            Reply::Silent => None,
            Reply::Router(router) => Some(time_exceeded(router, bytes)),
            Reply::Target => Some(echo_reply(&request)),
        };
        self.sent.push((self.ttl, request));
        Ok(())
    }

    fn receive_within(&mut self, _timeout: Duration) -> Result<Option<Datagram>> {
        assert!(!self.closed);
        if let Some(datagram) = self.noise.pop() {
            return Ok(Some(datagram));
        }
        Ok(self.pending.take())
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

fn ipv4(source: Ipv4Addr, destination: Ipv4Addr, payload: &[u8]) -> Vec<u8> {
    let mut buf = vec![0_u8; Ipv4Packet::minimum_packet_size() + payload.len()];
    let mut packet = Ipv4Packet::new(&mut buf).unwrap();
    packet.set_version(4);
    packet.set_header_length(5);
    packet.set_total_length(u16::try_from(packet.packet().len()).unwrap());
    packet.set_ttl(64);
    packet.set_protocol(IpProtocol::Icmp);
    packet.set_source(source);
    packet.set_destination(destination);
    packet.set_payload(payload);
    set_checksum(&mut buf[..Ipv4Packet::minimum_packet_size()], 10);
    buf
}

/// A time exceeded message from `router` quoting the head of `probe`.
fn time_exceeded(router: Ipv4Addr, probe: &[u8]) -> Datagram {
    let mut icmp = vec![11, 0, 0, 0, 0, 0, 0, 0];
    icmp.extend_from_slice(&ipv4(INTERFACE_ADDR, TARGET_ADDR, &probe[..8]));
    set_checksum(&mut icmp, 2);
    Datagram {
        bytes: ipv4(router, INTERFACE_ADDR, &icmp),
        source: router,
    }
}

fn echo_reply(request: &IcmpMessage) -> Datagram {
    let IcmpMessage::EchoRequest {
        identifier,
        sequence,
    } = request
    else {
        panic!("expected echo request")
    };
    let mut icmp = vec![0, 0, 0, 0];
    icmp.extend_from_slice(&identifier.to_be_bytes());
    icmp.extend_from_slice(&sequence.to_be_bytes());
    set_checksum(&mut icmp, 2);
    Datagram {
        bytes: ipv4(TARGET_ADDR, INTERFACE_ADDR, &icmp),
        source: TARGET_ADDR,
    }
}

fn tracer(max_ttl: u8) -> Tracer {
    Builder::new(INTERFACE_ADDR, TARGET_ADDR)
        .max_ttl(max_ttl)
        .read_timeout(Duration::from_millis(100))
        .trace_identifier(4321)
        .build()
        .unwrap()
}

fn addrs(hops: &[Hop]) -> Vec<Option<Ipv4Addr>> {
    hops.iter().map(|hop| hop.addr).collect()
}

#[test]
fn test_all_silent() {
    init_logging();
    let mut network = ScriptedNetwork::new([]);
    let hops = tracer(3).trace_with(&mut network).collect::<Vec<_>>();
    assert_eq!(vec![None, None, None], addrs(&hops));
    assert!(network.closed);
}

#[test]
fn test_router_then_target() {
    init_logging();
    let router = Ipv4Addr::new(10, 0, 0, 1);
    let mut network = ScriptedNetwork::new([(2, Reply::Router(router)), (3, Reply::Target)]);
    let hops = tracer(5).trace_with(&mut network).collect::<Vec<_>>();
    assert_eq!(vec![None, Some(router), Some(TARGET_ADDR)], addrs(&hops));
    assert_eq!(
        vec![TimeToLive(1), TimeToLive(2), TimeToLive(3)],
        hops.iter().map(|hop| hop.ttl).collect::<Vec<_>>()
    );
    assert!(network.closed);
}

#[test]
fn test_probes_share_identifier_with_increasing_sequence() {
    init_logging();
    let mut network = ScriptedNetwork::new([]);
    let _ = tracer(4).trace_with(&mut network).count();
    let expected = (1..=4)
        .map(|i| {
            (
                TimeToLive(i),
                IcmpMessage::EchoRequest {
                    identifier: 4321,
                    sequence: 15 + u16::from(i),
                },
            )
        })
        .collect::<Vec<_>>();
    assert_eq!(expected, network.sent);
}

#[test_case(1)]
#[test_case(7)]
#[test_case(30)]
fn test_silent_path_yields_one_hop_per_ttl(depth: u8) {
    init_logging();
    let mut network = ScriptedNetwork::new([]);
    let hops = tracer(depth).trace_with(&mut network).collect::<Vec<_>>();
    assert_eq!(usize::from(depth), hops.len());
    assert!(hops.iter().all(|hop| hop.addr.is_none()));
}

#[test_case(1, 15)]
#[test_case(4, 15)]
#[test_case(15, 15)]
fn test_target_at_hop_yields_k_hops(k: u8, depth: u8) {
    init_logging();
    let mut network = ScriptedNetwork::new([(k, Reply::Target)]);
    let hops = tracer(depth).trace_with(&mut network).collect::<Vec<_>>();
    assert_eq!(usize::from(k), hops.len());
    assert_eq!(Some(TARGET_ADDR), hops.last().and_then(|hop| hop.addr));
    assert_eq!(usize::from(k), network.sent.len());
}

#[test]
fn test_own_and_unrelated_datagrams_are_ignored() {
    init_logging();
    let router = Ipv4Addr::new(10, 0, 0, 1);
    let stray = echo_reply(&IcmpMessage::EchoRequest {
        identifier: 4321,
        sequence: 9999,
    });
    let own = Datagram {
        source: INTERFACE_ADDR,
        ..echo_reply(&IcmpMessage::EchoRequest {
            identifier: 4321,
            sequence: 16,
        })
    };
    let mut network =
        ScriptedNetwork::new([(1, Reply::Router(router))]).with_noise(vec![stray, own]);
    let hops = tracer(1).trace_with(&mut network).collect::<Vec<_>>();
    assert_eq!(vec![Some(router)], addrs(&hops));
}

#[test]
fn test_dropping_trace_stops_sending() {
    init_logging();
    let mut network = ScriptedNetwork::new([]);
    {
        let mut trace = tracer(10).trace_with(&mut network);
        assert!(trace.next().is_some());
        assert!(trace.next().is_some());
    }
    assert_eq!(2, network.sent.len());
}
