use crate::checksum::set_checksum;
use crate::error::Result;
use crate::icmpv4::echo_reply::EchoReplyPacket;
use crate::icmpv4::echo_request::EchoRequestPacket;
use crate::icmpv4::time_exceeded::TimeExceededPacket;
use crate::icmpv4::{IcmpCode, IcmpPacket, IcmpType, ICMP_HEADER_SIZE};
use crate::ipv4::Ipv4Packet;
use crate::IpProtocol;

/// The payload carried by every echo request probe.
pub const PROBE_PAYLOAD: &[u8; 32] = b"abcdefghijklmnopqrstuvwxyz hello";

/// A decoded `ICMPv4` message.
///
/// The `identifier` and `sequence` of the echo variants are opaque correlation tokens; a reply
/// belongs to a probe only if both are equal.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum IcmpMessage {
    EchoRequest { identifier: u16, sequence: u16 },
    EchoReply { identifier: u16, sequence: u16 },
    /// A router discarded a datagram whose TTL reached zero.
    ///
    /// `embedded` is the decoded message quoted from the discarded datagram, or `None` if the
    /// quote was not an `IPv4` `ICMP` datagram we recognise.
    TimeExceeded { embedded: Option<Box<IcmpMessage>> },
}

impl IcmpMessage {
    /// Decode an `ICMPv4` message from the start of `data`.
    ///
    /// Returns `None` for truncated input and for message types other than echo request, echo
    /// reply and time exceeded. The time exceeded code is not inspected.
    #[must_use]
    pub fn decode(data: &[u8]) -> Option<Self> {
        let icmp = IcmpPacket::new_view(data).ok()?;
        match icmp.get_icmp_type() {
            IcmpType::EchoRequest => {
                let packet = EchoRequestPacket::new_view(data).ok()?;
                Some(Self::EchoRequest {
                    identifier: packet.get_identifier(),
                    sequence: packet.get_sequence(),
                })
            }
            IcmpType::EchoReply => {
                let packet = EchoReplyPacket::new_view(data).ok()?;
                Some(Self::EchoReply {
                    identifier: packet.get_identifier(),
                    sequence: packet.get_sequence(),
                })
            }
            IcmpType::TimeExceeded => {
                let packet = TimeExceededPacket::new_view(data).ok()?;
                let embedded = Self::decode_ipv4(packet.payload()).map(Box::new);
                Some(Self::TimeExceeded { embedded })
            }
            IcmpType::DestinationUnreachable | IcmpType::Other(_) => None,
        }
    }

    /// Decode the `ICMPv4` message carried by an `IPv4` datagram.
    ///
    /// The datagram must be version 4, its header length must fit within `datagram` and its
    /// protocol must be `ICMP`.
    #[must_use]
    pub fn decode_ipv4(datagram: &[u8]) -> Option<Self> {
        let ipv4 = Ipv4Packet::new_view(datagram).ok()?;
        if ipv4.get_version() != 4
            || ipv4.header_len() < Ipv4Packet::minimum_packet_size()
            || ipv4.get_protocol() != IpProtocol::Icmp
        {
            return None;
        }
        Self::decode(ipv4.payload().ok()?)
    }

    /// Encode the message to wire bytes.
    ///
    /// Only echo requests are ever sent, every other variant returns `None`.
    #[must_use]
    pub fn encode(&self) -> Option<Vec<u8>> {
        match self {
            Self::EchoRequest {
                identifier,
                sequence,
            } => encode_echo_request(*identifier, *sequence).ok(),
            Self::EchoReply { .. } | Self::TimeExceeded { .. } => None,
        }
    }

    /// Is this message the answer to the echo request with `identifier` and `sequence`?
    ///
    /// That is either the matching echo reply or a time exceeded message quoting it.
    #[must_use]
    pub fn is_answer_to(&self, identifier: u16, sequence: u16) -> bool {
        let wanted = Some((identifier, sequence));
        match self {
            Self::EchoReply { .. } => self.correlation() == wanted,
            Self::TimeExceeded {
                embedded: Some(original),
            } => original.correlation() == wanted,
            Self::EchoRequest { .. } | Self::TimeExceeded { embedded: None } => false,
        }
    }

    fn correlation(&self) -> Option<(u16, u16)> {
        match self {
            Self::EchoRequest {
                identifier,
                sequence,
            }
            | Self::EchoReply {
                identifier,
                sequence,
            } => Some((*identifier, *sequence)),
            Self::TimeExceeded { .. } => None,
        }
    }
}

/// Build an echo request carrying [`PROBE_PAYLOAD`] with its checksum set.
pub fn encode_echo_request(identifier: u16, sequence: u16) -> Result<Vec<u8>> {
    let mut buf = vec![0_u8; ICMP_HEADER_SIZE + PROBE_PAYLOAD.len()];
    {
        let mut packet = EchoRequestPacket::new(&mut buf)?;
        packet.set_icmp_type(IcmpType::EchoRequest);
        packet.set_icmp_code(IcmpCode(0));
        packet.set_identifier(identifier);
        packet.set_sequence(sequence);
        packet.set_payload(PROBE_PAYLOAD);
    }
    set_checksum(&mut buf, 2);
    Ok(buf)
}
