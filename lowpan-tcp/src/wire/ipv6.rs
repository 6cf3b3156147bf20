//! IPv6 addresses and the fixed IPv6 header.
use core::fmt;
use byteorder::{ByteOrder, NetworkEndian};

use super::{Error, Result};

/// Length of the fixed IPv6 header.
pub const HEADER_LEN: usize = field::DST_ADDR.end;

enum_with_unknown! {
    /// IP datagram encapsulated protocol.
    pub enum Protocol(u8) {
        /// Hop-by-hop options extension header.
        HopByHop  = 0x00,
        /// Internet control message protocol.
        Icmp      = 0x01,
        /// Transmission control protocol.
        Tcp       = 0x06,
        /// User datagram protocol.
        Udp       = 0x11,
        /// Routing extension header.
        Ipv6Route = 0x2b,
        /// Fragment extension header.
        Ipv6Frag  = 0x2c,
        /// ICMP for IPv6.
        Icmpv6    = 0x3a,
        /// No next header.
        Ipv6NoNxt = 0x3b,
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Protocol::HopByHop => write!(f, "Hop-by-Hop"),
            Protocol::Icmp => write!(f, "ICMP"),
            Protocol::Tcp => write!(f, "TCP"),
            Protocol::Udp => write!(f, "UDP"),
            Protocol::Ipv6Route => write!(f, "IPv6-Route"),
            Protocol::Ipv6Frag => write!(f, "IPv6-Frag"),
            Protocol::Icmpv6 => write!(f, "ICMPv6"),
            Protocol::Ipv6NoNxt => write!(f, "IPv6-NoNxt"),
            Protocol::Unknown(id) => write!(f, "0x{:02x}", id),
        }
    }
}

/// A sixteen-octet IPv6 address.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
pub struct Address(pub [u8; 16]);

impl Address {
    /// The [unspecified address].
    ///
    /// [unspecified address]: https://tools.ietf.org/html/rfc4291#section-2.5.2
    pub const UNSPECIFIED: Address = Address([0x00; 16]);

    /// The [loopback address].
    ///
    /// [loopback address]: https://tools.ietf.org/html/rfc4291#section-2.5.3
    pub const LOOPBACK: Address =
        Address([0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
                 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01]);

    /// Construct an IPv6 address from parts.
    pub fn new(
        a0: u16, a1: u16, a2: u16, a3: u16,
        a4: u16, a5: u16, a6: u16, a7: u16,
    ) -> Address {
        let mut addr = [0u8; 16];
        let words = [a0, a1, a2, a3, a4, a5, a6, a7];
        NetworkEndian::write_u16_into(&words, &mut addr);
        Address(addr)
    }

    /// Construct an IPv6 address from a sequence of octets, in big-endian.
    ///
    /// # Panics
    /// The function panics if `data` is not sixteen octets long.
    pub fn from_bytes(data: &[u8]) -> Address {
        let mut bytes = [0; 16];
        bytes.copy_from_slice(data);
        Address(bytes)
    }

    /// The link-local address of a node known by its 16-bit short address.
    ///
    /// The interface identifier is `0000:00ff:fe00:XXXX` as in [RFC 4944 § 6], giving
    /// `fe80::ff:fe00:XXXX`. This is the embedding that [`derive_link_address`] reverses.
    ///
    /// [RFC 4944 § 6]: https://tools.ietf.org/html/rfc4944#section-6
    /// [`derive_link_address`]: ../ieee802154/fn.derive_link_address.html
    pub const fn from_short_address(short: [u8; 2]) -> Address {
        let [hi, lo] = short;
        Address([0xfe, 0x80, 0, 0, 0, 0, 0, 0,
                 0, 0, 0, 0xff, 0xfe, 0, hi, lo])
    }

    /// Return an IPv6 address as a sequence of octets, in big-endian.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Query whether the IPv6 address is an [unicast address].
    ///
    /// [unicast address]: https://tools.ietf.org/html/rfc4291#section-2.5
    pub fn is_unicast(&self) -> bool {
        !(self.is_multicast() || self.is_unspecified())
    }

    /// Query whether the IPv6 address is a [multicast address].
    ///
    /// [multicast address]: https://tools.ietf.org/html/rfc4291#section-2.7
    pub fn is_multicast(&self) -> bool {
        self.0[0] == 0xff
    }

    /// Query whether the IPv6 address is the [unspecified address].
    ///
    /// [unspecified address]: https://tools.ietf.org/html/rfc4291#section-2.5.2
    pub fn is_unspecified(&self) -> bool {
        self.0 == [0x00; 16]
    }

    /// Query whether the IPv6 address is in the [link-local] scope.
    ///
    /// [link-local]: https://tools.ietf.org/html/rfc4291#section-2.5.6
    pub fn is_link_local(&self) -> bool {
        self.0[0..8] == [0xfe, 0x80, 0x00, 0x00,
                         0x00, 0x00, 0x00, 0x00]
    }

    /// Query whether the interface identifier embeds a 16-bit short address.
    pub fn is_short_address_based(&self) -> bool {
        self.0[8..14] == [0x00, 0x00, 0x00, 0xff, 0xfe, 0x00]
    }
}

#[cfg(feature = "std")]
impl From<::std::net::Ipv6Addr> for Address {
    fn from(x: ::std::net::Ipv6Addr) -> Address {
        Address(x.octets())
    }
}

#[cfg(feature = "std")]
impl From<Address> for ::std::net::Ipv6Addr {
    fn from(Address(x): Address) -> ::std::net::Ipv6Addr {
        x.into()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut words = [0u16; 8];
        NetworkEndian::read_u16_into(&self.0, &mut words);

        // Longest run of two or more zero words becomes "::", the first one on ties (RFC 5952).
        let (mut zeros, mut run) = ((8, 0), (0, 0));
        for (i, &word) in words.iter().enumerate() {
            if word != 0 {
                run.1 = 0;
                continue;
            }
            if run.1 == 0 {
                run.0 = i;
            }
            run.1 += 1;
            if run.1 >= 2 && run.1 > zeros.1 {
                zeros = run;
            }
        }

        let (start, len) = zeros;
        for (i, word) in words[..start].iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{:x}", word)?;
        }
        if len > 0 {
            f.write_str("::")?;
        }
        for (i, word) in words[start + len..].iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{:x}", word)?;
        }
        Ok(())
    }
}

/// An IPv6 address assigned together with the prefix length of its subnet.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
pub struct Cidr {
    address:    Address,
    prefix_len: u8,
}

impl Cidr {
    /// Create an IPv6 CIDR block from the given address and prefix length.
    ///
    /// # Panics
    /// This function panics if the prefix length is larger than 128.
    pub fn new(address: Address, prefix_len: u8) -> Cidr {
        assert!(prefix_len <= 128);
        Cidr { address, prefix_len }
    }

    /// Return the address of this IPv6 CIDR block.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Return the prefix length of this IPv6 CIDR block.
    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// Query whether the subnet of this block contains the given address.
    ///
    /// Host bits of both addresses are ignored.
    pub fn contains(&self, address: Address) -> bool {
        let whole = usize::from(self.prefix_len / 8);
        let bits = self.prefix_len % 8;
        let (Address(ours), Address(theirs)) = (self.address, address);

        if ours[..whole] != theirs[..whole] {
            return false;
        }
        if bits == 0 {
            return true;
        }

        let partial = 0xffu8 << (8 - bits);
        ours[whole] & partial == theirs[whole] & partial
    }
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_len)
    }
}

byte_wrapper! {
    /// A byte sequence starting with a fixed IPv6 header.
    #[derive(Debug, PartialEq, Eq)]
    pub struct ipv6_packet([u8]);
}

// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |Version| Traffic Class |           Flow Label                  |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |         Payload Length        |  Next Header  |   Hop Limit   |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                         Source Address                        |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                      Destination Address                      |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//
// See https://tools.ietf.org/html/rfc8200#section-3 for details.
mod field {
    use crate::wire::field::Field;
    // 4-bit version number, 8-bit traffic class, and the
    // 20-bit flow label.
    pub(crate) const VER_TC_FLOW: Field = 0..4;
    // Length of the payload, extension headers included.
    pub(crate) const LENGTH:      Field = 4..6;
    pub(crate) const NXT_HDR:     usize = 6;
    pub(crate) const HOP_LIMIT:   usize = 7;
    pub(crate) const SRC_ADDR:    Field = 8..24;
    pub(crate) const DST_ADDR:    Field = 24..40;
}

impl ipv6_packet {
    /// Imbue a raw octet buffer with IPv6 header structure.
    #[inline]
    pub fn new_unchecked(buffer: &[u8]) -> &Self {
        Self::__from_macro_new_unchecked(buffer)
    }

    /// Imbue a mutable raw octet buffer with IPv6 header structure.
    #[inline]
    pub fn new_unchecked_mut(buffer: &mut [u8]) -> &mut Self {
        Self::__from_macro_new_unchecked_mut(buffer)
    }

    /// Shorthand for a combination of [new_unchecked] and [check_len].
    ///
    /// [new_unchecked]: #method.new_unchecked
    /// [check_len]: #method.check_len
    #[inline]
    pub fn new_checked(buffer: &[u8]) -> Result<&Self> {
        let packet = Self::new_unchecked(buffer);
        packet.check_len()?;
        Ok(packet)
    }

    /// Ensure that no accessor method will panic if called.
    ///
    /// Only the fixed header is required, the payload may be shorter than the payload length
    /// field claims since the header is also used as a template before the payload exists.
    #[inline]
    pub fn check_len(&self) -> Result<()> {
        if self.0.len() < HEADER_LEN {
            Err(Error::Truncated)
        } else {
            Ok(())
        }
    }

    /// The underlying bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Return the header length.
    #[inline]
    pub fn header_len(&self) -> usize {
        HEADER_LEN
    }

    /// Return the version field.
    #[inline]
    pub fn version(&self) -> u8 {
        self.0[field::VER_TC_FLOW.start] >> 4
    }

    /// Return the payload length field.
    #[inline]
    pub fn payload_len(&self) -> u16 {
        NetworkEndian::read_u16(&self.0[field::LENGTH])
    }

    /// Return the next header field.
    #[inline]
    pub fn next_header(&self) -> Protocol {
        Protocol::from(self.0[field::NXT_HDR])
    }

    /// Return the hop limit field.
    #[inline]
    pub fn hop_limit(&self) -> u8 {
        self.0[field::HOP_LIMIT]
    }

    /// Return the source address field.
    #[inline]
    pub fn src_addr(&self) -> Address {
        Address::from_bytes(&self.0[field::SRC_ADDR])
    }

    /// Return the destination address field.
    #[inline]
    pub fn dst_addr(&self) -> Address {
        Address::from_bytes(&self.0[field::DST_ADDR])
    }

    /// Set the version field, clearing traffic class and flow label.
    #[inline]
    pub fn set_version(&mut self, value: u8) {
        NetworkEndian::write_u32(&mut self.0[field::VER_TC_FLOW], u32::from(value & 0x0f) << 28);
    }

    /// Set the payload length field.
    #[inline]
    pub fn set_payload_len(&mut self, value: u16) {
        NetworkEndian::write_u16(&mut self.0[field::LENGTH], value);
    }

    /// Set the next header field.
    #[inline]
    pub fn set_next_header(&mut self, value: Protocol) {
        self.0[field::NXT_HDR] = value.into();
    }

    /// Set the hop limit field.
    #[inline]
    pub fn set_hop_limit(&mut self, value: u8) {
        self.0[field::HOP_LIMIT] = value;
    }

    /// Set the source address field.
    #[inline]
    pub fn set_src_addr(&mut self, value: Address) {
        self.0[field::SRC_ADDR].copy_from_slice(value.as_bytes());
    }

    /// Set the destination address field.
    #[inline]
    pub fn set_dst_addr(&mut self, value: Address) {
        self.0[field::DST_ADDR].copy_from_slice(value.as_bytes());
    }

    /// The bytes following the fixed header.
    #[inline]
    pub fn payload_slice(&self) -> &[u8] {
        &self.0[HEADER_LEN..]
    }
}

/// A high-level representation of a fixed IPv6 header.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Repr {
    /// The source address.
    pub src_addr:    Address,
    /// The destination address.
    pub dst_addr:    Address,
    /// The protocol of the header following this one.
    pub next_header: Protocol,
    /// Length of everything after the fixed header.
    pub payload_len: usize,
    /// The remaining hops.
    pub hop_limit:   u8,
}

impl Repr {
    /// Parse an IPv6 header and return a high-level representation.
    pub fn parse(packet: &ipv6_packet) -> Result<Repr> {
        packet.check_len()?;
        if packet.version() != 6 {
            return Err(Error::Malformed);
        }
        Ok(Repr {
            src_addr:    packet.src_addr(),
            dst_addr:    packet.dst_addr(),
            next_header: packet.next_header(),
            payload_len: packet.payload_len().into(),
            hop_limit:   packet.hop_limit(),
        })
    }

    /// Return the length of a header that will be emitted from this high-level representation.
    pub fn buffer_len(&self) -> usize {
        HEADER_LEN
    }

    /// Emit a high-level representation into an IPv6 header.
    ///
    /// A payload length that does not fit the 16-bit field is saturated, it is up to the frame
    /// dispatcher to refuse such a datagram.
    pub fn emit(&self, packet: &mut ipv6_packet) {
        packet.set_version(6);
        packet.set_payload_len(self.payload_len.min(usize::from(u16::max_value())) as u16);
        packet.set_next_header(self.next_header);
        packet.set_hop_limit(self.hop_limit);
        packet.set_src_addr(self.src_addr);
        packet.set_dst_addr(self.dst_addr);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const SRC: Address = Address::from_short_address([0x00, 0x01]);
    const DST: Address = Address::from_short_address([0xab, 0xcd]);

    #[test]
    fn short_address_embedding() {
        assert_eq!(DST, Address::new(0xfe80, 0, 0, 0, 0, 0xff, 0xfe00, 0xabcd));
        assert!(DST.is_link_local());
        assert!(DST.is_short_address_based());
        assert!(!Address::LOOPBACK.is_short_address_based());
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", DST), "fe80::ff:fe00:abcd");
        assert_eq!(format!("{}", Address::LOOPBACK), "::1");
        assert_eq!(format!("{}", Address::UNSPECIFIED), "::");
        assert_eq!(format!("{}", Address::new(0x2001, 0xdb8, 0, 1, 0, 0, 0, 1)), "2001:db8:0:1::1");
        assert_eq!(format!("{}", Address::new(1, 2, 3, 4, 5, 6, 0, 8)), "1:2:3:4:5:6:0:8");
    }

    #[test]
    fn cidr_contains() {
        let cidr = Cidr::new(SRC, 64);
        assert!(cidr.contains(DST));
        assert!(!cidr.contains(Address::LOOPBACK));
        assert!(Cidr::new(Address::UNSPECIFIED, 0).contains(DST));
        let odd = Cidr::new(Address::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 0), 33);
        assert!(odd.contains(Address::new(0x2001, 0xdb8, 0x7fff, 0, 0, 0, 0, 1)));
        assert!(!odd.contains(Address::new(0x2001, 0xdb8, 0x8000, 0, 0, 0, 0, 1)));
        assert!(Cidr::new(DST, 128).contains(DST));
    }

    #[test]
    fn emit_and_parse() {
        let repr = Repr {
            src_addr: SRC,
            dst_addr: DST,
            next_header: Protocol::Tcp,
            payload_len: 60,
            hop_limit: 64,
        };
        let mut bytes = [0xff; HEADER_LEN];
        repr.emit(ipv6_packet::new_unchecked_mut(&mut bytes));
        assert_eq!(&bytes[..8], &[0x60, 0, 0, 0, 0, 60, 0x06, 64]);

        let packet = ipv6_packet::new_checked(&bytes).unwrap();
        assert_eq!(Repr::parse(packet), Ok(repr));
    }

    #[test]
    fn truncated() {
        assert_eq!(ipv6_packet::new_checked(&[0x60; 39]), Err(Error::Truncated));
    }

    #[test]
    fn wrong_version() {
        let mut bytes = [0; HEADER_LEN];
        bytes[0] = 0x40;
        let packet = ipv6_packet::new_checked(&bytes).unwrap();
        assert_eq!(Repr::parse(packet), Err(Error::Malformed));
    }
}
