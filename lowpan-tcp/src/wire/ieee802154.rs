//! Short IEEE 802.15.4 addresses and their embedding in IPv6 addresses.
//!
//! A 6LoWPAN node with a 16-bit short address forms its interface identifier as
//! `0000:00ff:fe00:XXXX` ([RFC 4944 § 6]). The stack relies on this convention in the other
//! direction as well: the link-layer address of any neighbor is read from the last two octets of
//! its IPv6 address, without consulting a table. This is what makes [`derive_link_address`] total.
//!
//! [RFC 4944 § 6]: https://tools.ietf.org/html/rfc4944#section-6
//! [`derive_link_address`]: fn.derive_link_address.html
use core::fmt;

use super::ipv6;

/// A two-octet IEEE 802.15.4 short address.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
pub struct Address(pub [u8; 2]);

impl Address {
    /// The broadcast short address.
    pub const BROADCAST: Address = Address([0xff; 2]);

    /// Construct a short address from a sequence of octets, in big-endian.
    ///
    /// # Panics
    /// The function panics if `data` is not two octets long.
    pub fn from_bytes(data: &[u8]) -> Address {
        let mut bytes = [0; 2];
        bytes.copy_from_slice(data);
        Address(bytes)
    }

    /// Extract the short address embedded in an IPv6 address.
    pub fn from_ipv6(addr: ipv6::Address) -> Address {
        let ipv6::Address(bytes) = addr;
        Address([bytes[14], bytes[15]])
    }

    /// Return the address as a sequence of octets, in big-endian.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Query whether this is the broadcast address.
    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }
}

/// Derive the link-layer destination address of a neighbor from its IPv6 address.
///
/// Pure and total, the result is never cached.
pub fn derive_link_address(addr: ipv6::Address) -> Address {
    Address::from_ipv6(addr)
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:02x}:{:02x}", self.0[0], self.0[1])
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn embedding_round_trip() {
        for &short in [[0x00, 0x01], [0xab, 0xcd], [0xff, 0xfe]].iter() {
            let ip = ipv6::Address::from_short_address(short);
            assert_eq!(derive_link_address(ip), Address(short));
        }
    }

    #[test]
    fn deterministic() {
        let ip = ipv6::Address::new(0x2001, 0xdb8, 0, 0, 0x1234, 0x5678, 0x9abc, 0xdef0);
        let first = derive_link_address(ip);
        assert_eq!(first, derive_link_address(ip));
        assert_eq!(first, Address([0xde, 0xf0]));
    }

    #[test]
    fn total_on_special_addresses() {
        assert_eq!(derive_link_address(ipv6::Address::UNSPECIFIED), Address([0, 0]));
        assert_eq!(derive_link_address(ipv6::Address::LOOPBACK), Address([0, 1]));
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", Address([0xab, 0x0c])), "ab:0c");
        assert!(Address::BROADCAST.is_broadcast());
    }
}
