/*! Low-level packet access and construction.

The `wire` module deals with the packet *representation*, on two levels.

 * Lowercase byte wrappers such as [`ipv6_packet`] and [`tcp_header`] read and write fields of a
   sequence of octets in place. Their `new_checked` constructor guarantees that no accessor
   panics afterwards.
 * The `Repr` structs, [`Ipv6Repr`] and [`TcpRepr`], are compact high-level representations of
   the header data that can be parsed from and emitted into such byte wrappers.

The TCP state machine hands its output over as raw bytes in a device buffer, so this is also the
module that interprets those bytes before they are dispatched. The link-layer side is covered by
the [`ieee802154`] short address and its derivation from an IPv6 address.

[`ipv6_packet`]: struct.ipv6_packet.html
[`tcp_header`]: struct.tcp_header.html
[`Ipv6Repr`]: struct.Ipv6Repr.html
[`TcpRepr`]: struct.TcpRepr.html
[`ieee802154`]: ieee802154/index.html
*/
// Copyright (C) 2016 whitequark@whitequark.org
// Copyright (C) 2019 Andreas Molzer <andreas.molzer@tum.de>
//
// in large parts from `smoltcp` originally distributed under 0-clause BSD
use core::fmt;

mod field {
    pub(crate) type Field = ::core::ops::Range<usize>;
}

pub mod ieee802154;
pub mod ipv6;
pub mod tcp;

pub use self::ieee802154::{
    Address as LinkAddress,
    derive_link_address};

pub use self::ipv6::{
    ipv6_packet,
    Address as Ipv6Address,
    Cidr as Ipv6Cidr,
    Protocol as IpProtocol,
    Repr as Ipv6Repr};

pub use self::tcp::{
    tcp_header,
    Flags as TcpFlags,
    Repr as TcpRepr};

/// The error type for header parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Error {
    /// The buffer is shorter than the header it should contain.
    Truncated,

    /// A header was recognized but was self-contradictory.
    ///
    /// Examples: an IPv6 header with a version other than 6, a TCP header whose data offset
    /// points into its own fixed fields.
    Malformed,
}

/// The result type for header parsing.
pub type Result<T> = core::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Truncated => write!(f, "truncated packet"),
            Error::Malformed => write!(f, "malformed packet"),
        }
    }
}
