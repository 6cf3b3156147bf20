//! The TCP output path of a network stack for IPv6 over IEEE 802.15.4 links (6LoWPAN).
//!
//! ## Table of contents
//!
//! 1. [Design](#design)
//! 2. [The wire module](wire/index.html)
//!    1. [IPv6 headers](wire/ipv6/index.html)
//!    1. [TCP headers](wire/tcp/index.html)
//!    1. [Link addresses](wire/ieee802154/index.html)
//! 3. [Network devices](nic/index.html)
//! 4. [The layer](layer/index.html)
//!    1. [Routing](layer/route/index.html)
//!    1. [Neighbors](layer/neighbor/index.html)
//!    1. [Sending](layer/output/index.html)
//!
//! ## Design
//!
//! TCP output towards an 802.15.4 neighbor comes from two places. A blocking `send` on a
//! connected stream socket produces data whose headers still need to be prepared, while the TCP
//! state machine leaves complete segments in the transmit buffer of a device while it processes
//! incoming packets. Both end up as one IPv6 datagram handed to a frame dispatcher, together with
//! the short link-layer address of the next hop. The dispatcher compresses and fragments the
//! datagram, which is not part of this crate.
//!
//! Nothing here locks on its own. The whole stack sits behind one [`NetLock`] and every entry
//! point requires the corresponding guard, so holding the network lock is checked by the type
//! system instead of being an assumption.
//!
//! Nothing within `lowpan-tcp` dynamically allocates memory. Devices, their transmit buffers and
//! the neighbor table are all backed by storage the caller hands in.
//!
//! [`NetLock`]: layer/struct.NetLock.html
#![warn(missing_docs)]
#![warn(unreachable_pub)]

// tests should be able to use `std`
#![cfg_attr(all(
    not(feature = "std"),
    not(test)),
no_std)]

#[macro_use] mod macros;
pub mod layer;
pub mod nic;
pub mod time;
pub mod wire;
