//! The boundary to the 6LoWPAN frame encoder.
//!
//! Header compression, fragmentation and queueing of 802.15.4 frames all happen behind
//! [`Dispatch`]. The output path builds a [`Datagram`] and calls the dispatcher exactly once per
//! datagram, it never retries and never inspects the produced frames.
//!
//! [`Dispatch`]: trait.Dispatch.html
//! [`Datagram`]: struct.Datagram.html
use super::{Errno, FnHandler};
use crate::nic::DeviceInfo;
use crate::time::Duration;
use crate::wire::{ipv6_packet, tcp_header, LinkAddress};

/// An outgoing IPv6 datagram carrying one TCP segment.
///
/// A borrowed view, valid only for the duration of the dispatch call.
#[derive(Clone, Copy, Debug)]
pub struct Datagram<'a> {
    header: &'a [u8],
    payload: &'a [u8],
}

/// Encodes and enqueues a datagram as 802.15.4 frames.
pub trait Dispatch {
    /// Send the datagram to a neighbor on a device.
    ///
    /// Blocks for at most `timeout` if one is given. Returns the number of bytes accepted or the
    /// reason of failure, which the caller reports unchanged.
    ///
    /// An error must carry a positive errno. It is negated for the `send` system call, where zero
    /// or a negative value would read as a byte count.
    fn dispatch(
        &mut self,
        device: &DeviceInfo,
        datagram: Datagram<'_>,
        dst: LinkAddress,
        timeout: Option<Duration>,
    ) -> Result<usize, Errno>;
}

impl<'a> Datagram<'a> {
    /// Combine the IPv6 and TCP headers with a payload.
    ///
    /// The header must start with a fixed IPv6 header, followed by the TCP header with options.
    pub(crate) fn new(header: &'a [u8], payload: &'a [u8]) -> Self {
        debug_assert!(header.len() >= crate::wire::ipv6::HEADER_LEN + crate::wire::tcp::HEADER_LEN);
        Datagram { header, payload }
    }

    /// The IPv6 and TCP headers.
    pub fn header(&self) -> &'a [u8] {
        self.header
    }

    /// The fixed IPv6 header.
    pub fn ipv6(&self) -> &'a ipv6_packet {
        ipv6_packet::new_unchecked(self.header)
    }

    /// The TCP header, including options.
    pub fn tcp(&self) -> &'a tcp_header {
        tcp_header::new_unchecked(&self.header[crate::wire::ipv6::HEADER_LEN..])
    }

    /// The segment data.
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// The length of headers and payload together.
    pub fn len(&self) -> usize {
        self.header.len() + self.payload.len()
    }
}

impl<F> Dispatch for FnHandler<F>
    where F: FnMut(&DeviceInfo, Datagram<'_>, LinkAddress, Option<Duration>) -> Result<usize, Errno>
{
    fn dispatch(
        &mut self,
        device: &DeviceInfo,
        datagram: Datagram<'_>,
        dst: LinkAddress,
        timeout: Option<Duration>,
    ) -> Result<usize, Errno> {
        (self.0)(device, datagram, dst, timeout)
    }
}

impl<D: Dispatch + ?Sized> Dispatch for &'_ mut D {
    fn dispatch(
        &mut self,
        device: &DeviceInfo,
        datagram: Datagram<'_>,
        dst: LinkAddress,
        timeout: Option<Duration>,
    ) -> Result<usize, Errno> {
        (**self).dispatch(device, datagram, dst, timeout)
    }
}
