//! The two entry points of TCP output.
//!
//! [`send`] is called on behalf of a connected stream socket and reports its outcome. [`flush`]
//! is called after the TCP state machine has left a segment in a device's transmit buffer and
//! only logs. Both funnel into a single call of the frame dispatcher.
//!
//! [`send`]: fn.send.html
//! [`flush`]: fn.flush.html
use super::{Datagram, Dispatch, Error, Errno, NetGuard, Resolve, Result, SizeCheck, Stack};
use super::socket::{Family, Sending, Socket, SocketType};
use crate::nic::{DeviceId, DeviceInfo};
use crate::time::Duration;
use crate::wire::{ipv6, tcp};
use crate::wire::{derive_link_address, ipv6_packet, tcp_header, IpProtocol, Ipv6Repr};
use crate::wire::{LinkAddress, TcpFlags, TcpRepr};

/// Send data of a connected stream socket to its peer.
///
/// The headers are prepared from the connection and the configuration. On success, returns the
/// number of bytes the dispatcher accepted.
///
/// The socket is marked as sending for exactly the duration of the dispatch. It is idle again
/// when this function returns, whatever the outcome.
///
/// # Errors
///
/// Checked in this order:
///
/// * [`InvalidHandle`] if the socket is not referenced.
/// * [`NotConnected`] if it is not a stream socket or its connection is not established.
/// * [`WrongProtocolFamily`] if IPv4 is configured and the connection is not IPv6.
/// * [`NotRoutable`] if no device qualifies or the peer is not a confirmed neighbor.
/// * [`Dispatch`] with the dispatcher's own error.
///
/// [`InvalidHandle`]: ../enum.Error.html#variant.InvalidHandle
/// [`NotConnected`]: ../enum.Error.html#variant.NotConnected
/// [`WrongProtocolFamily`]: ../enum.Error.html#variant.WrongProtocolFamily
/// [`NotRoutable`]: ../enum.Error.html#variant.NotRoutable
/// [`Dispatch`]: ../enum.Error.html#variant.Dispatch
pub fn send<'a, R, D>(
    net: &mut NetGuard<'_, Stack<'a, R, D>>,
    socket: &mut Socket,
    data: &[u8],
) -> Result<usize>
    where R: Resolve, D: Dispatch,
{
    if socket.refs == 0 {
        net_error!("send on an invalid socket");
        return Err(Error::InvalidHandle);
    }

    let conn = match socket.conn {
        Some(conn) if socket.kind == SocketType::Stream && conn.is_established() => conn,
        _ => {
            net_error!("send on a socket that is not connected");
            return Err(Error::NotConnected);
        },
    };

    let parts = net.parts();

    if parts.config.ipv4 && conn.family != Family::Ipv6 {
        net_warn!("send on a connection that is not IPv6");
        return Err(Error::WrongProtocolFamily);
    }

    let id = parts.resolver.resolve(parts.devices, &conn, parts.now)?;
    let info = match parts.devices.get(id) {
        Some(device) => device.info,
        None => {
            net_error!("route to {} through missing device {}", conn.remote.addr, id);
            return Err(Error::NotRoutable);
        },
    };

    let src_addr = if conn.local.addr.is_unspecified() {
        info.address.address()
    } else {
        conn.local.addr
    };

    let mut header = [0; ipv6::HEADER_LEN + tcp::HEADER_LEN];
    let ip_repr = Ipv6Repr {
        src_addr,
        dst_addr: conn.remote.addr,
        next_header: IpProtocol::Tcp,
        payload_len: tcp::HEADER_LEN + data.len(),
        hop_limit: parts.config.hop_limit,
    };
    let tcp_repr = TcpRepr {
        src_port: conn.local.port,
        dst_port: conn.remote.port,
        seq_number: conn.send_next,
        ack_number: conn.recv_next,
        flags: TcpFlags::PSH | TcpFlags::ACK,
        window_len: parts.config.window_len,
    };
    {
        let (ip_bytes, tcp_bytes) = header.split_at_mut(ipv6::HEADER_LEN);
        ip_repr.emit(ipv6_packet::new_unchecked_mut(ip_bytes));
        tcp_repr.emit(tcp_header::new_unchecked_mut(tcp_bytes));
    }

    let dst = derive_link_address(conn.remote.addr);
    let timeout = if parts.config.socket_options {
        socket.send_timeout
    } else {
        None
    };

    net_trace!("{} on {}: {}", ip_repr.dst_addr, id, tcp_repr);
    let _sending = Sending::new(&mut socket.send_state);
    transmit(parts.dispatcher, &info, Datagram::new(&header, data), dst, timeout)
        .map_err(Error::Dispatch)
}

/// Dispatch the segment the state machine left in a device's transmit buffer.
///
/// Nothing happens if no output is pending, so repeating a flush is harmless. Otherwise the
/// buffer is expected to hold an IPv6 datagram with a TCP segment. Anything that fails to meet
/// this or the configured [`SizeCheck`] is dropped with a warning. A dispatch failure is logged
/// and not retried. In every case the pending output is consumed.
///
/// [`SizeCheck`]: ../enum.SizeCheck.html
pub fn flush<'a, R, D>(net: &mut NetGuard<'_, Stack<'a, R, D>>, id: DeviceId)
    where R: Resolve, D: Dispatch,
{
    let parts = net.parts();
    let device = match parts.devices.get_mut(id) {
        Some(device) => device,
        None => {
            net_warn!("flush on missing device {}", id);
            return;
        },
    };

    if device.tx.is_empty() {
        return;
    }

    let info = device.info;
    let pending = device.tx.drain();
    let header_len = match segment_header_len(&pending, parts.config.size_check) {
        Some(header_len) => header_len,
        None => return,
    };

    let (header, payload) = pending.split_at(header_len);
    let dst = derive_link_address(ipv6_packet::new_unchecked(header).dst_addr());
    let _ = transmit(parts.dispatcher, &info, Datagram::new(header, payload), dst, None);
}

/// Convert the outcome of [`send`] to the return value of a `send` system call.
///
/// A byte count on success, the negated errno on failure.
///
/// [`send`]: fn.send.html
pub fn into_ssize(result: Result<usize>) -> isize {
    match result {
        Ok(len) => len as isize,
        Err(err) => -(err.errno().0 as isize),
    }
}

/// The length of the IPv6 and TCP headers of a pending segment, or `None` to drop it.
fn segment_header_len(buffer: &[u8], policy: SizeCheck) -> Option<usize> {
    let packet = match ipv6_packet::new_checked(buffer) {
        Ok(packet) => packet,
        Err(_) => {
            net_warn!("packet too small: {} bytes", buffer.len());
            return None;
        },
    };

    let next_header = packet.next_header();
    if next_header != IpProtocol::Tcp {
        net_warn!("expected a TCP segment, next header is {}", next_header);
        return None;
    }

    let segment = packet.payload_slice();
    let tcp_len = if segment.len() >= tcp::HEADER_LEN {
        tcp_header::new_unchecked(segment).header_len().max(tcp::HEADER_LEN)
    } else {
        tcp::HEADER_LEN
    };

    let header_len = ipv6::HEADER_LEN + tcp_len;
    if !policy.accepts(buffer.len(), header_len) {
        net_warn!("dropping segment of {} bytes with {} bytes of headers", buffer.len(), header_len);
        return None;
    }

    Some(header_len)
}

fn transmit<D: Dispatch>(
    dispatcher: &mut D,
    info: &DeviceInfo,
    datagram: Datagram<'_>,
    dst: LinkAddress,
    timeout: Option<Duration>,
) -> core::result::Result<usize, Errno> {
    let len = datagram.len();
    match dispatcher.dispatch(info, datagram, dst, timeout) {
        Ok(sent) => {
            net_debug!("dispatched {} bytes to {} on {}", len, dst, info.id);
            Ok(sent)
        },
        Err(errno) => {
            debug_assert!(errno.0 > 0, "dispatcher reported errno {}", errno.0);
            net_error!("dispatch of {} bytes to {} on {} failed: {}", len, dst, info.id, errno);
            Err(errno)
        },
    }
}
