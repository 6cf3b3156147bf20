//! Sockets and their TCP connection.
//!
//! Only the parts the output path reads or writes are modelled. The connection is owned by the
//! socket and only exists once one has been allocated by `connect` or `accept`.
use crate::time::Duration;
use crate::wire::Ipv6Address;

/// The type of a socket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SocketType {
    /// A byte stream, TCP.
    Stream,
    /// Datagrams, UDP.
    Datagram,
    /// Raw IP packets.
    Raw,
}

/// The address family of a connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Family {
    /// IPv4.
    Ipv4,
    /// IPv6.
    Ipv6,
}

/// Whether a send from the socket is in progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SendState {
    /// No send in progress.
    Idle,
    /// A frame is being dispatched on behalf of the socket.
    Sending,
}

/// The state of a TCP connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum State {
    #[allow(missing_docs)] Closed,
    #[allow(missing_docs)] Listen,
    #[allow(missing_docs)] SynSent,
    #[allow(missing_docs)] SynReceived,
    #[allow(missing_docs)] Established,
    #[allow(missing_docs)] FinWait1,
    #[allow(missing_docs)] FinWait2,
    #[allow(missing_docs)] CloseWait,
    #[allow(missing_docs)] Closing,
    #[allow(missing_docs)] LastAck,
    #[allow(missing_docs)] TimeWait,
}

/// One side of a connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Endpoint {
    /// The address, unspecified if not bound.
    pub addr: Ipv6Address,
    /// The port.
    pub port: u16,
}

/// The TCP connection of a socket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Connection {
    /// The address family.
    pub family: Family,
    /// Our side.
    pub local: Endpoint,
    /// The peer.
    pub remote: Endpoint,
    /// The connection state.
    pub state: State,
    /// The next sequence number to send.
    pub send_next: u32,
    /// The next sequence number expected from the peer.
    pub recv_next: u32,
}

/// A socket as seen by the output path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Socket {
    /// The number of references, zero if the socket has been closed.
    pub refs: u16,
    /// The type of the socket.
    pub kind: SocketType,
    /// The send-in-progress flag.
    pub send_state: SendState,
    /// The send timeout configured by socket options, if any.
    pub send_timeout: Option<Duration>,
    /// The connection, once allocated.
    pub conn: Option<Connection>,
}

/// Marks a socket as sending while alive.
///
/// The flag is reset to idle when the guard is dropped, on every exit path of a dispatch.
pub(crate) struct Sending<'a> {
    state: &'a mut SendState,
}

impl Endpoint {
    /// Create an endpoint.
    pub fn new(addr: Ipv6Address, port: u16) -> Self {
        Endpoint { addr, port }
    }
}

impl Connection {
    /// Create an established IPv6 connection.
    pub fn established(local: Endpoint, remote: Endpoint) -> Self {
        Connection {
            family: Family::Ipv6,
            local,
            remote,
            state: State::Established,
            send_next: 0,
            recv_next: 0,
        }
    }

    /// Check if data can be sent.
    pub fn is_established(&self) -> bool {
        self.state == State::Established
    }
}

impl Socket {
    /// A referenced, idle socket of the given type without connection.
    pub fn new(kind: SocketType) -> Self {
        Socket {
            refs: 1,
            kind,
            send_state: SendState::Idle,
            send_timeout: None,
            conn: None,
        }
    }

    /// A referenced, idle stream socket with a connection.
    pub fn connected(conn: Connection) -> Self {
        Socket {
            conn: Some(conn),
            ..Socket::new(SocketType::Stream)
        }
    }

    /// Check if a send is in progress.
    pub fn is_sending(&self) -> bool {
        self.send_state == SendState::Sending
    }
}

impl<'a> Sending<'a> {
    pub(crate) fn new(state: &'a mut SendState) -> Self {
        *state = SendState::Sending;
        Sending { state }
    }
}

impl Drop for Sending<'_> {
    fn drop(&mut self) {
        *self.state = SendState::Idle;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sending_guard_restores_idle() {
        let mut socket = Socket::new(SocketType::Stream);
        {
            let _sending = Sending::new(&mut socket.send_state);
        }
        assert!(!socket.is_sending());

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _sending = Sending::new(&mut socket.send_state);
            panic!("dispatch aborted");
        }));
        assert!(result.is_err());
        assert_eq!(socket.send_state, SendState::Idle);
    }

    #[test]
    fn connected_socket() {
        let local = Endpoint::new(Ipv6Address::from_short_address([0, 1]), 49152);
        let remote = Endpoint::new(Ipv6Address::from_short_address([0, 2]), 80);
        let socket = Socket::connected(Connection::established(local, remote));
        assert_eq!(socket.kind, SocketType::Stream);
        assert!(socket.conn.map_or(false, |conn| conn.is_established()));
    }
}
