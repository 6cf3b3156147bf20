//! The processing logic of the output path.
//!
//! ## Structure
//!
//! All state the output path touches lives in one [`Stack`]: the device table, the route
//! resolver (which owns the neighbor cache), the frame dispatcher and the [`Config`]. The stack
//! is placed behind a [`NetLock`]. Both entry points in [`output`] take the [`NetGuard`] so that
//! holding the network lock is a precondition the compiler checks.
//!
//! ## Sending from a socket
//!
//! [`output::send`] validates the socket and its connection, resolves the outbound device and the
//! reachability of the peer, prepares the IPv6 and TCP headers and hands the datagram to the
//! dispatcher. The result is a byte count or an [`Error`] with a POSIX errno, which
//! [`output::into_ssize`] converts into the return value of a `send` system call.
//!
//! ## Sending from the state machine
//!
//! [`output::flush`] consumes the datagram the TCP state machine placed in a device's transmit
//! buffer. There is nobody to report an error to, so malformed buffers are logged and dropped.
//! The transmit buffer is empty afterwards in every case.
//!
//! [`Stack`]: struct.Stack.html
//! [`Config`]: struct.Config.html
//! [`NetLock`]: struct.NetLock.html
//! [`NetGuard`]: struct.NetGuard.html
//! [`Error`]: enum.Error.html
//! [`output`]: output/index.html
//! [`output::send`]: output/fn.send.html
//! [`output::flush`]: output/fn.flush.html
//! [`output::into_ssize`]: output/fn.into_ssize.html
use core::fmt;

mod config;
pub mod dispatch;
mod lock;
pub mod neighbor;
pub mod output;
pub mod route;
pub mod socket;
mod stack;

pub use self::config::{Config, SizeCheck};
pub use self::dispatch::{Datagram, Dispatch};
pub use self::lock::{NetGuard, NetLock};
pub use self::route::{Resolve, RouteError, Router, Routing};
pub use self::socket::{Connection, Socket};
pub use self::stack::Stack;

/// The result type of the socket-initiated send path.
pub type Result<T> = core::result::Result<T, Error>;

/// The reasons a send from a socket fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Error {
    /// The socket is not referenced by anyone.
    InvalidHandle,

    /// Not a stream socket, or its connection is not established.
    ///
    /// The caller needs to connect first.
    NotConnected,

    /// The connection is not an IPv6 connection.
    ///
    /// Only reported when IPv4 is configured, indicates misuse of the API.
    WrongProtocolFamily,

    /// No suitable device, or the peer is not a confirmed neighbor.
    ///
    /// The topology may change later but this is not retried or waited upon.
    NotRoutable,

    /// The frame dispatcher failed with its own error, which is passed on unchanged.
    Dispatch(Errno),
}

/// A positive POSIX error number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Errno(pub i32);

impl Errno {
    /// Bad file descriptor.
    pub const EBADF: Errno = Errno(libc::EBADF);
    /// The socket is not connected.
    pub const ENOTCONN: Errno = Errno(libc::ENOTCONN);
    /// Protocol wrong type for socket.
    pub const EPROTOTYPE: Errno = Errno(libc::EPROTOTYPE);
    /// Network is unreachable.
    pub const ENETUNREACH: Errno = Errno(libc::ENETUNREACH);
    /// Resource temporarily unavailable.
    pub const EAGAIN: Errno = Errno(libc::EAGAIN);
    /// Message too long.
    pub const EMSGSIZE: Errno = Errno(libc::EMSGSIZE);
    /// Operation timed out.
    pub const ETIMEDOUT: Errno = Errno(libc::ETIMEDOUT);
}

impl Error {
    /// The POSIX error number corresponding to this error.
    pub fn errno(self) -> Errno {
        match self {
            Error::InvalidHandle => Errno::EBADF,
            Error::NotConnected => Errno::ENOTCONN,
            Error::WrongProtocolFamily => Errno::EPROTOTYPE,
            Error::NotRoutable => Errno::ENETUNREACH,
            Error::Dispatch(errno) => errno,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidHandle => write!(f, "invalid socket"),
            Error::NotConnected => write!(f, "socket not connected"),
            Error::WrongProtocolFamily => write!(f, "connection is not IPv6"),
            Error::NotRoutable => write!(f, "destination not routable"),
            Error::Dispatch(errno) => write!(f, "frame dispatch failed: {}", errno),
        }
    }
}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "errno {}", self.0)
    }
}

/// A standard wrapper for a function implementing one of the traits of this layer.
///
/// Closures can serve as frame dispatcher or route resolver without a named type.
pub struct FnHandler<F>(pub F);
