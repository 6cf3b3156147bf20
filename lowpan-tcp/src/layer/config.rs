use super::route::Routing;

/// Run-time configuration of the output path.
///
/// The defaults describe an IPv6-only 6LoWPAN node with a single radio.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// How the outbound device is selected.
    pub routing: Routing,

    /// Require the peer to be in the neighbor cache before sending.
    pub neighbor_confirmation: bool,

    /// IPv4 is also configured on this node.
    ///
    /// Connections of another family can then reach the output path and are rejected.
    pub ipv4: bool,

    /// Socket options are supported, the send timeout of a socket is passed to the dispatcher.
    ///
    /// Otherwise the dispatcher never receives a timeout.
    pub socket_options: bool,

    /// The minimum size check applied to state machine output.
    pub size_check: SizeCheck,

    /// Hop limit of datagrams sent from a socket.
    pub hop_limit: u8,

    /// Receive window advertised in segments sent from a socket.
    pub window_len: u16,
}

/// How the length of a buffer from the state machine is compared to its headers.
///
/// The combined header length is the fixed IPv6 header and the TCP header including options. In
/// both policies a buffer that does not even contain the combined header is never dispatched,
/// and a buffer of exactly the combined header length is dispatched with an empty payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SizeCheck {
    /// Drop buffers shorter than the combined header length.
    Minimum,

    /// Drop buffers longer than the combined header length.
    ///
    /// This is the comparison found in earlier stacks, which rejects every segment carrying data.
    /// Pending confirmation of which behavior was intended, it is kept selectable.
    Inverted,
}

impl SizeCheck {
    /// Check if a buffer with `len` valid bytes and headers of `header_len` is dispatched.
    pub fn accepts(self, len: usize, header_len: usize) -> bool {
        if len < header_len {
            return false;
        }

        match self {
            SizeCheck::Minimum => true,
            SizeCheck::Inverted => !(header_len < len),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            routing: Routing::Single,
            neighbor_confirmation: true,
            ipv4: false,
            socket_options: true,
            size_check: SizeCheck::Minimum,
            hop_limit: 64,
            window_len: 1220,
        }
    }
}

impl Default for SizeCheck {
    fn default() -> Self {
        SizeCheck::Minimum
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn exact_header_length_accepted() {
        assert!(SizeCheck::Minimum.accepts(60, 60));
        assert!(SizeCheck::Inverted.accepts(60, 60));
    }

    #[test]
    fn truncated_never_accepted() {
        assert!(!SizeCheck::Minimum.accepts(59, 60));
        assert!(!SizeCheck::Inverted.accepts(59, 60));
    }

    #[test]
    fn payload_only_with_minimum() {
        assert!(SizeCheck::Minimum.accepts(100, 60));
        assert!(!SizeCheck::Inverted.accepts(100, 60));
    }
}
