//! The fixed TCP header.
//!
//! Only what the output path needs: locating the end of the header (the data offset) in segments
//! prepared by the state machine, and filling the header of segments sent from a socket. Options
//! are carried opaquely as part of the header.
use core::{fmt, ops};
use byteorder::{ByteOrder, NetworkEndian};

use super::{Error, Result};

/// Length of a TCP header without options.
pub const HEADER_LEN: usize = field::URGENT.end;

/// Largest header length expressible by the data offset field.
pub const MAX_HEADER_LEN: usize = 60;

byte_wrapper! {
    /// A byte sequence starting with a TCP header.
    #[derive(Debug, PartialEq, Eq)]
    pub struct tcp_header([u8]);
}

mod field {
    use crate::wire::field::Field;

    pub(crate) const SRC_PORT: Field = 0..2;
    pub(crate) const DST_PORT: Field = 2..4;
    pub(crate) const SEQ_NUM:  Field = 4..8;
    pub(crate) const ACK_NUM:  Field = 8..12;
    pub(crate) const FLAGS:    Field = 12..14;
    pub(crate) const WIN_SIZE: Field = 14..16;
    pub(crate) const CHECKSUM: Field = 16..18;
    pub(crate) const URGENT:   Field = 18..20;
}

/// The control bits of a TCP header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Flags(pub u16);

impl Flags {
    /// No more data from sender.
    pub const FIN: Flags = Flags(0x001);
    /// Synchronize sequence numbers.
    pub const SYN: Flags = Flags(0x002);
    /// Reset the connection.
    pub const RST: Flags = Flags(0x004);
    /// Push function.
    pub const PSH: Flags = Flags(0x008);
    /// Acknowledgment field significant.
    pub const ACK: Flags = Flags(0x010);

    /// Check if all bits of `other` are set.
    pub fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl ops::BitOr for Flags {
    type Output = Flags;

    fn bitor(self, other: Flags) -> Flags {
        Flags(self.0 | other.0)
    }
}

impl tcp_header {
    /// Imbue a raw octet buffer with TCP header structure.
    #[inline]
    pub fn new_unchecked(buffer: &[u8]) -> &Self {
        Self::__from_macro_new_unchecked(buffer)
    }

    /// Imbue a mutable raw octet buffer with TCP header structure.
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
        let header = Self::new_unchecked(buffer);
        header.check_len()?;
        Ok(header)
    }

    /// Ensure that the fixed fields and the options are within the buffer.
    ///
    /// Returns `Err(Error::Malformed)` if the data offset points into the fixed fields.
    pub fn check_len(&self) -> Result<()> {
        if self.0.len() < HEADER_LEN {
            return Err(Error::Truncated);
        }
        let header_len = self.header_len();
        if header_len < HEADER_LEN {
            Err(Error::Malformed)
        } else if self.0.len() < header_len {
            Err(Error::Truncated)
        } else {
            Ok(())
        }
    }

    /// Return the source port field.
    #[inline]
    pub fn src_port(&self) -> u16 {
        NetworkEndian::read_u16(&self.0[field::SRC_PORT])
    }

    /// Return the destination port field.
    #[inline]
    pub fn dst_port(&self) -> u16 {
        NetworkEndian::read_u16(&self.0[field::DST_PORT])
    }

    /// Return the sequence number field.
    #[inline]
    pub fn seq_number(&self) -> u32 {
        NetworkEndian::read_u32(&self.0[field::SEQ_NUM])
    }

    /// Return the acknowledgement number field.
    #[inline]
    pub fn ack_number(&self) -> u32 {
        NetworkEndian::read_u32(&self.0[field::ACK_NUM])
    }

    /// Return the header length, in octets, from the data offset.
    #[inline]
    pub fn header_len(&self) -> usize {
        let raw = NetworkEndian::read_u16(&self.0[field::FLAGS]);
        usize::from(raw >> 12) * 4
    }

    /// Return the control bits.
    #[inline]
    pub fn flags(&self) -> Flags {
        let raw = NetworkEndian::read_u16(&self.0[field::FLAGS]);
        Flags(raw & 0x01ff)
    }

    /// Return the window size field.
    #[inline]
    pub fn window_len(&self) -> u16 {
        NetworkEndian::read_u16(&self.0[field::WIN_SIZE])
    }

    /// Set the source port field.
    #[inline]
    pub fn set_src_port(&mut self, value: u16) {
        NetworkEndian::write_u16(&mut self.0[field::SRC_PORT], value)
    }

    /// Set the destination port field.
    #[inline]
    pub fn set_dst_port(&mut self, value: u16) {
        NetworkEndian::write_u16(&mut self.0[field::DST_PORT], value)
    }

    /// Set the sequence number field.
    #[inline]
    pub fn set_seq_number(&mut self, value: u32) {
        NetworkEndian::write_u32(&mut self.0[field::SEQ_NUM], value)
    }

    /// Set the acknowledgement number field.
    #[inline]
    pub fn set_ack_number(&mut self, value: u32) {
        NetworkEndian::write_u32(&mut self.0[field::ACK_NUM], value)
    }

    /// Set the data offset and the control bits together.
    #[inline]
    pub fn set_header_len_and_flags(&mut self, header_len: usize, flags: Flags) {
        debug_assert!(header_len % 4 == 0 && header_len <= MAX_HEADER_LEN);
        let raw = ((header_len / 4) as u16) << 12 | (flags.0 & 0x01ff);
        NetworkEndian::write_u16(&mut self.0[field::FLAGS], raw)
    }

    /// Set the window size field.
    #[inline]
    pub fn set_window_len(&mut self, value: u16) {
        NetworkEndian::write_u16(&mut self.0[field::WIN_SIZE], value)
    }

    /// Zero the checksum and urgent pointer.
    ///
    /// The checksum is elided or recomputed by header compression on 802.15.4 links.
    #[inline]
    pub fn clear_checksum_and_urgent(&mut self) {
        NetworkEndian::write_u16(&mut self.0[field::CHECKSUM], 0);
        NetworkEndian::write_u16(&mut self.0[field::URGENT], 0);
    }
}

/// A high-level representation of a TCP header without options.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Repr {
    /// The source port.
    pub src_port:   u16,
    /// The destination port.
    pub dst_port:   u16,
    /// Sequence number of the first data octet.
    pub seq_number: u32,
    /// The next sequence number expected from the remote.
    pub ack_number: u32,
    /// The control bits.
    pub flags:      Flags,
    /// The advertised receive window.
    pub window_len: u16,
}

impl Repr {
    /// Parse the fixed part of a TCP header.
    pub fn parse(header: &tcp_header) -> Result<Repr> {
        header.check_len()?;
        Ok(Repr {
            src_port: header.src_port(),
            dst_port: header.dst_port(),
            seq_number: header.seq_number(),
            ack_number: header.ack_number(),
            flags: header.flags(),
            window_len: header.window_len(),
        })
    }

    /// Return the length of a header that will be emitted from this high-level representation.
    pub fn buffer_len(&self) -> usize {
        HEADER_LEN
    }

    /// Emit a high-level representation into a TCP header.
    pub fn emit(&self, header: &mut tcp_header) {
        header.set_src_port(self.src_port);
        header.set_dst_port(self.dst_port);
        header.set_seq_number(self.seq_number);
        header.set_ack_number(self.ack_number);
        header.set_header_len_and_flags(HEADER_LEN, self.flags);
        header.set_window_len(self.window_len);
        header.clear_checksum_and_urgent();
    }
}

impl fmt::Display for Repr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "TCP src={} dst={} seq={} ack={} win={}",
               self.src_port, self.dst_port, self.seq_number, self.ack_number, self.window_len)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    static SEGMENT_BYTES: [u8; 24] =
        [0xbf, 0x00, 0x00, 0x50, 0x01, 0x23, 0x45, 0x67,
         0x89, 0xab, 0xcd, 0xef, 0x60, 0x18, 0x01, 0x23,
         0x00, 0x00, 0x00, 0x00, 0x02, 0x04, 0x05, 0xb4];

    #[test]
    fn deconstruct() {
        let header = tcp_header::new_checked(&SEGMENT_BYTES[..]).unwrap();
        assert_eq!(header.src_port(), 48896);
        assert_eq!(header.dst_port(), 80);
        assert_eq!(header.seq_number(), 0x01234567);
        assert_eq!(header.ack_number(), 0x89abcdef);
        assert_eq!(header.header_len(), 24);
        assert_eq!(header.flags(), Flags::PSH | Flags::ACK);
        assert_eq!(header.window_len(), 0x0123);
    }

    #[test]
    fn options_beyond_buffer() {
        assert_eq!(tcp_header::new_checked(&SEGMENT_BYTES[..20]), Err(Error::Truncated));
    }

    #[test]
    fn offset_into_fixed_fields() {
        let mut bytes = SEGMENT_BYTES;
        bytes[12] = 0x40;
        assert_eq!(tcp_header::new_checked(&bytes[..]), Err(Error::Malformed));
    }

    #[test]
    fn emit() {
        let repr = Repr {
            src_port: 48896,
            dst_port: 80,
            seq_number: 0x01234567,
            ack_number: 0x89abcdef,
            flags: Flags::PSH | Flags::ACK,
            window_len: 0x0123,
        };
        let mut bytes = [0xff; HEADER_LEN];
        repr.emit(tcp_header::new_unchecked_mut(&mut bytes));
        assert_eq!(&bytes[..12], &SEGMENT_BYTES[..12]);
        assert_eq!(bytes[12], 0x50);
        assert_eq!(&bytes[13..], &SEGMENT_BYTES[13..20]);
        assert_eq!(Repr::parse(tcp_header::new_unchecked(&bytes)), Ok(repr));
    }
}
