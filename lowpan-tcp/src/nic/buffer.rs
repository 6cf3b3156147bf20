//! The per-device transmit buffer.
//!
//! The TCP state machine writes a complete IPv6 datagram to the start of the buffer and sets the
//! valid length. A nonzero length signals pending output, so whoever consumes the datagram must
//! reset it exactly once, see [`Drain`].
//!
//! [`Drain`]: struct.Drain.html
use core::ops;

/// Byte storage with an explicit valid length.
#[derive(Debug)]
pub struct TxBuffer<'a> {
    storage: &'a mut [u8],
    len: usize,
}

/// A consuming view of the pending output of a transmit buffer.
///
/// Dereferences to the valid bytes. The valid length is reset to zero when the view is dropped,
/// no matter what has been done with the bytes in between.
#[derive(Debug)]
pub struct Drain<'b, 'a> {
    buffer: &'b mut TxBuffer<'a>,
}

impl<'a> TxBuffer<'a> {
    /// Create an empty buffer on some storage.
    pub fn new(storage: &'a mut [u8]) -> Self {
        TxBuffer { storage, len: 0 }
    }

    /// The number of bytes the storage can hold.
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// The valid length.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if no output is pending.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The valid bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.storage[..self.len]
    }

    /// Make the first `len` bytes valid and return them for writing.
    ///
    /// Returns `None` and leaves the buffer untouched if the storage is too small.
    pub fn prepare(&mut self, len: usize) -> Option<&mut [u8]> {
        let region = self.storage.get_mut(..len)?;
        self.len = len;
        Some(region)
    }

    /// Take the pending output, clearing it when the returned view is dropped.
    pub fn drain(&mut self) -> Drain<'_, 'a> {
        Drain { buffer: self }
    }
}

impl ops::Deref for Drain<'_, '_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.buffer.as_slice()
    }
}

impl Drop for Drain<'_, '_> {
    fn drop(&mut self) {
        self.buffer.len = 0;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn prepare_within_capacity() {
        let mut storage = [0; 8];
        let mut buffer = TxBuffer::new(&mut storage[..]);
        assert!(buffer.is_empty());

        buffer.prepare(4).unwrap().copy_from_slice(&[1, 2, 3, 4]);
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.as_slice(), &[1, 2, 3, 4]);

        assert!(buffer.prepare(9).is_none());
        assert_eq!(buffer.len(), 4);
    }

    #[test]
    fn drain_resets_length() {
        let mut storage = [0; 8];
        let mut buffer = TxBuffer::new(&mut storage[..]);
        buffer.prepare(3).unwrap().copy_from_slice(&[7, 8, 9]);

        {
            let pending = buffer.drain();
            assert_eq!(&*pending, &[7, 8, 9]);
        }
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 8);
    }

    #[test]
    fn drain_resets_on_unwind() {
        let mut storage = [0; 8];
        let mut buffer = TxBuffer::new(&mut storage[..]);
        buffer.prepare(3).unwrap();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _pending = buffer.drain();
            panic!("dispatcher failed");
        }));
        assert!(result.is_err());
        assert!(buffer.is_empty());
    }
}
