//! Reference-counted stream chunks

use super::Timestamp;
use bytes::Bytes;
use std::ops::{Deref, Range};

/// An immutable, reference-counted chunk of stream data
///
/// Cloning is cheap: the payload is shared, never copied. Chunks are never
/// mutated once created, which lets the adapter hand out sub-slices of a
/// queued chunk without copying.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buffer {
    data: Bytes,
    /// Presentation timestamp of the first byte, if known
    pub pts: Timestamp,
}

impl Buffer {
    /// Create a new buffer from bytes
    pub fn new(data: Bytes) -> Self {
        Buffer {
            data,
            pts: Timestamp::none(),
        }
    }

    /// Create a buffer from a vector
    pub fn from_vec(vec: Vec<u8>) -> Self {
        Buffer::new(Bytes::from(vec))
    }

    /// Create a buffer by copying a slice
    pub fn copy_from_slice(data: &[u8]) -> Self {
        Buffer::new(Bytes::copy_from_slice(data))
    }

    /// Create an empty buffer
    pub fn empty() -> Self {
        Buffer::default()
    }

    /// Attach a presentation timestamp
    pub fn with_pts(mut self, pts: impl Into<Timestamp>) -> Self {
        self.pts = pts.into();
        self
    }

    /// Get the length of the buffer
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get a slice of the buffer data
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Get the underlying bytes
    pub fn as_bytes(&self) -> &Bytes {
        &self.data
    }

    /// Zero-copy sub-buffer sharing this buffer's storage
    ///
    /// The sub-buffer carries no timestamp.
    ///
    /// # Panics
    ///
    /// Panics if `range` is out of bounds.
    pub fn slice(&self, range: Range<usize>) -> Buffer {
        Buffer::new(self.data.slice(range))
    }

    /// Consume the buffer, returning the payload
    pub fn into_bytes(self) -> Bytes {
        self.data
    }
}

impl Deref for Buffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.data
    }
}

impl AsRef<[u8]> for Buffer {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl From<Bytes> for Buffer {
    fn from(data: Bytes) -> Self {
        Buffer::new(data)
    }
}

impl From<Vec<u8>> for Buffer {
    fn from(vec: Vec<u8>) -> Self {
        Buffer::from_vec(vec)
    }
}

impl From<&'static [u8]> for Buffer {
    fn from(data: &'static [u8]) -> Self {
        Buffer::new(Bytes::from_static(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_creation() {
        let buf = Buffer::from_vec(vec![1, 2, 3, 4]);
        assert_eq!(buf.len(), 4);
        assert_eq!(buf.as_slice(), &[1, 2, 3, 4]);
        assert!(!buf.pts.is_valid());
    }

    #[test]
    fn test_buffer_empty() {
        let buf = Buffer::empty();
        assert!(buf.is_empty());
        assert_eq!(buf.len(), 0);
    }

    #[test]
    fn test_buffer_slice_shares_storage() {
        let buf = Buffer::from_vec(vec![10, 11, 12, 13, 14]).with_pts(3000);
        let sub = buf.slice(1..4);
        assert_eq!(&*sub, &[11, 12, 13]);
        assert_eq!(sub.as_bytes().as_ptr(), buf.as_bytes()[1..].as_ptr());
        assert!(!sub.pts.is_valid());
        assert_eq!(buf.pts, Timestamp::new(3000));
    }
}
