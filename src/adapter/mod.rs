//! Byte-stream reassembly
//!
//! A [`ByteAdapter`] accepts chunks of arbitrary size in arrival order and
//! serves the concatenated stream back as windows of whatever size the
//! consumer needs: a parser asking for a 4-byte start code, a decoder asking
//! for a whole frame, and so on.
//!
//! ## Fast paths
//!
//! - A window that lies inside the head chunk is returned as a direct view
//!   (`peek`) or a zero-copy slice (`take`).
//! - A window spanning chunks is assembled once into an internal scratch
//!   buffer. Repeated peeks of the same or a smaller size reuse it until the
//!   next flush.
//!
//! ## Usage
//!
//! ```rust
//! use zvd_shape::adapter::ByteAdapter;
//!
//! let mut adapter = ByteAdapter::new();
//! adapter.push(vec![1u8, 2, 3, 4, 5]);
//! adapter.push(vec![6u8, 7, 8]);
//!
//! assert_eq!(adapter.peek(6).unwrap(), &[1, 2, 3, 4, 5, 6]);
//! adapter.flush(2);
//! assert_eq!(adapter.peek(6).unwrap(), &[3, 4, 5, 6, 7, 8]);
//! ```

use crate::error::{Error, Result};
use crate::util::{Buffer, Timestamp};
use bytes::{Bytes, BytesMut};
use std::collections::VecDeque;
use tracing::{debug, trace};

/// Allocation granularity of the assembly buffer
const ASSEMBLE_BLOCK: usize = 16;

/// Accumulates byte chunks and serves them back as contiguous windows
///
/// The adapter is a single-owner structure: it does no locking, and a
/// view returned by [`peek`](ByteAdapter::peek) borrows the adapter until the
/// next mutating call.
#[derive(Debug, Default)]
pub struct ByteAdapter {
    chunks: VecDeque<Buffer>,
    /// Unconsumed bytes across all queued chunks
    size: usize,
    /// Bytes already consumed from the head chunk
    skip: usize,
    assembled: BytesMut,
    /// Valid bytes in `assembled`, 0 when stale
    assembled_len: usize,
    pts: Timestamp,
    pts_distance: u64,
    distance_from_discont: u64,
}

impl ByteAdapter {
    /// Create an empty adapter
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk to the end of the stream
    ///
    /// Empty chunks are accepted and dropped.
    pub fn push(&mut self, chunk: impl Into<Buffer>) {
        let chunk = chunk.into();
        let len = chunk.len();
        if len == 0 {
            trace!("dropping empty chunk");
            return;
        }

        if self.chunks.is_empty() {
            self.update_pts(&chunk);
        }

        self.size += len;
        trace!(len, available = self.size, "pushed chunk");
        self.chunks.push_back(chunk);
    }

    /// Drop all queued data and reset the stream position
    ///
    /// The assembly buffer keeps its allocation.
    pub fn clear(&mut self) {
        debug!(discarded = self.size, "clearing adapter");
        self.chunks.clear();
        self.size = 0;
        self.skip = 0;
        self.assembled_len = 0;
        self.pts = Timestamp::none();
        self.pts_distance = 0;
        self.distance_from_discont = 0;
    }

    /// Number of bytes that can be peeked or taken
    pub fn available(&self) -> usize {
        self.size
    }

    /// Number of bytes that can be peeked without copying
    pub fn available_fast(&self) -> usize {
        if self.assembled_len > 0 {
            return self.assembled_len;
        }
        self.chunks
            .front()
            .map_or(0, |head| head.len() - self.skip)
    }

    /// Check if no bytes are queued
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Bytes consumed since the adapter was created or last cleared
    pub fn distance_from_discont(&self) -> u64 {
        self.distance_from_discont
    }

    /// The last valid timestamp at or before the read position, and the
    /// number of bytes consumed since the chunk carrying it started
    pub fn prev_pts(&self) -> (Timestamp, u64) {
        (self.pts, self.pts_distance)
    }

    /// View the next `size` bytes without consuming them
    ///
    /// The view stays valid until the next call that mutates the adapter.
    /// Fails with [`Error::BufferTooSmall`] if fewer than `size` bytes are
    /// queued; a truncated window is never returned.
    pub fn peek(&mut self, size: usize) -> Result<&[u8]> {
        if size > self.size {
            return Err(Error::too_small(size, self.size));
        }
        if size == 0 {
            return Ok(&[]);
        }

        if self.assembled_len >= size {
            trace!(size, "peek from assembled cache");
            return Ok(&self.assembled[..size]);
        }

        if self.head_available() >= size {
            let skip = self.skip;
            return Ok(&self.chunks[0][skip..skip + size]);
        }

        self.assemble(size);
        Ok(&self.assembled[..size])
    }

    /// Consume the next `n` bytes
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds [`available`](ByteAdapter::available). Use
    /// [`try_flush`](ByteAdapter::try_flush) when the amount is not already
    /// known to be queued.
    pub fn flush(&mut self, n: usize) {
        assert!(
            n <= self.size,
            "flush of {} bytes exceeds the {} available",
            n,
            self.size
        );
        self.flush_unchecked(n);
    }

    /// Consume the next `n` bytes, failing if fewer are queued
    pub fn try_flush(&mut self, n: usize) -> Result<()> {
        if n > self.size {
            return Err(Error::too_small(n, self.size));
        }
        self.flush_unchecked(n);
        Ok(())
    }

    /// Consume the next `n` bytes and return them as an owned buffer
    ///
    /// When the window lies inside the head chunk the result shares that
    /// chunk's storage. The returned buffer carries the head chunk's
    /// timestamp if the window starts exactly at the chunk start.
    pub fn take(&mut self, n: usize) -> Result<Buffer> {
        if n > self.size {
            return Err(Error::too_small(n, self.size));
        }
        if n == 0 {
            return Ok(Buffer::empty());
        }

        let pts = match self.chunks.front() {
            Some(head) if self.skip == 0 => head.pts,
            _ => Timestamp::none(),
        };

        let buffer = if self.head_available() >= n {
            let skip = self.skip;
            self.chunks[0].slice(skip..skip + n)
        } else {
            let data = Bytes::copy_from_slice(self.peek(n)?);
            Buffer::new(data)
        };

        self.flush_unchecked(n);
        Ok(buffer.with_pts(pts))
    }

    /// Consume the next `n` bytes into a freshly allocated vector
    pub fn take_vec(&mut self, n: usize) -> Result<Vec<u8>> {
        let data = self.peek(n)?.to_vec();
        self.flush_unchecked(n);
        Ok(data)
    }

    /// Copy `dest.len()` bytes starting `offset` bytes past the read position
    ///
    /// Nothing is consumed and the assembly cache is left alone.
    pub fn copy_to(&self, dest: &mut [u8], offset: usize) -> Result<()> {
        let need = offset
            .checked_add(dest.len())
            .ok_or_else(|| Error::invalid_input("copy range overflows"))?;
        if need > self.size {
            return Err(Error::too_small(need, self.size));
        }
        copy_from_chunks(&self.chunks, self.skip + offset, dest);
        Ok(())
    }

    /// Find the first big-endian 32-bit word `w` with `w & mask == pattern`
    ///
    /// Only words lying entirely inside `[offset, offset + size)` are
    /// considered. Returns the match position relative to the read position.
    pub fn masked_scan_u32(
        &self,
        mask: u32,
        pattern: u32,
        offset: usize,
        size: usize,
    ) -> Result<Option<usize>> {
        let end = offset
            .checked_add(size)
            .ok_or_else(|| Error::invalid_input("scan range overflows"))?;
        if end > self.size {
            return Err(Error::invalid_input(format!(
                "scan range {}..{} exceeds the {} available bytes",
                offset, end, self.size
            )));
        }
        if pattern & !mask != 0 {
            return Err(Error::invalid_input("pattern has bits outside mask"));
        }

        let mut state: u32 = 0;
        for (i, byte) in self.bytes_from(offset).take(size).enumerate() {
            state = (state << 8) | u32::from(byte);
            if i >= 3 && state & mask == pattern {
                return Ok(Some(offset + i - 3));
            }
        }
        Ok(None)
    }

    fn head_available(&self) -> usize {
        self.chunks
            .front()
            .map_or(0, |head| head.len() - self.skip)
    }

    fn bytes_from(&self, offset: usize) -> impl Iterator<Item = u8> + '_ {
        let mut skip = self.skip + offset;
        self.chunks.iter().flat_map(move |chunk| {
            let start = skip.min(chunk.len());
            skip -= start;
            chunk[start..].iter().copied()
        })
    }

    fn assemble(&mut self, size: usize) {
        let rounded = (size + ASSEMBLE_BLOCK - 1) & !(ASSEMBLE_BLOCK - 1);
        if self.assembled.len() < rounded {
            debug!(from = self.assembled.len(), to = rounded, "growing assembly buffer");
            self.assembled.resize(rounded, 0);
        }

        trace!(size, chunks = self.chunks.len(), "assembling window");
        copy_from_chunks(&self.chunks, self.skip, &mut self.assembled[..size]);
        self.assembled_len = size;
    }

    fn flush_unchecked(&mut self, n: usize) {
        trace!(n, available = self.size, "flushing");
        self.size -= n;
        self.assembled_len = 0;
        self.distance_from_discont += n as u64;

        let mut remaining = n;
        while remaining > 0 {
            let head_avail = self.head_available();
            if remaining < head_avail {
                self.skip += remaining;
                self.pts_distance += remaining as u64;
                break;
            }

            remaining -= head_avail;
            self.pts_distance += head_avail as u64;
            self.skip = 0;
            self.chunks.pop_front();

            if let Some(next) = self.chunks.front() {
                let pts = next.pts;
                if pts.is_valid() {
                    self.pts = pts;
                    self.pts_distance = 0;
                }
            }
        }
    }

    fn update_pts(&mut self, head: &Buffer) {
        if head.pts.is_valid() {
            self.pts = head.pts;
            self.pts_distance = 0;
        }
    }
}

/// Fill `dest` from the chunk queue, starting `skip` bytes into the first chunk
fn copy_from_chunks(chunks: &VecDeque<Buffer>, mut skip: usize, dest: &mut [u8]) {
    let mut filled = 0;
    for chunk in chunks {
        if filled == dest.len() {
            break;
        }
        if skip >= chunk.len() {
            skip -= chunk.len();
            continue;
        }
        let n = (chunk.len() - skip).min(dest.len() - filled);
        dest[filled..filled + n].copy_from_slice(&chunk[skip..skip + n]);
        filled += n;
        skip = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter_with(chunks: &[&[u8]]) -> ByteAdapter {
        let mut adapter = ByteAdapter::new();
        for chunk in chunks {
            adapter.push(Buffer::copy_from_slice(chunk));
        }
        adapter
    }

    #[test]
    fn test_push_and_available() {
        let mut adapter = ByteAdapter::new();
        assert!(adapter.is_empty());
        assert_eq!(adapter.available_fast(), 0);

        adapter.push(vec![1u8, 2, 3]);
        adapter.push(Vec::<u8>::new());
        adapter.push(vec![4u8, 5]);
        assert_eq!(adapter.available(), 5);
        assert_eq!(adapter.available_fast(), 3);
    }

    #[test]
    fn test_peek_spanning_chunks() {
        let mut adapter = adapter_with(&[&[1, 2, 3, 4, 5], &[6, 7, 8]]);
        assert_eq!(adapter.available(), 8);
        assert_eq!(adapter.peek(6).unwrap(), &[1, 2, 3, 4, 5, 6]);

        adapter.flush(2);
        assert_eq!(adapter.available(), 6);
        assert_eq!(adapter.peek(6).unwrap(), &[3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_peek_head_is_zero_copy() {
        let chunk = Buffer::from_vec(vec![9, 8, 7, 6]);
        let head_ptr = chunk.as_ptr();
        let mut adapter = ByteAdapter::new();
        adapter.push(chunk);
        adapter.flush(1);

        let view = adapter.peek(3).unwrap();
        assert_eq!(view, &[8, 7, 6]);
        assert_eq!(view.as_ptr(), head_ptr.wrapping_add(1));
    }

    #[test]
    fn test_assembled_cache_reused() {
        let mut adapter = adapter_with(&[&[1, 2], &[3, 4], &[5, 6]]);
        let first = adapter.peek(5).unwrap().as_ptr();
        assert_eq!(adapter.available_fast(), 5);

        let second = adapter.peek(3).unwrap();
        assert_eq!(second, &[1, 2, 3]);
        assert_eq!(second.as_ptr(), first);
    }

    #[test]
    fn test_flush_invalidates_cache() {
        let mut adapter = adapter_with(&[&[1, 2], &[3, 4]]);
        adapter.peek(4).unwrap();
        assert_eq!(adapter.available_fast(), 4);

        adapter.flush(1);
        assert_eq!(adapter.available_fast(), 1);
        assert_eq!(adapter.peek(3).unwrap(), &[2, 3, 4]);
    }

    #[test]
    fn test_peek_undersupply() {
        let mut adapter = adapter_with(&[&[1, 2, 3]]);
        assert_eq!(adapter.peek(4), Err(Error::too_small(4, 3)));
        assert_eq!(adapter.peek(0).unwrap(), &[] as &[u8]);
        assert_eq!(adapter.available(), 3);
    }

    #[test]
    fn test_flush_exact_chunk_boundaries() {
        let mut adapter = adapter_with(&[&[1, 2], &[3, 4], &[5]]);
        adapter.flush(4);
        assert_eq!(adapter.available(), 1);
        assert_eq!(adapter.available_fast(), 1);
        assert_eq!(adapter.peek(1).unwrap(), &[5]);
        adapter.flush(1);
        assert!(adapter.is_empty());
        assert_eq!(adapter.distance_from_discont(), 5);
    }

    #[test]
    #[should_panic(expected = "exceeds the 2 available")]
    fn test_flush_overrun_panics() {
        let mut adapter = adapter_with(&[&[1, 2]]);
        adapter.flush(3);
    }

    #[test]
    fn test_try_flush() {
        let mut adapter = adapter_with(&[&[1, 2]]);
        assert!(adapter.try_flush(3).unwrap_err().is_underflow());
        assert_eq!(adapter.available(), 2);
        adapter.try_flush(2).unwrap();
        assert!(adapter.is_empty());
    }

    #[test]
    fn test_take_within_head_shares_storage() {
        let chunk = Buffer::from_vec(vec![1, 2, 3, 4]).with_pts(100);
        let ptr = chunk.as_ptr();
        let mut adapter = ByteAdapter::new();
        adapter.push(chunk);

        let taken = adapter.take(2).unwrap();
        assert_eq!(&*taken, &[1, 2]);
        assert_eq!(taken.as_ptr(), ptr);
        assert_eq!(taken.pts, Timestamp::new(100));

        let rest = adapter.take(2).unwrap();
        assert_eq!(&*rest, &[3, 4]);
        assert!(!rest.pts.is_valid());
        assert!(adapter.is_empty());
    }

    #[test]
    fn test_take_spanning_chunks() {
        let mut adapter = adapter_with(&[&[1, 2, 3], &[4, 5], &[6]]);
        let taken = adapter.take(5).unwrap();
        assert_eq!(&*taken, &[1, 2, 3, 4, 5]);
        assert_eq!(adapter.available(), 1);
        assert_eq!(adapter.take_vec(1).unwrap(), vec![6]);
        assert!(adapter.take(1).unwrap_err().is_underflow());
    }

    #[test]
    fn test_copy_to_offset() {
        let adapter = adapter_with(&[&[1, 2, 3], &[4, 5], &[6, 7]]);
        let mut dest = [0u8; 4];
        adapter.copy_to(&mut dest, 2).unwrap();
        assert_eq!(dest, [3, 4, 5, 6]);
        assert_eq!(adapter.available(), 7);

        let mut too_big = [0u8; 6];
        assert_eq!(adapter.copy_to(&mut too_big, 2), Err(Error::too_small(8, 7)));
    }

    #[test]
    fn test_masked_scan_start_code() {
        let mut adapter = adapter_with(&[&[0xff, 0x00, 0x00], &[0x01, 0xb3, 0x00], &[0x00, 0x01]]);
        let found = adapter
            .masked_scan_u32(0xffff_ff00, 0x0000_0100, 0, 8)
            .unwrap();
        assert_eq!(found, Some(1));

        // 3-byte start code in the low bytes of the word
        let next = adapter
            .masked_scan_u32(0x00ff_ffff, 0x0000_0001, 2, 6)
            .unwrap();
        assert_eq!(next, Some(4));

        adapter.flush(2);
        let relative = adapter
            .masked_scan_u32(0x00ff_ffff, 0x0000_0001, 0, 6)
            .unwrap();
        assert_eq!(relative, Some(2));
        assert_eq!(adapter.masked_scan_u32(0x00ff_ffff, 0x0000_0001, 0, 3).unwrap(), None);
        assert!(adapter.masked_scan_u32(0x00ff_ffff, 0x0000_0001, 4, 4).is_err());
        assert!(adapter.masked_scan_u32(0x00ff_ffff, 0x0100_0000, 0, 4).is_err());
    }

    #[test]
    fn test_prev_pts_tracking() {
        let mut adapter = ByteAdapter::new();
        assert_eq!(adapter.prev_pts(), (Timestamp::none(), 0));

        adapter.push(Buffer::from_vec(vec![0; 10]).with_pts(1000));
        adapter.push(Buffer::from_vec(vec![0; 4]));
        adapter.push(Buffer::from_vec(vec![0; 6]).with_pts(2000));
        assert_eq!(adapter.prev_pts(), (Timestamp::new(1000), 0));

        adapter.flush(3);
        assert_eq!(adapter.prev_pts(), (Timestamp::new(1000), 3));

        // Second chunk has no pts, distance keeps counting
        adapter.flush(9);
        assert_eq!(adapter.prev_pts(), (Timestamp::new(1000), 12));

        adapter.flush(3);
        assert_eq!(adapter.prev_pts(), (Timestamp::new(2000), 1));

        adapter.clear();
        assert_eq!(adapter.prev_pts(), (Timestamp::none(), 0));
        assert_eq!(adapter.distance_from_discont(), 0);
    }

    #[test]
    fn test_clear_keeps_assembly_capacity() {
        let mut adapter = adapter_with(&[&[1; 20], &[2; 20]]);
        adapter.peek(30).unwrap();
        let capacity = adapter.assembled.len();
        assert_eq!(capacity, 32);

        adapter.clear();
        assert_eq!(adapter.available(), 0);
        assert_eq!(adapter.available_fast(), 0);
        assert_eq!(adapter.assembled.len(), capacity);
        assert!(adapter.peek(1).is_err());
    }
}
