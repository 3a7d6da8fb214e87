#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use crate::ParserError;
use core::{cmp::min, ops::Range};

/// Storage for bytes that arrived but could not be turned into a frame yet.
///
/// Implementations are provided for `Vec<u8>` (growable, needs `alloc`),
/// [FixedBuffer] (owned `[u8; N]`) and [FixedLinearBuffer] (borrowed
/// `&mut [u8]`). A fixed buffer bounds the largest frame that can be
/// reassembled across two deliveries; frames arriving whole in one delivery
/// are never copied, whatever their size.
pub trait UnderlyingBuffer:
    core::ops::Index<Range<usize>, Output = [u8]> + core::ops::Index<usize, Output = u8>
{
    /// Removes all elements from the buffer.
    fn clear(&mut self);

    /// Returns the number of elements currently stored in the buffer.
    fn len(&self) -> usize;

    /// Largest number of bytes the buffer can hold at once.
    ///
    /// The Vec implementation returns `usize::MAX`; Vec panics on its own if
    /// an allocation cannot be served.
    fn max_capacity(&self) -> usize;

    /// Appends as much of `other` as fits and returns how many bytes did not.
    fn extend_from_slice(&mut self, other: &[u8]) -> usize;

    /// Removes the first `count` elements from the buffer. Cannot fail.
    fn drain(&mut self, count: usize);

    /// Locates the given u8 value within the buffer, returning the index (if it is found).
    fn find(&self, value: u8) -> Option<usize> {
        (0..self.len()).find(|&i| self[i] == value)
    }

    /// Returns whether the buffer is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(feature = "alloc")]
impl UnderlyingBuffer for Vec<u8> {
    fn clear(&mut self) {
        Vec::clear(self);
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn max_capacity(&self) -> usize {
        usize::MAX
    }

    fn extend_from_slice(&mut self, other: &[u8]) -> usize {
        Vec::extend_from_slice(self, other);
        0
    }

    fn drain(&mut self, count: usize) {
        let count = min(count, Vec::len(self));
        Vec::drain(self, 0..count);
    }

    fn find(&self, value: u8) -> Option<usize> {
        self.iter().position(|elem| *elem == value)
    }
}

/// Compacts `storage[..*len]` by dropping its first `count` bytes.
fn drain_front(storage: &mut [u8], len: &mut usize, count: usize) {
    if count >= *len {
        *len = 0;
        return;
    }
    storage.copy_within(count..*len, 0);
    *len -= count;
}

/// Appends to `storage[..*len]` and returns the number of bytes left over.
fn append(storage: &mut [u8], len: &mut usize, other: &[u8]) -> usize {
    let to_copy = min(other.len(), storage.len() - *len);
    storage[*len..*len + to_copy].copy_from_slice(&other[..to_copy]);
    *len += to_copy;
    other.len() - to_copy
}

fn check_range(range: &Range<usize>, len: usize) {
    if range.end > len {
        panic!(
            "index out of bounds: the len is {len} but the index is {idx}",
            idx = range.end
        );
    }
}

/// Holds a mutable reference to caller-owned memory
pub struct FixedLinearBuffer<'a> {
    buffer: &'a mut [u8],
    len: usize,
}

impl<'a> FixedLinearBuffer<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self {
            buffer: buf,
            len: 0,
        }
    }
}

impl core::ops::Index<Range<usize>> for FixedLinearBuffer<'_> {
    type Output = [u8];

    fn index(&self, index: Range<usize>) -> &Self::Output {
        check_range(&index, self.len);
        &self.buffer[index]
    }
}

impl core::ops::Index<usize> for FixedLinearBuffer<'_> {
    type Output = u8;

    fn index(&self, index: usize) -> &Self::Output {
        &self.buffer[..self.len][index]
    }
}

impl UnderlyingBuffer for FixedLinearBuffer<'_> {
    fn clear(&mut self) {
        self.len = 0;
    }

    fn len(&self) -> usize {
        self.len
    }

    fn max_capacity(&self) -> usize {
        self.buffer.len()
    }

    fn extend_from_slice(&mut self, other: &[u8]) -> usize {
        append(self.buffer, &mut self.len, other)
    }

    fn drain(&mut self, count: usize) {
        drain_front(self.buffer, &mut self.len, count);
    }
}

/// An owned buffer with a capacity known at compile time, usable without an allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedBuffer<const N: usize> {
    buffer: [u8; N],
    len: usize,
}

impl<const N: usize> FixedBuffer<N> {
    pub const fn new() -> Self {
        Self {
            buffer: [0; N],
            len: 0,
        }
    }
}

impl<const N: usize> Default for FixedBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> core::ops::Index<Range<usize>> for FixedBuffer<N> {
    type Output = [u8];

    fn index(&self, index: Range<usize>) -> &Self::Output {
        check_range(&index, self.len);
        &self.buffer[index]
    }
}

impl<const N: usize> core::ops::Index<usize> for FixedBuffer<N> {
    type Output = u8;

    fn index(&self, index: usize) -> &Self::Output {
        &self.buffer[..self.len][index]
    }
}

impl<const N: usize> UnderlyingBuffer for FixedBuffer<N> {
    fn clear(&mut self) {
        self.len = 0;
    }

    fn len(&self) -> usize {
        self.len
    }

    fn max_capacity(&self) -> usize {
        N
    }

    fn extend_from_slice(&mut self, other: &[u8]) -> usize {
        append(&mut self.buffer, &mut self.len, other)
    }

    fn drain(&mut self, count: usize) {
        drain_front(&mut self.buffer, &mut self.len, count);
    }
}

/// Presents the bytes stashed from earlier deliveries followed by a newly
/// delivered slice as one contiguous-looking stream.
///
/// Bytes are only copied into the stash when a frame straddles the two
/// halves, or when the window is dropped with unconsumed bytes left.
pub(crate) struct DualBuffer<'a, T: UnderlyingBuffer> {
    stash: &'a mut T,
    stash_pos: usize,

    incoming: &'a [u8],
    incoming_pos: usize,
}

impl<T: UnderlyingBuffer> core::ops::Index<usize> for DualBuffer<'_, T> {
    type Output = u8;

    fn index(&self, index: usize) -> &u8 {
        let stashed = self.stashed();
        if index < stashed {
            &self.stash[self.stash_pos + index]
        } else {
            &self.incoming[self.incoming_pos + index - stashed]
        }
    }
}

impl<'a, T: UnderlyingBuffer> DualBuffer<'a, T> {
    pub(crate) const fn new(stash: &'a mut T, incoming: &'a [u8]) -> Self {
        Self {
            stash,
            stash_pos: 0,
            incoming,
            incoming_pos: 0,
        }
    }

    /// Unconsumed bytes still sitting in the stash
    fn stashed(&self) -> usize {
        self.stash.len() - self.stash_pos
    }

    /// Total number of unconsumed bytes.
    pub(crate) fn len(&self) -> usize {
        self.stashed() + self.incoming.len() - self.incoming_pos
    }

    /// Skips `count` bytes.
    pub(crate) fn drain(&mut self, count: usize) {
        let from_stash = min(self.stashed(), count);
        let from_incoming = min(
            count - from_stash,
            self.incoming.len() - self.incoming_pos,
        );
        self.stash_pos += from_stash;
        self.incoming_pos += from_incoming;
    }

    pub(crate) fn clear(&mut self) {
        self.drain(self.len());
    }

    /// Position of the first byte equal to `value`.
    pub(crate) fn find(&self, value: u8) -> Option<usize> {
        let stashed = self.stashed();
        (0..stashed)
            .find(|&i| self.stash[self.stash_pos + i] == value)
            .or_else(|| {
                self.incoming[self.incoming_pos..]
                    .iter()
                    .position(|b| *b == value)
                    .map(|i| i + stashed)
            })
    }

    /// Bytes that would not fit into the stash if the window were dropped now.
    pub(crate) fn potential_lost_bytes(&self) -> usize {
        self.len().saturating_sub(self.stash.max_capacity())
    }

    /// Whether `take` bytes located `skip` bytes ahead are available and can
    /// be handed out as one slice.
    pub(crate) fn can_drain_and_take(&self, skip: usize, take: usize) -> bool {
        if self.len() < skip + take {
            return false;
        }
        let stashed = self.stashed();
        if skip + take <= stashed || skip >= stashed {
            return true;
        }
        take <= self.stash.max_capacity()
    }

    /// Borrows `range` as the part lying in the stash and the part lying in
    /// the incoming slice.
    pub(crate) fn peek_raw(&self, range: Range<usize>) -> (&[u8], &[u8]) {
        let stashed = self.stashed();
        let head = if range.start >= stashed {
            &[][..]
        } else {
            let end = min(range.end, stashed);
            &self.stash[self.stash_pos + range.start..self.stash_pos + end]
        };
        let tail = if range.end <= stashed {
            &[][..]
        } else {
            let start = self.incoming_pos + range.start.saturating_sub(stashed);
            &self.incoming[start..self.incoming_pos + range.end - stashed]
        };
        (head, tail)
    }

    /// Consumes the next `count` bytes and returns them as one slice, copying
    /// into the stash only when they straddle both halves.
    ///
    /// Panics if fewer than `count` bytes are available.
    pub(crate) fn take(&mut self, count: usize) -> Result<&[u8], ParserError> {
        assert!(
            count <= self.len(),
            "Cannot take {} bytes from a window holding {}",
            count,
            self.len()
        );
        let stashed = self.stashed();

        if stashed == 0 {
            let start = self.incoming_pos;
            self.incoming_pos += count;
            return Ok(&self.incoming[start..start + count]);
        }

        if count <= stashed {
            let start = self.stash_pos;
            self.stash_pos += count;
            return Ok(&self.stash[start..start + count]);
        }

        if self.stash.max_capacity() < count {
            return Err(ParserError::OutOfMemory {
                required_size: count,
            });
        }

        // Move what is left of the stash to its front, then append just the
        // missing bytes from the incoming slice
        let missing = count - stashed;
        self.stash.drain(self.stash_pos);
        self.stash_pos = 0;
        self.stash
            .extend_from_slice(&self.incoming[self.incoming_pos..self.incoming_pos + missing]);
        self.incoming_pos += missing;
        self.stash_pos = count;
        Ok(&self.stash[0..count])
    }
}

impl<T: UnderlyingBuffer> Drop for DualBuffer<'_, T> {
    fn drop(&mut self) {
        self.stash.drain(self.stash_pos);
        let lost = self
            .stash
            .extend_from_slice(&self.incoming[self.incoming_pos..]);
        if lost > 0 {
            log::debug!("underlying buffer full, dropped {} bytes", lost);
        }
    }
}
