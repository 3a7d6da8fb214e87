//! Frame synchronization and extraction.

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

pub(crate) mod buffer;
pub(crate) mod checksum;

pub use buffer::{FixedBuffer, FixedLinearBuffer, UnderlyingBuffer};
pub use checksum::{ubx_checksum, verify_checksum, UbxChecksumCalc};

use crate::{
    constants::{
        MAX_PAYLOAD_LEN, UBX_CHECKSUM_LEN, UBX_CLASS_OFFSET, UBX_HEADER_LEN, UBX_LENGTH_OFFSET,
        UBX_MSG_ID_OFFSET, UBX_SYNC_CHAR_1, UBX_SYNC_CHAR_2,
    },
    error::ParserError,
    frame::Frame,
};
use buffer::DualBuffer;

/// Where the bytes held back between two `consume` calls leave the frame
/// state machine.
///
/// `SeekingSync1 -> SeekingSync2 -> ReadingClass -> ReadingId ->
/// ReadingLength -> ReadingPayload -> ReadingChecksum -> FrameReady`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    SeekingSync1,
    SeekingSync2,
    ReadingClass,
    ReadingId,
    ReadingLength,
    ReadingPayload { remaining: usize },
    ReadingChecksum,
    FrameReady,
}

/// A candidate frame the scanner had to throw away.
///
/// `class` and `id` come from the unverified header, so they identify what
/// the frame claimed to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanError {
    pub class: u8,
    pub id: u8,
    pub error: ParserError,
}

/// Streaming UBX frame scanner. The default constructor uses a `Vec`, but any
/// [UnderlyingBuffer] can be passed to [FrameScanner::new].
///
/// A fixed buffer should hold at least the largest frame you expect to see
/// split across two deliveries.
pub struct FrameScanner<T: UnderlyingBuffer> {
    buf: T,
    max_payload_len: usize,
}

#[cfg(feature = "alloc")]
impl Default for FrameScanner<Vec<u8>> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T: UnderlyingBuffer> FrameScanner<T> {
    pub fn new(underlying: T) -> Self {
        Self {
            buf: underlying,
            max_payload_len: MAX_PAYLOAD_LEN,
        }
    }

    /// Length fields above `max_payload_len` are reported as
    /// [ParserError::FrameTooLarge] instead of waiting for the bytes.
    pub fn with_max_payload_len(mut self, max_payload_len: usize) -> Self {
        self.max_payload_len = max_payload_len;
        self
    }

    pub fn max_payload_len(&self) -> usize {
        self.max_payload_len
    }

    pub fn is_buffer_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn buffer_len(&self) -> usize {
        self.buf.len()
    }

    /// Forgets every byte held back from earlier deliveries.
    pub fn reset(&mut self) {
        self.buf.clear();
    }

    pub fn state(&self) -> ScanState {
        let n = self.buf.len();
        if n == 0 || self.buf[0] != UBX_SYNC_CHAR_1 {
            return ScanState::SeekingSync1;
        }
        if n == 1 {
            return ScanState::SeekingSync2;
        }
        if self.buf[1] != UBX_SYNC_CHAR_2 {
            return ScanState::SeekingSync1;
        }
        match n {
            2 => ScanState::ReadingClass,
            3 => ScanState::ReadingId,
            4 | 5 => ScanState::ReadingLength,
            _ => {
                let len = usize::from(u16::from_le_bytes([
                    self.buf[UBX_LENGTH_OFFSET],
                    self.buf[UBX_LENGTH_OFFSET + 1],
                ]));
                let payload_end = UBX_HEADER_LEN + len;
                if n < payload_end {
                    ScanState::ReadingPayload {
                        remaining: payload_end - n,
                    }
                } else if n < payload_end + UBX_CHECKSUM_LEN {
                    ScanState::ReadingChecksum
                } else {
                    ScanState::FrameReady
                }
            },
        }
    }

    /// Appends `new_data` to the stream and returns an iterator-like object
    /// over the frames that are now complete. Unconsumed bytes are kept for
    /// the next call when the iterator is dropped.
    pub fn consume<'a>(&'a mut self, new_data: &'a [u8]) -> FrameIter<'a, T> {
        FrameIter {
            buf: DualBuffer::new(&mut self.buf, new_data),
            max_payload_len: self.max_payload_len,
        }
    }
}

/// Iterator over the frames available in a [FrameScanner]
pub struct FrameIter<'a, T: UnderlyingBuffer> {
    buf: DualBuffer<'a, T>,
    max_payload_len: usize,
}

impl<T: UnderlyingBuffer> FrameIter<'_, T> {
    #[allow(clippy::should_implement_trait)]
    /// Analog of `core::iter::Iterator::next`; frames borrow from the
    /// scanner, so this cannot be a plain `Iterator`.
    pub fn next(&mut self) -> Option<Result<Frame<'_>, ScanError>> {
        while self.buf.len() > 0 {
            let pos = match self.buf.find(UBX_SYNC_CHAR_1) {
                Some(pos) => pos,
                None => {
                    log::trace!("no sync char, discarding {} bytes", self.buf.len());
                    self.buf.clear();
                    return None;
                },
            };
            if pos > 0 {
                log::trace!("discarding {} bytes before sync char", pos);
                self.buf.drain(pos);
            }

            if self.buf.len() < 2 {
                return None;
            }
            if self.buf[1] != UBX_SYNC_CHAR_2 {
                self.buf.drain(1);
                continue;
            }

            if self.buf.len() < UBX_HEADER_LEN {
                return None;
            }

            let class = self.buf[UBX_CLASS_OFFSET];
            let id = self.buf[UBX_MSG_ID_OFFSET];
            let pack_len = u16::from_le_bytes([
                self.buf[UBX_LENGTH_OFFSET],
                self.buf[UBX_LENGTH_OFFSET + 1],
            ]);
            if usize::from(pack_len) > self.max_payload_len {
                log::debug!(
                    "frame {:#04x}/{:#04x} claims {} payload bytes, resyncing",
                    class,
                    id,
                    pack_len
                );
                self.buf.drain(2);
                return Some(Err(ScanError {
                    class,
                    id,
                    error: ParserError::FrameTooLarge {
                        len: pack_len.into(),
                        max: self.max_payload_len,
                    },
                }));
            }
            return extract_frame(&mut self.buf, class, id, pack_len);
        }
        None
    }
}

fn extract_frame<'b, T: UnderlyingBuffer>(
    buf: &'b mut DualBuffer<'_, T>,
    class: u8,
    id: u8,
    pack_len: u16,
) -> Option<Result<Frame<'b>, ScanError>> {
    let pack_len_usize = usize::from(pack_len);
    let body_len = pack_len_usize + UBX_CHECKSUM_LEN;
    if !buf.can_drain_and_take(UBX_HEADER_LEN, body_len) {
        if buf.potential_lost_bytes() > 0 {
            // The frame can never be reassembled in this buffer, skip it
            log::debug!(
                "frame {:#04x}/{:#04x} does not fit the underlying buffer",
                class,
                id
            );
            buf.drain(2);
            return Some(Err(ScanError {
                class,
                id,
                error: ParserError::OutOfMemory {
                    required_size: body_len,
                },
            }));
        }
        return None;
    }

    if let Err(error) = UbxChecksumCalc::validate_buffer(buf, pack_len) {
        log::debug!("frame {:#04x}/{:#04x}: {}", class, id, error);
        // Resync right after the sync chars of the rejected frame
        buf.drain(2);
        return Some(Err(ScanError { class, id, error }));
    }

    buf.drain(UBX_HEADER_LEN);
    let body = match buf.take(body_len) {
        Ok(body) => body,
        Err(error) => return Some(Err(ScanError { class, id, error })),
    };
    let (payload, checksum) = body.split_at(pack_len_usize);
    log::trace!(
        "frame {:#04x}/{:#04x} with {} payload bytes",
        class,
        id,
        pack_len_usize
    );
    Some(Ok(Frame::new(
        class,
        id,
        payload,
        (checksum[0], checksum[1]),
    )))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::frame::write_frame;

    const ACK_ACK: [u8; 10] = [0xb5, 0x62, 0x5, 0x1, 0x2, 0x0, 0x4, 0x5, 0x11, 0x38];

    fn count_frames<T: UnderlyingBuffer>(scanner: &mut FrameScanner<T>, data: &[u8]) -> usize {
        let mut it = scanner.consume(data);
        let mut count = 0;
        while let Some(res) = it.next() {
            assert!(res.is_ok());
            count += 1;
        }
        count
    }

    #[test]
    fn scanner_handles_garbage_first_byte() {
        let mut scanner = FrameScanner::new(FixedBuffer::<12>::new());
        let bytes = [0xb5, 0xb5, 0x62, 0x5, 0x1, 0x2, 0x0, 0x4, 0x5, 0x11, 0x38];

        let mut it = scanner.consume(&bytes);
        let frame = it.next().unwrap().unwrap();
        assert_eq!((frame.class(), frame.msg_id()), (0x05, 0x01));
        assert_eq!(frame.payload(), &[0x04, 0x05]);
        assert_eq!(frame.checksum(), (0x11, 0x38));
        assert!(it.next().is_none());
    }

    #[test]
    fn scanner_small_buffer_processes_many_frames() {
        let mut bytes = [0; 50];
        for chunk in bytes.chunks_mut(10) {
            chunk.copy_from_slice(&ACK_ACK);
        }

        let mut storage = [0; 10];
        let mut scanner = FrameScanner::new(FixedLinearBuffer::new(&mut storage));
        assert_eq!(count_frames(&mut scanner, &bytes), 5);
        assert!(scanner.is_buffer_empty());
    }

    #[test]
    fn scanner_state_follows_partial_frame() {
        let mut scanner = FrameScanner::new(FixedBuffer::<32>::new());
        assert_eq!(scanner.state(), ScanState::SeekingSync1);

        let expected = [
            ScanState::SeekingSync2,
            ScanState::ReadingClass,
            ScanState::ReadingId,
            ScanState::ReadingLength,
            ScanState::ReadingLength,
            ScanState::ReadingPayload { remaining: 2 },
            ScanState::ReadingPayload { remaining: 1 },
            ScanState::ReadingChecksum,
            ScanState::ReadingChecksum,
        ];
        for (byte, state) in ACK_ACK.iter().zip(expected.iter()) {
            assert_eq!(count_frames(&mut scanner, &[*byte]), 0);
            assert_eq!(scanner.state(), *state);
        }
        assert_eq!(count_frames(&mut scanner, &ACK_ACK[9..]), 1);
        assert_eq!(scanner.state(), ScanState::SeekingSync1);
    }

    #[test]
    fn scanner_sync2_mismatch_goes_back_to_sync1() {
        let mut scanner = FrameScanner::new(FixedBuffer::<32>::new());
        assert_eq!(count_frames(&mut scanner, &[0xb5, 0x00]), 0);
        assert!(scanner.is_buffer_empty());
        assert_eq!(scanner.state(), ScanState::SeekingSync1);
    }

    #[test]
    fn scanner_reports_oversized_length() {
        let mut scanner = FrameScanner::new(FixedBuffer::<64>::new()).with_max_payload_len(16);
        let mut frame = [0; 64];
        let len = write_frame(0x01, 0x07, &[0; 17], &mut frame).unwrap();

        let mut it = scanner.consume(&frame[..len]);
        assert_eq!(
            it.next().map(|r| r.map(|f| f.class())),
            Some(Err(ScanError {
                class: 0x01,
                id: 0x07,
                error: ParserError::FrameTooLarge { len: 17, max: 16 }
            }))
        );
        assert!(it.next().is_none());
    }

    #[test]
    fn scanner_out_of_memory_then_recovers() {
        let mut big = [0; 40];
        let big_len = write_frame(0x06, 0x24, &[0x17; 30], &mut big).unwrap();
        let mut storage = [0; 12];
        let mut scanner = FrameScanner::new(FixedLinearBuffer::new(&mut storage));

        assert_eq!(count_frames(&mut scanner, &big[..8]), 0);
        {
            let mut it = scanner.consume(&big[8..big_len]);
            assert!(matches!(
                it.next(),
                Some(Err(ScanError {
                    error: ParserError::OutOfMemory { required_size: 32 },
                    ..
                }))
            ));
            assert!(it.next().is_none());
        }
        assert!(scanner.is_buffer_empty());
        assert_eq!(count_frames(&mut scanner, &ACK_ACK), 1);
    }

    #[test]
    fn scanner_finds_frame_hidden_in_bad_frame() {
        // A corrupted frame whose payload contains a complete valid frame
        let mut outer = [0; 32];
        let len = write_frame(0x02, 0x13, &ACK_ACK, &mut outer).unwrap();
        outer[len - 1] ^= 0xff;

        let mut scanner = FrameScanner::new(FixedBuffer::<64>::new());
        let mut it = scanner.consume(&outer[..len]);
        assert!(matches!(
            it.next(),
            Some(Err(ScanError {
                class: 0x02,
                id: 0x13,
                error: ParserError::ChecksumMismatch { .. }
            }))
        ));
        let inner = it.next().unwrap().unwrap();
        assert_eq!((inner.class(), inner.msg_id()), (0x05, 0x01));
        assert!(it.next().is_none());
    }
}
