#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use crate::{
    constants::{UBX_FRAME_OVERHEAD, UBX_HEADER_LEN, UBX_SYNC_CHAR_1, UBX_SYNC_CHAR_2},
    error::MemWriterError,
    parser::UbxChecksumCalc,
};
#[cfg(feature = "alloc")]
use crate::error::ParserError;

/// One checksum-verified frame, borrowed from the scanner that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    class: u8,
    id: u8,
    payload: &'a [u8],
    checksum: (u8, u8),
}

impl<'a> Frame<'a> {
    pub(crate) const fn new(class: u8, id: u8, payload: &'a [u8], checksum: (u8, u8)) -> Self {
        Self {
            class,
            id,
            payload,
            checksum,
        }
    }

    pub const fn class(&self) -> u8 {
        self.class
    }

    pub const fn msg_id(&self) -> u8 {
        self.id
    }

    pub const fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// `(ck_a, ck_b)` as received
    pub const fn checksum(&self) -> (u8, u8) {
        self.checksum
    }

    /// Size of the frame on the wire
    pub const fn wire_len(&self) -> usize {
        frame_len(self.payload.len())
    }
}

/// Number of bytes a frame carrying `payload_len` bytes occupies on the wire.
pub const fn frame_len(payload_len: usize) -> usize {
    payload_len + UBX_FRAME_OVERHEAD
}

/// Wraps `payload` into a complete frame written at the start of `out`.
/// Returns the number of bytes written.
pub fn write_frame(
    class: u8,
    id: u8,
    payload: &[u8],
    out: &mut [u8],
) -> Result<usize, MemWriterError> {
    let len = u16::try_from(payload.len()).map_err(|_| MemWriterError::PayloadTooLarge {
        len: payload.len(),
    })?;
    let total = frame_len(payload.len());
    if out.len() < total {
        return Err(MemWriterError::NotEnoughMem {
            required: total,
            available: out.len(),
        });
    }

    let [len_lo, len_hi] = len.to_le_bytes();
    out[..UBX_HEADER_LEN].copy_from_slice(&[
        UBX_SYNC_CHAR_1,
        UBX_SYNC_CHAR_2,
        class,
        id,
        len_lo,
        len_hi,
    ]);
    out[UBX_HEADER_LEN..UBX_HEADER_LEN + payload.len()].copy_from_slice(payload);

    let mut checksum = UbxChecksumCalc::new();
    checksum.update(&out[2..UBX_HEADER_LEN + payload.len()]);
    let (ck_a, ck_b) = checksum.result();
    out[total - 2] = ck_a;
    out[total - 1] = ck_b;
    Ok(total)
}

/// Allocating variant of [write_frame].
#[cfg(feature = "alloc")]
pub fn encode_frame(class: u8, id: u8, payload: &[u8]) -> Result<Vec<u8>, ParserError> {
    let mut out = alloc::vec![0; frame_len(payload.len())];
    write_frame(class, id, payload, &mut out).map_err(|_| ParserError::FrameTooLarge {
        len: payload.len(),
        max: usize::from(u16::MAX),
    })?;
    Ok(out)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn write_ack_ack() {
        let mut out = [0; 16];
        let len = write_frame(0x05, 0x01, &[0x04, 0x05], &mut out).unwrap();
        assert_eq!(
            &out[..len],
            &[0xb5, 0x62, 0x05, 0x01, 0x02, 0x00, 0x04, 0x05, 0x11, 0x38]
        );
    }

    #[test]
    fn write_empty_payload() {
        let mut out = [0; 8];
        assert_eq!(write_frame(0x0a, 0x04, &[], &mut out), Ok(8));
        assert_eq!(&out[2..6], &[0x0a, 0x04, 0x00, 0x00]);
        assert_eq!((out[6], out[7]), crate::ubx_checksum(&out[2..6]));
    }

    #[test]
    fn write_into_short_slice() {
        let mut out = [0; 9];
        assert_eq!(
            write_frame(0x05, 0x01, &[0x04, 0x05], &mut out),
            Err(MemWriterError::NotEnoughMem {
                required: 10,
                available: 9
            })
        );
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn encode_rejects_oversized_payload() {
        let payload = alloc::vec![0; usize::from(u16::MAX) + 1];
        assert!(matches!(
            encode_frame(0x01, 0x02, &payload),
            Err(ParserError::FrameTooLarge { .. })
        ));
        assert_eq!(encode_frame(0x01, 0x02, &payload[..4]).unwrap().len(), 12);
    }
}
