use crate::{
    constants::{UBX_CHECKSUM_LEN, UBX_CLASS_OFFSET, UBX_HEADER_LEN},
    parser::buffer::{DualBuffer, UnderlyingBuffer},
    ParserError,
};

/// UBX [Fletcher-16 checksum](https://en.wikipedia.org/wiki/Fletcher%27s_checksum) calculator supporting both streaming and single-shot validation
#[derive(Debug, Default, Clone, Copy)]
pub struct UbxChecksumCalc {
    ck_a: u8,
    ck_b: u8,
}

impl UbxChecksumCalc {
    pub const fn new() -> Self {
        Self { ck_a: 0, ck_b: 0 }
    }

    /// Update checksum with new bytes
    pub const fn update(&mut self, bytes: &[u8]) {
        let mut i = 0;
        while i < bytes.len() {
            self.update_byte(bytes[i]);
            i += 1;
        }
    }

    /// Update checksum with a single byte
    pub const fn update_byte(&mut self, byte: u8) {
        self.ck_a = self.ck_a.wrapping_add(byte);
        self.ck_b = self.ck_b.wrapping_add(self.ck_a);
    }

    /// Get the current checksum result
    pub const fn result(self) -> (u8, u8) {
        (self.ck_a, self.ck_b)
    }

    /// Validate checksum and return result
    pub const fn validate_result(
        self,
        received_ck_a: u8,
        received_ck_b: u8,
    ) -> Result<(), ParserError> {
        if self.is_valid(received_ck_a, received_ck_b) {
            Ok(())
        } else {
            Err(ParserError::ChecksumMismatch {
                expect: u16::from_le_bytes([received_ck_a, received_ck_b]),
                got: u16::from_le_bytes([self.ck_a, self.ck_b]),
            })
        }
    }

    /// Checks the frame at the head of `buf`, whose length field was already read as `pack_len`.
    pub(crate) fn validate_buffer<T: UnderlyingBuffer>(
        buf: &DualBuffer<'_, T>,
        pack_len: u16,
    ) -> Result<(), ParserError> {
        let pack_len = pack_len as usize; // `usize` is needed for indexing but constraining the input to `u16` is still important
        let mut calc = Self::new();
        let (head, tail) = buf.peek_raw(UBX_CLASS_OFFSET..(UBX_HEADER_LEN + pack_len));
        let (received_ck_a, received_ck_b) = (
            buf[UBX_HEADER_LEN + pack_len],
            buf[UBX_HEADER_LEN + pack_len + UBX_CHECKSUM_LEN - 1],
        );

        // Class, message ID, length and payload; the sync chars are excluded
        calc.update(head);
        calc.update(tail);

        calc.validate_result(received_ck_a, received_ck_b)
    }

    const fn is_valid(&self, received_ck_a: u8, received_ck_b: u8) -> bool {
        self.ck_a == received_ck_a && self.ck_b == received_ck_b
    }
}

/// Computes `(ck_a, ck_b)` over `bytes`. An empty slice yields `(0, 0)`.
pub const fn ubx_checksum(bytes: &[u8]) -> (u8, u8) {
    let mut calc = UbxChecksumCalc::new();
    calc.update(bytes);
    calc.result()
}

/// Recomputes the checksum of `bytes` and compares it with the received pair.
pub const fn verify_checksum(bytes: &[u8], ck_a: u8, ck_b: u8) -> bool {
    let mut calc = UbxChecksumCalc::new();
    calc.update(bytes);
    calc.is_valid(ck_a, ck_b)
}
