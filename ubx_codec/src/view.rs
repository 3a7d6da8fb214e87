//! Bounds-checked overlay over a payload: a fixed header followed by
//! repeated fixed-size records.
//!
//! Every range is validated once in [PayloadView::new]; afterwards the view
//! and its iterators only hand out subslices that are known to be in range.

use core::iter::FusedIterator;

use crate::{
    error::LayoutError,
    layout::{CountWidth, LayoutDescriptor, RecordCount},
};

/// Reads `N` bytes at `offset`, or `None` if they are not all in `bytes`.
pub(crate) fn read_array<const N: usize>(bytes: &[u8], offset: usize) -> Option<[u8; N]> {
    let end = offset.checked_add(N)?;
    bytes.get(offset..end)?.try_into().ok()
}

fn read_count(fixed: &[u8], offset: usize, width: CountWidth) -> Option<usize> {
    match width {
        CountWidth::U8 => fixed.get(offset).map(|b| usize::from(*b)),
        CountWidth::U16 => read_array(fixed, offset).map(|b| usize::from(u16::from_le_bytes(b))),
    }
}

/// A validated, non-owning view over one message payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadView<'a> {
    payload: &'a [u8],
    layout: LayoutDescriptor,
    count: usize,
}

impl<'a> PayloadView<'a> {
    /// Checks `payload` against `layout` and builds the view.
    pub fn new(payload: &'a [u8], layout: LayoutDescriptor) -> Result<Self, LayoutError> {
        let got = payload.len();
        if got < layout.fixed_size {
            return Err(LayoutError::PayloadTooShort {
                min: layout.fixed_size,
                got,
            });
        }

        let tail = got - layout.fixed_size;
        let trailing = LayoutError::TrailingBytes {
            fixed_size: layout.fixed_size,
            record_size: layout.record_size,
            got,
        };
        let count = if layout.record_size == 0 {
            if tail != 0 {
                return Err(trailing);
            }
            0
        } else {
            if tail % layout.record_size != 0 {
                return Err(trailing);
            }
            tail / layout.record_size
        };

        if let RecordCount::Field { offset, width } = layout.count {
            let fixed = &payload[..layout.fixed_size];
            let field = read_count(fixed, offset, width).ok_or(LayoutError::PayloadTooShort {
                min: offset.saturating_add(width.len()),
                got,
            })?;
            if field != count {
                return Err(LayoutError::CountFieldMismatch {
                    field,
                    derived: count,
                });
            }
        }

        if count < layout.min_records {
            return Err(LayoutError::TooFewRecords {
                count,
                min: layout.min_records,
            });
        }
        if let Some(max) = layout.max_records {
            if count > max {
                return Err(LayoutError::TooManyRecords { count, max });
            }
        }

        Ok(Self {
            payload,
            layout,
            count,
        })
    }

    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    pub fn layout(&self) -> LayoutDescriptor {
        self.layout
    }

    /// The fixed header, exactly `layout.fixed_size` bytes
    pub fn fixed_fields(&self) -> &'a [u8] {
        &self.payload[..self.layout.fixed_size]
    }

    /// Everything after the fixed header
    pub fn records_bytes(&self) -> &'a [u8] {
        &self.payload[self.layout.fixed_size..]
    }

    pub fn record_count(&self) -> usize {
        self.count
    }

    /// A fresh iterator over the repeated records; calling this again
    /// replays the same sequence.
    pub fn repeated(&self) -> RepeatedRecordIterator<'a> {
        RepeatedRecordIterator {
            records: self.records_bytes(),
            record_size: self.layout.record_size,
            front: 0,
            back: self.count,
        }
    }

    pub fn record(&self, index: usize) -> Option<&'a [u8]> {
        if index >= self.count {
            return None;
        }
        let start = self.layout.fixed_size + index * self.layout.record_size;
        Some(&self.payload[start..start + self.layout.record_size])
    }

    pub fn u8_at(&self, offset: usize) -> Option<u8> {
        self.fixed_fields().get(offset).copied()
    }

    pub fn i8_at(&self, offset: usize) -> Option<i8> {
        self.u8_at(offset).map(|b| b as i8)
    }

    pub fn u16_at(&self, offset: usize) -> Option<u16> {
        read_array(self.fixed_fields(), offset).map(u16::from_le_bytes)
    }

    pub fn i16_at(&self, offset: usize) -> Option<i16> {
        read_array(self.fixed_fields(), offset).map(i16::from_le_bytes)
    }

    pub fn u32_at(&self, offset: usize) -> Option<u32> {
        read_array(self.fixed_fields(), offset).map(u32::from_le_bytes)
    }

    pub fn i32_at(&self, offset: usize) -> Option<i32> {
        read_array(self.fixed_fields(), offset).map(i32::from_le_bytes)
    }
}

/// Lazy sequence of the repeated records of a [PayloadView]
#[derive(Debug, Clone)]
pub struct RepeatedRecordIterator<'a> {
    records: &'a [u8],
    record_size: usize,
    front: usize,
    back: usize,
}

impl<'a> RepeatedRecordIterator<'a> {
    fn slice(&self, index: usize) -> &'a [u8] {
        let start = index * self.record_size;
        &self.records[start..start + self.record_size]
    }
}

impl<'a> Iterator for RepeatedRecordIterator<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let record = self.slice(self.front);
        self.front += 1;
        Some(record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.back - self.front;
        (left, Some(left))
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.front = self.front.saturating_add(n).min(self.back);
        self.next()
    }
}

impl DoubleEndedIterator for RepeatedRecordIterator<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some(self.slice(self.back))
    }
}

impl ExactSizeIterator for RepeatedRecordIterator<'_> {}

impl FusedIterator for RepeatedRecordIterator<'_> {}
