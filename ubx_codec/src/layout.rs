/// Width of an explicit record count stored in the fixed header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum CountWidth {
    U8,
    U16,
}

impl CountWidth {
    pub const fn len(self) -> usize {
        match self {
            CountWidth::U8 => 1,
            CountWidth::U16 => 2,
        }
    }
}

/// How the number of repeated records is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum RecordCount {
    /// `(payload_len - fixed_size) / record_size`
    Derived,
    /// Little-endian count at `offset` in the fixed header; it must match
    /// the derived count.
    Field { offset: usize, width: CountWidth },
}

/// Shape of one message type: a fixed header followed by zero or more
/// fixed-size records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LayoutDescriptor {
    pub fixed_size: usize,
    /// 0 when the message has no repeated section
    pub record_size: usize,
    pub count: RecordCount,
    pub min_records: usize,
    pub max_records: Option<usize>,
}

impl LayoutDescriptor {
    /// A message made of the fixed header only.
    pub const fn fixed(fixed_size: usize) -> Self {
        Self {
            fixed_size,
            record_size: 0,
            count: RecordCount::Derived,
            min_records: 0,
            max_records: None,
        }
    }

    pub const fn repeated(fixed_size: usize, record_size: usize) -> Self {
        Self {
            fixed_size,
            record_size,
            count: RecordCount::Derived,
            min_records: 0,
            max_records: None,
        }
    }

    pub const fn with_count_field(mut self, offset: usize, width: CountWidth) -> Self {
        self.count = RecordCount::Field { offset, width };
        self
    }

    pub const fn with_min_records(mut self, min_records: usize) -> Self {
        self.min_records = min_records;
        self
    }

    pub const fn with_max_records(mut self, max_records: usize) -> Self {
        self.max_records = Some(max_records);
        self
    }

    pub const fn has_records(&self) -> bool {
        self.record_size > 0
    }

    /// Payload length of a message carrying `records` repeated records.
    pub const fn payload_len(&self, records: usize) -> usize {
        self.fixed_size + records * self.record_size
    }

    /// Largest payload this layout accepts, if bounded.
    pub const fn max_payload_len(&self) -> Option<usize> {
        if !self.has_records() {
            return Some(self.fixed_size);
        }
        match self.max_records {
            Some(max) => Some(self.payload_len(max)),
            None => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn payload_len_grows_by_record() {
        let layout = LayoutDescriptor::repeated(40, 30);
        assert_eq!(layout.payload_len(0), 40);
        assert_eq!(layout.payload_len(2), 100);
        assert_eq!(layout.max_payload_len(), None);
        assert_eq!(layout.with_max_records(4).max_payload_len(), Some(160));
    }

    #[test]
    fn fixed_layout_is_bounded() {
        let layout = LayoutDescriptor::fixed(92);
        assert!(!layout.has_records());
        assert_eq!(layout.max_payload_len(), Some(92));
    }

    #[test]
    fn count_field_builder() {
        const LAYOUT: LayoutDescriptor =
            LayoutDescriptor::repeated(8, 12).with_count_field(5, CountWidth::U8);
        assert_eq!(
            LAYOUT.count,
            RecordCount::Field {
                offset: 5,
                width: CountWidth::U8
            }
        );
        assert_eq!(CountWidth::U16.len(), 2);
    }
}
