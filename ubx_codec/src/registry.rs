//! Lookup table from `(class, id)` to the layout of a message.

use crate::{
    error::RegistryError,
    layout::{CountWidth, LayoutDescriptor, RecordCount},
    messages::{MonVer, NavSat, UbxMessageMeta},
};

/// One row of a registry table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RegistryEntry {
    pub class: u8,
    pub id: u8,
    pub name: &'static str,
    pub layout: LayoutDescriptor,
}

impl RegistryEntry {
    pub const fn new(class: u8, id: u8, name: &'static str, layout: LayoutDescriptor) -> Self {
        Self {
            class,
            id,
            name,
            layout,
        }
    }

    /// Row describing a message type that has a typed overlay.
    pub const fn of<M: UbxMessageMeta>() -> Self {
        Self::new(M::CLASS, M::ID, M::NAME, M::LAYOUT)
    }

    fn validate(&self) -> Result<(), RegistryError> {
        let (class, id) = (self.class, self.id);
        let layout = &self.layout;
        if let RecordCount::Field { offset, width } = layout.count {
            if !layout.has_records() {
                return Err(RegistryError::CountFieldWithoutRecords { class, id });
            }
            if offset.saturating_add(width.len()) > layout.fixed_size {
                return Err(RegistryError::CountFieldOutOfBounds { class, id });
            }
        }
        let max = if layout.has_records() {
            layout.max_records
        } else {
            Some(0)
        };
        if let Some(max) = max {
            if layout.min_records > max {
                return Err(RegistryError::InvalidRecordBounds { class, id });
            }
        }
        Ok(())
    }
}

const fn fixed(class: u8, id: u8, name: &'static str, size: usize) -> RegistryEntry {
    RegistryEntry::new(class, id, name, LayoutDescriptor::fixed(size))
}

const fn counted(
    class: u8,
    id: u8,
    name: &'static str,
    fixed_size: usize,
    record_size: usize,
    count_offset: usize,
) -> RegistryEntry {
    let layout = LayoutDescriptor::repeated(fixed_size, record_size)
        .with_count_field(count_offset, CountWidth::U8)
        .with_max_records(u8::MAX as usize);
    RegistryEntry::new(class, id, name, layout)
}

static BUILTIN_ENTRIES: [RegistryEntry; 17] = [
    fixed(0x05, 0x00, "ACK-NAK", 2),
    fixed(0x05, 0x01, "ACK-ACK", 2),
    fixed(0x01, 0x02, "NAV-POSLLH", 28),
    fixed(0x01, 0x03, "NAV-STATUS", 16),
    fixed(0x01, 0x04, "NAV-DOP", 18),
    fixed(0x01, 0x06, "NAV-SOL", 52),
    fixed(0x01, 0x07, "NAV-PVT", 92),
    fixed(0x01, 0x12, "NAV-VELNED", 36),
    fixed(0x01, 0x21, "NAV-TIMEUTC", 20),
    fixed(0x01, 0x22, "NAV-CLOCK", 20),
    counted(0x01, 0x30, "NAV-SVINFO", 8, 12, 4),
    counted(0x01, 0x32, "NAV-SBAS", 12, 12, 8),
    RegistryEntry::of::<NavSat<'static>>(),
    counted(0x01, 0x43, "NAV-SIG", 8, 16, 5),
    counted(0x02, 0x15, "RXM-RAWX", 16, 32, 11),
    RegistryEntry::of::<MonVer<'static>>(),
    fixed(0x0a, 0x09, "MON-HW", 60),
];

/// Immutable `(class, id) -> LayoutDescriptor` table.
///
/// Cheap to copy and safe to share between decoders and threads.
#[derive(Debug, Clone, Copy)]
pub struct MessageRegistry<'a> {
    entries: &'a [RegistryEntry],
}

impl<'a> MessageRegistry<'a> {
    /// Checks every entry and rejects duplicate `(class, id)` pairs.
    pub fn new(entries: &'a [RegistryEntry]) -> Result<Self, RegistryError> {
        for (i, entry) in entries.iter().enumerate() {
            entry.validate()?;
            if entries[..i]
                .iter()
                .any(|e| e.class == entry.class && e.id == entry.id)
            {
                return Err(RegistryError::DuplicateEntry {
                    class: entry.class,
                    id: entry.id,
                });
            }
        }
        Ok(Self { entries })
    }

    pub fn lookup(&self, class: u8, id: u8) -> Option<LayoutDescriptor> {
        self.entry(class, id).map(|e| e.layout)
    }

    pub fn entry(&self, class: u8, id: u8) -> Option<&'a RegistryEntry> {
        self.entries.iter().find(|e| e.class == class && e.id == id)
    }

    pub fn iter(&self) -> core::slice::Iter<'a, RegistryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MessageRegistry<'static> {
    /// Registry over the messages this crate knows about out of the box.
    pub fn builtin() -> Self {
        Self {
            entries: &BUILTIN_ENTRIES,
        }
    }
}

impl<'a> IntoIterator for &MessageRegistry<'a> {
    type Item = &'a RegistryEntry;
    type IntoIter = core::slice::Iter<'a, RegistryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
