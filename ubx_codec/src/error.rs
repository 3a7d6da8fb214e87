use core::fmt;

/// Error returned while writing a frame into caller-provided memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemWriterError {
    NotEnoughMem { required: usize, available: usize },
    PayloadTooLarge { len: usize },
}

impl fmt::Display for MemWriterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemWriterError::NotEnoughMem {
                required,
                available,
            } => write!(
                f,
                "Not enough memory error, need {} bytes, have {}",
                required, available
            ),
            MemWriterError::PayloadTooLarge { len } => write!(
                f,
                "Payload of {} bytes does not fit the 16-bit length field",
                len
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for MemWriterError {}

/// Why a payload does not fit the layout registered for its message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum LayoutError {
    /// Payload is shorter than the fixed header
    PayloadTooShort { min: usize, got: usize },
    /// Bytes after the fixed header are not a whole number of records
    TrailingBytes {
        fixed_size: usize,
        record_size: usize,
        got: usize,
    },
    /// Explicit count field disagrees with the number of records present
    CountFieldMismatch { field: usize, derived: usize },
    TooFewRecords { count: usize, min: usize },
    TooManyRecords { count: usize, max: usize },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::PayloadTooShort { min, got } => write!(
                f,
                "Payload too short, expect at least {} bytes, got {}",
                min, got
            ),
            LayoutError::TrailingBytes {
                fixed_size,
                record_size,
                got,
            } => write!(
                f,
                "Payload length {} is not {} + k * {}",
                got, fixed_size, record_size
            ),
            LayoutError::CountFieldMismatch { field, derived } => write!(
                f,
                "Count field says {} records, payload holds {}",
                field, derived
            ),
            LayoutError::TooFewRecords { count, min } => {
                write!(f, "Got {} records, expect at least {}", count, min)
            },
            LayoutError::TooManyRecords { count, max } => {
                write!(f, "Got {} records, expect at most {}", count, max)
            },
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LayoutError {}

/// Error that possible during frame scanning and payload decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ParserError {
    /// Checksums are packed little-endian: `u16::from_le_bytes([ck_a, ck_b])`
    ChecksumMismatch {
        expect: u16,
        got: u16,
    },
    FrameTooLarge {
        len: usize,
        max: usize,
    },
    OutOfMemory {
        required_size: usize,
    },
    LayoutMismatch(LayoutError),
}

impl From<LayoutError> for ParserError {
    fn from(err: LayoutError) -> Self {
        ParserError::LayoutMismatch(err)
    }
}

impl fmt::Display for ParserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParserError::ChecksumMismatch { expect, got } => write!(
                f,
                "Not valid packet's checksum, expect {:x}, got {:x}",
                expect, got
            ),
            ParserError::FrameTooLarge { len, max } => write!(
                f,
                "Frame length field {} exceeds maximum payload length {}",
                len, max
            ),
            ParserError::OutOfMemory { required_size } => write!(
                f,
                "Not enough memory in underlying buffer, need {} bytes",
                required_size
            ),
            ParserError::LayoutMismatch(err) => write!(f, "Layout mismatch: {}", err),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParserError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParserError::LayoutMismatch(err) => Some(err),
            _ => None,
        }
    }
}

/// Problems found while validating a registry table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    DuplicateEntry { class: u8, id: u8 },
    /// The count field does not lie inside the fixed header
    CountFieldOutOfBounds { class: u8, id: u8 },
    /// A count field was declared for a layout without repeated records
    CountFieldWithoutRecords { class: u8, id: u8 },
    /// `min_records` is greater than `max_records`
    InvalidRecordBounds { class: u8, id: u8 },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::DuplicateEntry { class, id } => {
                write!(f, "Duplicate registry entry {:#04x}/{:#04x}", class, id)
            },
            RegistryError::CountFieldOutOfBounds { class, id } => write!(
                f,
                "Count field of {:#04x}/{:#04x} lies outside the fixed header",
                class, id
            ),
            RegistryError::CountFieldWithoutRecords { class, id } => write!(
                f,
                "{:#04x}/{:#04x} declares a count field but no repeated records",
                class, id
            ),
            RegistryError::InvalidRecordBounds { class, id } => write!(
                f,
                "{:#04x}/{:#04x} has min_records greater than max_records",
                class, id
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for RegistryError {}
