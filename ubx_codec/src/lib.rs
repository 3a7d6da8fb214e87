//! # ubx_codec
//!
//! Framing, checksum verification and bounds-checked payload overlays for the
//! UBX binary protocol spoken by u-blox GNSS receivers.
//!
//! The crate does not know individual message fields. It knows how to cut a
//! byte stream into checksum-verified frames, how to look up the layout of a
//! frame in a [MessageRegistry], and how to overlay that layout on the payload
//! as a fixed header followed by repeated records.
//!
//! Decoding a stream
//! =================
//!
//! Bytes are pushed into a [Decoder] with `consume()`, which returns an
//! iterator-like object over the events that are now complete. Bytes of an
//! unfinished frame are held back until the next `consume()` call.
//! ```
//! # #[cfg(feature = "alloc")] {
//! use ubx_codec::{DecodeEvent, Decoder, MessageRegistry, MonVer};
//!
//! let mut decoder = Decoder::with_registry(MessageRegistry::builtin());
//! let bytes = ubx_codec::encode_frame(0x0a, 0x04, &[0; 70]).unwrap();
//! let mut it = decoder.consume(&bytes);
//! while let Some(event) = it.next() {
//!     match event {
//!         DecodeEvent::Decoded(msg) => {
//!             assert_eq!(msg.name, "MON-VER");
//!             let ver = msg.overlay::<MonVer>().unwrap();
//!             assert_eq!(ver.extensions().len(), 1);
//!         },
//!         DecodeEvent::Unknown(_) => {
//!             // Valid frame, but not in the registry
//!         },
//!         DecodeEvent::Malformed(msg) => {
//!             // Dropped frame, decoding goes on with the next one
//!             panic!("{}", msg.reason);
//!         },
//!     }
//! }
//! # }
//! ```
//!
//! no_std Support
//! ==============
//!
//! Without the `alloc` feature the decoder runs on caller-provided memory:
//! ```
//! let mut storage = [0; 256];
//! let buf = ubx_codec::FixedLinearBuffer::new(&mut storage[..]);
//! let mut decoder = ubx_codec::Decoder::new(ubx_codec::MessageRegistry::builtin(), buf);
//! assert!(decoder.consume(&[0xb5]).next().is_none());
//! ```
//! The buffer only has to hold the largest frame that can arrive split
//! across two `consume()` calls.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;
extern crate core;
#[cfg(feature = "serde")]
extern crate serde;

pub use crate::{
    constants::{MAX_PAYLOAD_LEN, UBX_FRAME_OVERHEAD, UBX_SYNC_CHAR_1, UBX_SYNC_CHAR_2},
    decoder::{
        decode_frame, DecodeEvent, DecodeIter, DecodedMessage, Decoder, MalformedMessage,
        UnknownMessage,
    },
    error::{LayoutError, MemWriterError, ParserError, RegistryError},
    frame::{frame_len, write_frame, Frame},
    layout::{CountWidth, LayoutDescriptor, RecordCount},
    messages::*,
    parser::{
        ubx_checksum, verify_checksum, FixedBuffer, FixedLinearBuffer, FrameIter, FrameScanner,
        ScanError, ScanState, UbxChecksumCalc, UnderlyingBuffer,
    },
    registry::{MessageRegistry, RegistryEntry},
    view::{PayloadView, RepeatedRecordIterator},
};

#[cfg(feature = "alloc")]
pub use crate::frame::encode_frame;

mod constants;
mod decoder;
mod error;
mod frame;
mod layout;
mod messages;
mod parser;
mod registry;
mod view;
