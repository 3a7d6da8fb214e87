//! Turns a byte stream into one [DecodeEvent] per frame.

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use crate::{
    error::ParserError,
    frame::Frame,
    messages::UbxOverlay,
    parser::{FrameIter, FrameScanner, ScanError, UnderlyingBuffer},
    registry::MessageRegistry,
    view::PayloadView,
};

/// A registered message whose payload matched its layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedMessage<'a> {
    pub class: u8,
    pub id: u8,
    pub name: &'static str,
    pub view: PayloadView<'a>,
}

impl<'a> DecodedMessage<'a> {
    /// Reinterprets the payload as `M`, or `None` when this is another
    /// message or the payload does not fit `M::LAYOUT`.
    pub fn overlay<M: UbxOverlay<'a>>(&self) -> Option<M> {
        if (self.class, self.id) != (M::CLASS, M::ID) {
            return None;
        }
        M::from_view(self.view).or_else(|| M::from_payload(self.view.payload()).ok())
    }
}

/// A checksum-valid frame whose `(class, id)` is not in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownMessage<'a> {
    pub class: u8,
    pub id: u8,
    pub payload: &'a [u8],
}

/// A frame that was dropped; `class` and `id` are as claimed by its header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MalformedMessage {
    pub class: u8,
    pub id: u8,
    pub reason: ParserError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeEvent<'a> {
    Decoded(DecodedMessage<'a>),
    Unknown(UnknownMessage<'a>),
    Malformed(MalformedMessage),
}

impl DecodeEvent<'_> {
    pub fn class(&self) -> u8 {
        match self {
            DecodeEvent::Decoded(msg) => msg.class,
            DecodeEvent::Unknown(msg) => msg.class,
            DecodeEvent::Malformed(msg) => msg.class,
        }
    }

    pub fn id(&self) -> u8 {
        match self {
            DecodeEvent::Decoded(msg) => msg.id,
            DecodeEvent::Unknown(msg) => msg.id,
            DecodeEvent::Malformed(msg) => msg.id,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, DecodeEvent::Malformed(_))
    }
}

impl From<ScanError> for DecodeEvent<'_> {
    fn from(err: ScanError) -> Self {
        DecodeEvent::Malformed(MalformedMessage {
            class: err.class,
            id: err.id,
            reason: err.error,
        })
    }
}

/// Classifies a single checksum-verified frame against `registry`.
pub fn decode_frame<'a>(registry: &MessageRegistry<'_>, frame: Frame<'a>) -> DecodeEvent<'a> {
    let (class, id, payload) = (frame.class(), frame.msg_id(), frame.payload());
    let Some(entry) = registry.entry(class, id) else {
        log::trace!("unregistered message {:#04x}/{:#04x}", class, id);
        return DecodeEvent::Unknown(UnknownMessage { class, id, payload });
    };
    match PayloadView::new(payload, entry.layout) {
        Ok(view) => {
            log::trace!("decoded {} ({} records)", entry.name, view.record_count());
            DecodeEvent::Decoded(DecodedMessage {
                class,
                id,
                name: entry.name,
                view,
            })
        },
        Err(err) => {
            log::debug!("{}: {}", entry.name, err);
            DecodeEvent::Malformed(MalformedMessage {
                class,
                id,
                reason: err.into(),
            })
        },
    }
}

/// Streaming decoder: a [FrameScanner] plus the registry used to interpret
/// the frames it finds.
pub struct Decoder<'r, T: UnderlyingBuffer> {
    scanner: FrameScanner<T>,
    registry: MessageRegistry<'r>,
}

#[cfg(feature = "alloc")]
impl<'r> Decoder<'r, Vec<u8>> {
    /// Decoder with a growable buffer.
    pub fn with_registry(registry: MessageRegistry<'r>) -> Self {
        Self::new(registry, Vec::new())
    }
}

#[cfg(feature = "alloc")]
impl Default for Decoder<'static, Vec<u8>> {
    fn default() -> Self {
        Self::with_registry(MessageRegistry::builtin())
    }
}

impl<'r, T: UnderlyingBuffer> Decoder<'r, T> {
    pub fn new(registry: MessageRegistry<'r>, buffer: T) -> Self {
        Self {
            scanner: FrameScanner::new(buffer),
            registry,
        }
    }

    pub fn with_max_payload_len(mut self, max_payload_len: usize) -> Self {
        self.scanner = self.scanner.with_max_payload_len(max_payload_len);
        self
    }

    pub fn registry(&self) -> MessageRegistry<'r> {
        self.registry
    }

    pub fn scanner(&self) -> &FrameScanner<T> {
        &self.scanner
    }

    /// Drops the partial frame held back from earlier calls, if any.
    pub fn reset(&mut self) {
        self.scanner.reset();
    }

    /// Feeds `bytes` to the decoder. Iterate the result until it returns
    /// `None`, then call `consume` again with more bytes.
    pub fn consume<'a>(&'a mut self, bytes: &'a [u8]) -> DecodeIter<'a, 'r, T> {
        DecodeIter {
            frames: self.scanner.consume(bytes),
            registry: self.registry,
        }
    }
}

/// Events available after a [Decoder::consume] call
pub struct DecodeIter<'a, 'r, T: UnderlyingBuffer> {
    frames: FrameIter<'a, T>,
    registry: MessageRegistry<'r>,
}

impl<T: UnderlyingBuffer> DecodeIter<'_, '_, T> {
    #[allow(clippy::should_implement_trait)]
    /// Analog of `core::iter::Iterator::next`, see [FrameIter::next].
    pub fn next(&mut self) -> Option<DecodeEvent<'_>> {
        let registry = self.registry;
        match self.frames.next()? {
            Ok(frame) => Some(decode_frame(&registry, frame)),
            Err(err) => Some(err.into()),
        }
    }
}
