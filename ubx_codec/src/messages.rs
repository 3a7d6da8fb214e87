//! Typed overlays for a few messages, built on [PayloadView].
//!
//! Each overlay is a thin wrapper that interprets the fixed header and the
//! records of an already validated view; none of them copies the payload.

mod mon_ver;
mod nav_sat;

pub use mon_ver::{MonVer, MonVerExtensionIter};
pub use nav_sat::{
    NavSat, NavSatIter, NavSatQualityIndicator, NavSatSvFlags, NavSatSvHealth, NavSatSvInfo,
};

use crate::{layout::LayoutDescriptor, view::PayloadView};

/// Identity and layout of a message type, known at compile time
pub trait UbxMessageMeta {
    const CLASS: u8;
    const ID: u8;
    const NAME: &'static str;
    const LAYOUT: LayoutDescriptor;
}

/// A typed interpretation of a validated payload.
pub trait UbxOverlay<'a>: UbxMessageMeta + Sized {
    /// Wraps `view`, or `None` when it was not built with `Self::LAYOUT`.
    fn from_view(view: PayloadView<'a>) -> Option<Self>;

    /// Validates `payload` against `Self::LAYOUT` and wraps it.
    fn from_payload(payload: &'a [u8]) -> Result<Self, crate::LayoutError> {
        let view = PayloadView::new(payload, Self::LAYOUT)?;
        // Only fails for an impl whose `from_view` rejects its own layout.
        Self::from_view(view).ok_or(crate::LayoutError::PayloadTooShort {
            min: Self::LAYOUT.fixed_size,
            got: payload.len(),
        })
    }
}

/// Interprets a fixed-width, NUL-padded ASCII field.
///
/// Returns `None` when there is no terminating NUL or the text is not UTF-8.
pub(crate) fn c_str(bytes: &[u8]) -> Option<&str> {
    let end = bytes.iter().position(|b| *b == 0)?;
    core::str::from_utf8(&bytes[..end]).ok()
}
