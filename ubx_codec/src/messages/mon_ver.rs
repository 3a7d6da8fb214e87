use super::{c_str, UbxMessageMeta, UbxOverlay};
use crate::{
    layout::LayoutDescriptor,
    view::{PayloadView, RepeatedRecordIterator},
};

/// Receiver/Software Version
///
/// 30 bytes of software version and 10 bytes of hardware version, followed
/// by any number of 30-byte extension strings.
#[derive(Debug, Clone, Copy)]
pub struct MonVer<'a>(PayloadView<'a>);

impl UbxMessageMeta for MonVer<'_> {
    const CLASS: u8 = 0x0a;
    const ID: u8 = 0x04;
    const NAME: &'static str = "MON-VER";
    const LAYOUT: LayoutDescriptor = LayoutDescriptor::repeated(40, 30);
}

impl<'a> UbxOverlay<'a> for MonVer<'a> {
    fn from_view(view: PayloadView<'a>) -> Option<Self> {
        (view.layout() == Self::LAYOUT).then_some(Self(view))
    }
}

impl<'a> MonVer<'a> {
    pub fn software_version(&self) -> Option<&'a str> {
        self.0.fixed_fields().get(0..30).and_then(c_str)
    }

    pub fn hardware_version(&self) -> Option<&'a str> {
        self.0.fixed_fields().get(30..40).and_then(c_str)
    }

    /// Extended software information strings
    pub fn extensions(&self) -> MonVerExtensionIter<'a> {
        MonVerExtensionIter(self.0.repeated())
    }
}

/// Yields `None` for an extension that is not a valid NUL-terminated string.
#[derive(Debug, Clone)]
pub struct MonVerExtensionIter<'a>(RepeatedRecordIterator<'a>);

impl<'a> Iterator for MonVerExtensionIter<'a> {
    type Item = Option<&'a str>;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(c_str)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl ExactSizeIterator for MonVerExtensionIter<'_> {}
