use bitflags::bitflags;

use super::{UbxMessageMeta, UbxOverlay};
use crate::{
    layout::{CountWidth, LayoutDescriptor},
    view::{read_array, PayloadView, RepeatedRecordIterator},
};

/// Satellite Information
#[derive(Debug, Clone, Copy)]
pub struct NavSat<'a>(PayloadView<'a>);

impl UbxMessageMeta for NavSat<'_> {
    const CLASS: u8 = 0x01;
    const ID: u8 = 0x35;
    const NAME: &'static str = "NAV-SAT";
    const LAYOUT: LayoutDescriptor = LayoutDescriptor::repeated(8, 12)
        .with_count_field(5, CountWidth::U8)
        .with_max_records(255);
}

impl<'a> UbxOverlay<'a> for NavSat<'a> {
    fn from_view(view: PayloadView<'a>) -> Option<Self> {
        (view.layout() == Self::LAYOUT).then_some(Self(view))
    }
}

impl<'a> NavSat<'a> {
    /// GPS time of week in ms
    pub fn itow(&self) -> u32 {
        self.0.u32_at(0).unwrap_or_default()
    }

    /// Message version, should be 1
    pub fn version(&self) -> u8 {
        self.0.u8_at(4).unwrap_or_default()
    }

    pub fn num_svs(&self) -> u8 {
        self.0.u8_at(5).unwrap_or_default()
    }

    pub fn svs(&self) -> NavSatIter<'a> {
        NavSatIter(self.0.repeated())
    }
}

#[derive(Debug, Clone)]
pub struct NavSatIter<'a>(RepeatedRecordIterator<'a>);

impl<'a> Iterator for NavSatIter<'a> {
    type Item = NavSatSvInfo<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(NavSatSvInfo)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl ExactSizeIterator for NavSatIter<'_> {}

/// One 12-byte satellite record of [NavSat]
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct NavSatSvInfo<'a>(&'a [u8]);

impl NavSatSvInfo<'_> {
    fn byte(&self, offset: usize) -> u8 {
        self.0.get(offset).copied().unwrap_or_default()
    }

    fn field<const N: usize>(&self, offset: usize) -> [u8; N] {
        read_array(self.0, offset).unwrap_or([0; N])
    }

    /// GNSS identifier
    pub fn gnss_id(&self) -> u8 {
        self.byte(0)
    }

    /// Satellite identifier
    pub fn sv_id(&self) -> u8 {
        self.byte(1)
    }

    /// Carrier to noise ratio in dBHz
    pub fn cno(&self) -> u8 {
        self.byte(2)
    }

    /// Elevation in degrees, -91 when unknown
    pub fn elev(&self) -> i8 {
        self.byte(3) as i8
    }

    /// Azimuth in degrees
    pub fn azim(&self) -> i16 {
        i16::from_le_bytes(self.field(4))
    }

    /// Pseudorange residual in units of 0.1 m
    pub fn pr_res_raw(&self) -> i16 {
        i16::from_le_bytes(self.field(6))
    }

    /// Pseudorange residual in m
    pub fn pr_res(&self) -> f32 {
        f32::from(self.pr_res_raw()) * 0.1
    }

    pub fn flags(&self) -> NavSatSvFlags {
        NavSatSvFlags::from_bits_retain(u32::from_le_bytes(self.field(8)))
    }
}

impl core::fmt::Debug for NavSatSvInfo<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NavSatSvInfo")
            .field("gnss_id", &self.gnss_id())
            .field("sv_id", &self.sv_id())
            .field("cno", &self.cno())
            .field("elev", &self.elev())
            .field("azim", &self.azim())
            .field("pr_res", &self.pr_res())
            .field("flags", &self.flags())
            .finish()
    }
}

bitflags! {
    /// Per-satellite status bits of [NavSatSvInfo]
    ///
    /// The quality indicator and health occupy multi-bit fields, see
    /// [NavSatSvFlags::quality_ind] and [NavSatSvFlags::health].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct NavSatSvFlags: u32 {
        /// Signal currently used for navigation
        const SV_USED = 1 << 3;
        const DIFF_CORR = 1 << 6;
        /// Carrier smoothed pseudorange used
        const SMOOTHED = 1 << 7;
        const EPH_AVAIL = 1 << 11;
        const ALM_AVAIL = 1 << 12;
        /// AssistNow Offline data available
        const ANO_AVAIL = 1 << 13;
        /// AssistNow Autonomous data available
        const AOP_AVAIL = 1 << 14;
        const SBAS_CORR_USED = 1 << 16;
        const RTCM_CORR_USED = 1 << 17;
        const SLAS_CORR_USED = 1 << 18;
        const SPARTN_CORR_USED = 1 << 19;
        const PR_CORR_USED = 1 << 20;
        const CR_CORR_USED = 1 << 21;
        const DO_CORR_USED = 1 << 22;

        const _ = !0;
    }
}

impl NavSatSvFlags {
    pub fn quality_ind(self) -> NavSatQualityIndicator {
        match self.bits() & 0x7 {
            0 => NavSatQualityIndicator::NoSignal,
            1 => NavSatQualityIndicator::Searching,
            2 => NavSatQualityIndicator::SignalAcquired,
            3 => NavSatQualityIndicator::SignalDetected,
            4 => NavSatQualityIndicator::CodeLock,
            _ => NavSatQualityIndicator::CarrierLock,
        }
    }

    pub fn health(self) -> NavSatSvHealth {
        match (self.bits() >> 4) & 0x3 {
            1 => NavSatSvHealth::Healthy,
            2 => NavSatSvHealth::Unhealthy,
            x => NavSatSvHealth::Unknown(x as u8),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum NavSatQualityIndicator {
    NoSignal,
    Searching,
    SignalAcquired,
    SignalDetected,
    CodeLock,
    /// Code and carrier locked, time synchronized
    CarrierLock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum NavSatSvHealth {
    Healthy,
    Unhealthy,
    Unknown(u8),
}
