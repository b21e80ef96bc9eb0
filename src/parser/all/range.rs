//! Raw range and angle datagrams
use super::{body, counted, Padding, Stamp};
use binrw::binrw;

/// Raw range and angle 78 (`N`)
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RangeAngle {
    #[brw(ignore)]
    pub stamp: Stamp,
    pub counter: u16,
    pub serial: u16,
    pub sound_speed: u16,
    #[br(temp)]
    #[bw(try_calc = u16::try_from(sectors.len()))]
    sector_count: u16,
    #[br(temp)]
    #[bw(try_calc = u16::try_from(beams.len()))]
    beam_count: u16,
    pub valid_detections: u16,
    pub sampling_frequency: f32,
    pub dscale: u32,
    #[br(parse_with = counted, args(sector_count as usize))]
    pub sectors: Vec<TxSector>,
    #[br(parse_with = counted, args(beam_count as usize))]
    pub beams: Vec<RxBeam>,
}
body!(RangeAngle, Padding::Always);

/// One transmit sector of a [`RangeAngle`] datagram
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TxSector {
    pub tilt_angle: i16,
    pub focus_range: u16,
    pub signal_length: f32,
    pub transmit_delay: f32,
    pub centre_frequency: f32,
    pub absorption: u16,
    pub waveform: u8,
    pub sector_number: u8,
    pub bandwidth: f32,
}

/// One receive beam of a [`RangeAngle`] datagram
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RxBeam {
    pub pointing_angle: i16,
    pub sector: u8,
    pub detection_info: u8,
    pub detection_window: u16,
    pub quality_factor: u8,
    pub dcorr: i8,
    pub travel_time: f32,
    pub reflectivity: i16,
    pub cleaning_info: i8,
    pub spare: u8,
}

impl TxSector {
    /// Tilt angle in degrees
    pub fn tilt_angle(&self) -> f64 {
        f64::from(self.tilt_angle) / 100.0
    }
}

impl RxBeam {
    /// Beam pointing angle in degrees
    pub fn pointing_angle(&self) -> f64 {
        f64::from(self.pointing_angle) / 100.0
    }
}

impl RangeAngle {
    /// Centre frequency of the first transmit sector in Hz
    ///
    /// This is the frequency used to tell pings of dual-frequency systems
    /// apart.
    pub fn centre_frequency(&self) -> Option<f32> {
        self.sectors.first().map(|s| s.centre_frequency)
    }

    /// Sound speed at the transducer in m/s
    pub fn sound_speed(&self) -> f64 {
        f64::from(self.sound_speed) / 10.0
    }
}
