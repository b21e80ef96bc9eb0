//! Bathymetry datagrams
use super::{body, counted, Padding, Stamp};
use binrw::binrw;

fn finite(x: f32) -> f32 {
    if x.is_nan() {
        0.0
    } else {
        x
    }
}

/// Depth (`D`), the bathymetry datagram of older EM systems
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Depth {
    #[brw(ignore)]
    pub stamp: Stamp,
    pub counter: u16,
    pub serial: u16,
    /// Heading of the vessel in 0.01 degrees
    pub heading: u16,
    /// Sound speed at the transducer in 0.1 m/s
    pub sound_speed: u16,
    /// Transmit transducer depth in cm
    pub transducer_depth: u16,
    /// Maximum number of beams possible
    pub max_beams: u8,
    #[br(temp)]
    #[bw(try_calc = u8::try_from(beams.len()))]
    beam_count: u8,
    /// Depth resolution in cm
    pub z_resolution: u8,
    /// Horizontal resolution in cm
    pub xy_resolution: u8,
    /// Sampling rate in Hz
    pub sampling_frequency: u16,
    /// The valid beams
    #[br(parse_with = counted, args(beam_count as usize))]
    pub beams: Vec<DepthBeam>,
    /// Transducer depth offset multiplier
    pub range_multiplier: i8,
}
body!(Depth, Padding::Never);

/// One beam of a [`Depth`] datagram
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DepthBeam {
    /// Depth in cm; unsigned for models below 700, signed otherwise
    pub depth: u16,
    /// Across-track distance in cm
    pub across_track: i16,
    /// Along-track distance in cm
    pub along_track: i16,
    /// Beam depression angle in 0.01 degrees
    pub depression_angle: i16,
    /// Beam azimuth angle in 0.01 degrees
    pub azimuth_angle: u16,
    /// One-way range in samples
    pub range: u16,
    pub quality_factor: u8,
    /// Length of detection window in samples
    pub detection_window: u8,
    /// Reflectivity in 0.5 dB
    pub reflectivity: i8,
    /// Beam number
    pub beam_number: u8,
}

impl DepthBeam {
    /// Depth in metres for a system of the given model
    pub fn depth(&self, model: u16) -> f64 {
        if model < 700 {
            f64::from(self.depth) / 100.0
        } else {
            f64::from(self.depth as i16) / 100.0
        }
    }

    /// Across-track distance in metres
    pub fn across_track(&self) -> f64 {
        f64::from(self.across_track) / 100.0
    }

    /// Along-track distance in metres
    pub fn along_track(&self) -> f64 {
        f64::from(self.along_track) / 100.0
    }
}

impl Depth {
    /// Heading in degrees
    pub fn heading(&self) -> f64 {
        f64::from(self.heading) / 100.0
    }

    /// Sound speed at the transducer in m/s
    pub fn sound_speed(&self) -> f64 {
        f64::from(self.sound_speed) / 10.0
    }

    /// Transducer depth in metres
    pub fn transducer_depth(&self) -> f64 {
        f64::from(self.transducer_depth) / 100.0
    }
}

/// XYZ 88 (`X`), the bathymetry datagram of current EM systems
///
/// Beam positions are relative to the transmit transducer. NaN distances
/// sometimes written by the acquisition system are read as zero.
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Xyz {
    #[brw(ignore)]
    pub stamp: Stamp,
    pub counter: u16,
    pub serial: u16,
    /// Heading of the vessel in 0.01 degrees
    pub heading: u16,
    /// Sound speed at the transducer in 0.1 m/s
    pub sound_speed: u16,
    /// Transmit transducer depth in metres
    pub transducer_depth: f32,
    #[br(temp)]
    #[bw(try_calc = u16::try_from(beams.len()))]
    beam_count: u16,
    /// Number of valid detections
    pub valid_detections: u16,
    /// Sampling frequency in Hz
    pub sampling_frequency: f32,
    /// Scanning mode information
    pub scanning_info: u8,
    pub spare: [u8; 3],
    #[br(parse_with = counted, args(beam_count as usize))]
    pub beams: Vec<XyzBeam>,
}
body!(Xyz, Padding::Always);

/// One beam of an [`Xyz`] datagram
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct XyzBeam {
    /// Depth in metres
    #[br(map = finite)]
    pub depth: f32,
    /// Across-track distance in metres
    #[br(map = finite)]
    pub across_track: f32,
    /// Along-track distance in metres
    #[br(map = finite)]
    pub along_track: f32,
    /// Detection window length in samples
    pub detection_window: u16,
    pub quality_factor: u8,
    /// Beam incidence angle adjustment in 0.1 degrees
    pub incidence_adjustment: i8,
    pub detection_info: u8,
    /// Real time cleaning information
    pub cleaning_info: i8,
    pub reflectivity: i16,
}

impl Xyz {
    /// Heading in degrees
    pub fn heading(&self) -> f64 {
        f64::from(self.heading) / 100.0
    }

    /// Sound speed at the transducer in m/s
    pub fn sound_speed(&self) -> f64 {
        f64::from(self.sound_speed) / 10.0
    }
}
