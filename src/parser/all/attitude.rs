//! Motion sensor datagrams: attitude, network attitude, heading and height
use super::{body, counted, Padding, Stamp};
use binrw::binrw;

/// Attitude (`A`): a batch of motion sensor samples
///
/// The first sample is usually at the datagram time; every sample stores
/// its offset from that time in milliseconds.
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Attitude {
    #[brw(ignore)]
    pub stamp: Stamp,
    /// Attitude datagram counter
    pub counter: u16,
    pub serial: u16,
    #[br(temp)]
    #[bw(try_calc = u16::try_from(entries.len()))]
    entry_count: u16,
    #[br(parse_with = counted, args(entry_count as usize))]
    pub entries: Vec<AttitudeEntry>,
    /// Sensor system descriptor
    pub system_descriptor: u8,
}
body!(Attitude, Padding::Never);

/// One sample of an [`Attitude`] datagram
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttitudeEntry {
    /// Milliseconds since the datagram time
    pub time_offset: u16,
    /// Sensor status bits
    pub status: u16,
    /// Roll in 0.01 degrees
    pub roll: i16,
    /// Pitch in 0.01 degrees
    pub pitch: i16,
    /// Heave in cm
    pub heave: i16,
    /// Heading in 0.01 degrees
    pub heading: u16,
}

pub(crate) fn centi(value: f64) -> i16 {
    (value * 100.0).round() as i16
}

pub(crate) fn centi_degrees(heading: f64) -> u16 {
    ((heading.rem_euclid(360.0)) * 100.0).round() as u16 % 36000
}

impl AttitudeEntry {
    /// Build a sample from values in degrees and metres
    pub fn new(time_offset: u16, roll: f64, pitch: f64, heave: f64, heading: f64) -> Self {
        AttitudeEntry {
            time_offset,
            status: 0,
            roll: centi(roll),
            pitch: centi(pitch),
            heave: centi(heave),
            heading: centi_degrees(heading),
        }
    }

    /// Roll in degrees
    pub fn roll(&self) -> f64 {
        f64::from(self.roll) / 100.0
    }

    /// Pitch in degrees
    pub fn pitch(&self) -> f64 {
        f64::from(self.pitch) / 100.0
    }

    /// Heave in metres
    pub fn heave(&self) -> f64 {
        f64::from(self.heave) / 100.0
    }

    /// Heading in degrees
    pub fn heading(&self) -> f64 {
        f64::from(self.heading) / 100.0
    }
}

impl Attitude {
    /// Unix seconds of each sample
    pub fn sample_times(&self) -> Vec<f64> {
        let base = self.stamp.timestamp().unwrap_or_default();
        self.entries
            .iter()
            .map(|e| base + f64::from(e.time_offset) / 1000.0)
            .collect()
    }
}

/// Network attitude velocity (`n`)
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NetworkAttitude {
    #[brw(ignore)]
    pub stamp: Stamp,
    pub counter: u16,
    pub serial: u16,
    #[br(temp)]
    #[bw(try_calc = u16::try_from(entries.len()))]
    entry_count: u16,
    /// Sensor system descriptor
    pub system_descriptor: i8,
    pub spare: u8,
    #[br(parse_with = counted, args(entry_count as usize))]
    pub entries: Vec<NetworkAttitudeEntry>,
}
body!(NetworkAttitude, Padding::Parity);

/// One sample of a [`NetworkAttitude`] datagram, with the sensor telegram
/// it was decoded from
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NetworkAttitudeEntry {
    /// Milliseconds since the datagram time
    pub time_offset: u16,
    /// Roll in 0.01 degrees
    pub roll: i16,
    /// Pitch in 0.01 degrees
    pub pitch: i16,
    /// Heave in cm
    pub heave: i16,
    /// Heading in 0.01 degrees
    pub heading: u16,
    #[br(temp)]
    #[bw(try_calc = u8::try_from(telegram.len()))]
    telegram_len: u8,
    /// The input telegram as received
    #[br(parse_with = counted, args(telegram_len as usize))]
    pub telegram: Vec<u8>,
}

/// Heading (`H`)
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Heading {
    #[brw(ignore)]
    pub stamp: Stamp,
    pub counter: u16,
    pub serial: u16,
    #[br(temp)]
    #[bw(try_calc = u16::try_from(entries.len()))]
    entry_count: u16,
    #[br(parse_with = counted, args(entry_count as usize))]
    pub entries: Vec<HeadingEntry>,
    /// Heading indicator, 0 when the sensor is inactive
    pub heading_indicator: u8,
}
body!(Heading, Padding::Never);

/// One sample of a [`Heading`] datagram
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeadingEntry {
    /// Milliseconds since the datagram time
    pub time_offset: u16,
    /// Heading in 0.01 degrees
    pub heading: u16,
}

/// Height (`h`)
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Height {
    #[brw(ignore)]
    pub stamp: Stamp,
    pub counter: u16,
    pub serial: u16,
    /// Height in cm
    pub height: i32,
    /// Height type as given in the installation parameters
    pub height_type: u8,
}
body!(Height, Padding::Never);

impl Height {
    /// Height in metres
    pub fn metres(&self) -> f64 {
        f64::from(self.height) / 100.0
    }
}
