//! Position datagrams
use super::attitude::centi_degrees;
use super::{body, counted, Padding, Stamp};
use binrw::binrw;

/// Position (`P`)
///
/// Carries the decoded fix and the raw input datagram it came from.
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Position {
    #[brw(ignore)]
    pub stamp: Stamp,
    pub counter: u16,
    pub serial: u16,
    /// Latitude in units of 1/20 000 000 degree
    pub latitude: i32,
    /// Longitude in units of 1/10 000 000 degree
    pub longitude: i32,
    /// Fix quality in cm
    pub quality: u16,
    /// Speed over ground in cm/s
    pub speed: u16,
    /// Course over ground in 0.01 degrees
    pub course: u16,
    /// Heading in 0.01 degrees
    pub heading: u16,
    /// Position system descriptor
    pub descriptor: u8,
    #[br(temp)]
    #[bw(try_calc = u8::try_from(input.len()))]
    input_len: u8,
    /// The input datagram as received from the positioning system
    #[br(parse_with = counted, args(input_len as usize))]
    pub input: Vec<u8>,
}
body!(Position, Padding::Parity);

impl Position {
    /// Build a position from values in degrees, metres and m/s
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        stamp: Stamp,
        counter: u16,
        serial: u16,
        latitude: f64,
        longitude: f64,
        quality: f64,
        speed: f64,
        course: f64,
        heading: f64,
        descriptor: u8,
        input: Vec<u8>,
    ) -> Self {
        Position {
            stamp,
            counter,
            serial,
            latitude: (latitude * 20_000_000.0).round() as i32,
            longitude: (longitude * 10_000_000.0).round() as i32,
            quality: (quality * 100.0).round() as u16,
            speed: (speed * 100.0).round() as u16,
            course: centi_degrees(course),
            heading: centi_degrees(heading),
            descriptor,
            input,
        }
    }

    /// Latitude in degrees
    pub fn latitude(&self) -> f64 {
        f64::from(self.latitude) / 20_000_000.0
    }

    /// Longitude in degrees
    pub fn longitude(&self) -> f64 {
        f64::from(self.longitude) / 10_000_000.0
    }

    /// Fix quality in metres
    pub fn quality(&self) -> f64 {
        f64::from(self.quality) / 100.0
    }

    /// Speed over ground in m/s
    pub fn speed(&self) -> f64 {
        f64::from(self.speed) / 100.0
    }

    /// Course over ground in degrees
    pub fn course(&self) -> f64 {
        f64::from(self.course) / 100.0
    }

    /// Heading in degrees
    pub fn heading(&self) -> f64 {
        f64::from(self.heading) / 100.0
    }
}
