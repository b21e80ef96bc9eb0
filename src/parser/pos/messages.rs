//! Configuration messages echoed into the log
use super::{record, OriginSource, TimeOrigin, MESSAGE_START};
use crate::clock;
use binrw::binrw;

/// General installation and processing parameters (MSG 20)
///
/// Lever arms are in metres in the reference frame, mounting angles in
/// degrees.
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InstallationParameters {
    pub transaction: u16,
    pub time_types: u8,
    pub distance_types: u8,
    pub autostart: u8,
    pub reference_to_imu: [f32; 3],
    pub reference_to_primary_gnss: [f32; 3],
    pub reference_to_aux1_gnss: [f32; 3],
    pub reference_to_aux2_gnss: [f32; 3],
    pub imu_mounting: [f32; 3],
    pub reference_mounting: [f32; 3],
    pub multipath: u8,
}
record!(InstallationParameters, MESSAGE_START, 20);

/// General data (MSG 56)
///
/// The only record that carries a calendar date, which makes it the
/// in-stream source of the GPS week.
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeneralData {
    pub transaction: u16,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub month: u8,
    pub day: u8,
    pub year: u16,
    pub alignment_status: u8,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub horizontal_cep: f32,
    pub altitude_rms: f32,
    pub distance: f64,
    pub roll: f64,
    pub pitch: f64,
    pub heading: f64,
}
record!(GeneralData, MESSAGE_START, 56);

impl GeneralData {
    /// The origin of the GPS week of the message date
    ///
    /// Only the date is used; the time of day fields are set by the
    /// operator and are not reliable.
    pub fn origin(&self) -> Option<TimeOrigin> {
        let yyyymmdd =
            u32::from(self.year) * 10_000 + u32::from(self.month) * 100 + u32::from(self.day);
        clock::calendar_date(yyyymmdd).map(|date| TimeOrigin::from_date(date, OriginSource::Record))
    }
}
