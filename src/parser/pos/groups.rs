//! Navigation output groups
use super::{counted, record, to_footer, TimeDistance, GROUP_START};
use binrw::binrw;

/// Vessel position, velocity, attitude and dynamics (GRP 1)
///
/// Angles in degrees, altitude in metres, velocities in m/s.
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VesselNavigation {
    pub time: TimeDistance,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub north_velocity: f32,
    pub east_velocity: f32,
    pub down_velocity: f32,
    pub roll: f64,
    pub pitch: f64,
    pub heading: f64,
    pub wander_angle: f64,
    pub track: f32,
    pub speed: f32,
    pub rate_longitudinal: f32,
    pub rate_transverse: f32,
    pub rate_down: f32,
    pub accel_longitudinal: f32,
    pub accel_transverse: f32,
    pub accel_down: f32,
    pub alignment_status: u8,
}
record!(VesselNavigation, GROUP_START, 1);

/// Time-tagged IMU data (GRP 4)
///
/// The raw data block is in the format of the IMU model and is kept opaque.
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImuData {
    pub time: TimeDistance,
    pub imu_header: [u8; 6],
    #[br(temp)]
    #[bw(try_calc = u16::try_from(data.len()))]
    data_len: u16,
    #[br(parse_with = counted, args(data_len as usize))]
    pub data: Vec<u8>,
    pub data_checksum: i16,
    pub data_status: u8,
}
record!(ImuData, GROUP_START, 4);

/// General status and FDIR (GRP 10)
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeneralStatus {
    pub time: TimeDistance,
    pub status_a: u32,
    pub status_b: u32,
    pub status_c: u32,
    pub fdir_level1: u32,
    pub fdir_level1_imu_failures: u16,
    pub fdir_level2: u16,
    pub fdir_level3: u16,
    pub fdir_level4: u16,
    pub fdir_level5: u16,
    pub extended_status: u32,
}
record!(GeneralStatus, GROUP_START, 10);

/// Calibrated installation parameters (GRP 14)
///
/// Lever arm calibration status and figures of merit, kept as read.
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CalibratedInstallation {
    pub time: TimeDistance,
    #[br(parse_with = to_footer)]
    pub content: Vec<u8>,
}
record!(CalibratedInstallation, GROUP_START, 14);

/// GNSS receiver MarineSTAR status (GRP 29)
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GnssStatus {
    pub time: TimeDistance,
    #[br(parse_with = to_footer)]
    pub content: Vec<u8>,
}
record!(GnssStatus, GROUP_START, 29);

/// MV general status and FDIR (GRP 110)
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MvStatus {
    pub time: TimeDistance,
    pub general_status: u16,
    pub truez_time_remaining: u16,
}
record!(MvStatus, GROUP_START, 110);

/// True heave (GRP 111)
///
/// True heave is computed with a delay of a few minutes, so it is logged for
/// a time window (`heave_time1`, seconds of week) well before the group's
/// own time tag. Heaves are in metres.
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrueHeave {
    pub time: TimeDistance,
    pub true_heave: f32,
    pub true_heave_rms: f32,
    pub status: u32,
    pub heave: f32,
    pub heave_rms: f32,
    pub heave_time1: f64,
    pub heave_time2: f64,
    pub rejected_imu: u32,
    pub out_of_range_imu: u32,
}
record!(TrueHeave, GROUP_START, 111);

/// NMEA strings (GRP 112)
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NmeaStrings {
    pub time: TimeDistance,
    #[br(temp)]
    #[bw(try_calc = u16::try_from(nmea.len()))]
    nmea_len: u16,
    #[br(parse_with = counted, args(nmea_len as usize))]
    pub nmea: Vec<u8>,
}
record!(NmeaStrings, GROUP_START, 112);

impl NmeaStrings {
    /// The individual sentences, without line endings
    pub fn sentences(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.nmea)
            .split(['\r', '\n'])
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::pos::Group;
    use crate::Error;

    fn at(time1: f64) -> TimeDistance {
        TimeDistance {
            time1,
            time2: time1 - 3600.0,
            distance_tag: 12.0,
            time_types: 0x11,
            distance_types: 1,
        }
    }

    #[test]
    fn vessel_navigation_layout() {
        let g = Group::VesselNavigation(VesselNavigation {
            time: at(345_600.25),
            latitude: -33.8,
            longitude: 151.2,
            roll: 1.5,
            pitch: -0.5,
            heading: 270.0,
            alignment_status: 3,
            ..Default::default()
        });
        let bytes = g.encode().unwrap();
        // 135 bytes of content and one pad byte
        assert_eq!(bytes.len(), 140);
        assert_eq!(u16::from_le_bytes([bytes[6], bytes[7]]), 132);
        assert_eq!(Group::decode(&bytes).unwrap(), g);
    }

    #[test]
    fn status_groups_round_trip() {
        let status = Group::Status(GeneralStatus {
            time: at(10.0),
            status_a: 0xdead_beef,
            fdir_level5: 7,
            ..Default::default()
        });
        let bytes = status.encode().unwrap();
        assert_eq!(bytes.len(), 68);
        assert_eq!(Group::decode(&bytes).unwrap(), status);

        let heave = Group::TrueHeave(TrueHeave {
            time: at(400.0),
            true_heave: 0.25,
            heave_time1: 220.0,
            rejected_imu: 2,
            ..Default::default()
        });
        let bytes = heave.encode().unwrap();
        assert_eq!(bytes.len(), 84);
        assert_eq!(Group::decode(&bytes).unwrap(), heave);
    }

    #[test]
    fn variable_groups_round_trip() {
        let imu = Group::Imu(ImuData {
            time: at(1.0),
            imu_header: *b"$IMU01",
            data: vec![1, 2, 3, 4, 5, 6, 7],
            data_checksum: -3,
            data_status: 1,
        });
        let bytes = imu.encode().unwrap();
        assert_eq!(bytes.len() % 4, 0);
        assert_eq!(Group::decode(&bytes).unwrap(), imu);

        let gnss = Group::GnssStatus(GnssStatus {
            time: at(2.0),
            content: vec![9; 10],
        });
        assert_eq!(Group::decode(&gnss.encode().unwrap()).unwrap(), gnss);
    }

    #[test]
    fn calibration_group_is_decoded() {
        let g = Group::Calibration(CalibratedInstallation {
            time: at(3.0),
            content: (0..34).collect(),
        });
        let bytes = g.encode().unwrap();
        assert_eq!(bytes.len(), 72);
        assert_eq!(&bytes[..6], b"$GRP\x0e\x00");
        assert_eq!(g.name(), "Calibrated installation parameters");
        assert_eq!(Group::decode(&bytes).unwrap(), g);
    }

    #[test]
    fn nmea_sentences() {
        let g = NmeaStrings {
            time: at(5.0),
            nmea: b"$INGGA,1*00\r\n$INHDT,2*00\r\n".to_vec(),
        };
        assert_eq!(g.sentences(), vec!["$INGGA,1*00", "$INHDT,2*00"]);
        let g = Group::Nmea(g);
        assert_eq!(Group::decode(&g.encode().unwrap()).unwrap(), g);
    }

    #[test]
    fn nmea_count_beyond_record_is_truncated() {
        let g = Group::Nmea(NmeaStrings {
            time: at(5.0),
            nmea: b"$INGGA".to_vec(),
        });
        let mut bytes = g.encode().unwrap();
        // claim 200 bytes of sentences
        bytes[34..36].copy_from_slice(&200u16.to_le_bytes());
        assert!(matches!(
            Group::decode(&bytes),
            Err(Error::TruncatedPayload {
                offset: 36,
                declared: 200,
                ..
            })
        ));
    }
}
