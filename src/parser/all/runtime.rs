//! Runtime, clock and sound speed profile datagrams
use super::{body, counted, Padding, Stamp};
use binrw::binrw;

/// Runtime parameters (`R`)
///
/// Written whenever the operator changes a sonar setting, so consecutive
/// runtime datagrams mark changes in survey mode.
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Runtime {
    #[brw(ignore)]
    pub stamp: Stamp,
    pub counter: u16,
    pub serial: u16,
    /// Operator station status
    pub operator_station_status: u8,
    /// Processing unit status
    pub processing_unit_status: u8,
    /// BSP status
    pub bsp_status: u8,
    /// Sonar head or transceiver status
    pub sonar_head_status: u8,
    /// Ping mode in the low nibble, TX pulse form and dual swath mode above
    pub mode: u8,
    pub filter_identifier: u8,
    /// Minimum depth in metres
    pub minimum_depth: u16,
    /// Maximum depth in metres
    pub maximum_depth: u16,
    /// Absorption coefficient in 0.01 dB/km
    pub absorption_coefficient: u16,
    /// Transmit pulse length in microseconds
    pub transmit_pulse_length: u16,
    /// Transmit beamwidth in 0.1 degrees
    pub transmit_beamwidth: u16,
    /// Transmit power re maximum in dB
    pub transmit_power: i8,
    /// Receive beamwidth in 0.1 degrees
    pub receive_beamwidth: u8,
    /// Receive bandwidth in 50 Hz
    pub receive_bandwidth: u8,
    /// Mode 2 or receiver fixed gain setting
    pub mode2: u8,
    /// TVG law crossover angle in degrees
    pub tvg_crossover: u8,
    /// Source of sound speed at the transducer
    pub sound_speed_source: u8,
    /// Maximum port swath width in metres
    pub maximum_port_width: u16,
    /// Beam spacing
    pub beam_spacing: u8,
    /// Maximum port coverage in degrees
    pub maximum_port_coverage: u8,
    /// Yaw and pitch stabilisation mode
    pub stabilisation: u8,
    /// Maximum starboard coverage in degrees
    pub maximum_starboard_coverage: u8,
    /// Maximum starboard swath width in metres
    pub maximum_starboard_width: u16,
    /// Transmit along-track tilt in 0.1 degrees
    pub transmit_along_tilt: i16,
    pub filter_identifier2: u8,
}
body!(Runtime, Padding::Never);

impl Runtime {
    /// The ping (depth) mode from the low nibble of the mode field
    pub fn depth_mode(&self) -> u8 {
        self.mode & 0x0f
    }

    /// A readable name for the depth mode, as shown by the acquisition
    /// software of most current EM models
    pub fn depth_mode_name(&self) -> &'static str {
        match self.depth_mode() {
            0 => "VeryShallow",
            1 => "Shallow",
            2 => "Medium",
            3 => "Deep",
            4 => "VeryDeep",
            5 => "ExtraDeep",
            6 => "ExtraDeep2",
            7 => "ExtraDeep3",
            _ => "Unknown",
        }
    }
}

/// Clock (`C`)
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Clock {
    #[brw(ignore)]
    pub stamp: Stamp,
    pub counter: u16,
    pub serial: u16,
    /// Date from the external clock as `YYYYMMDD`
    pub external_date: u32,
    /// Time from the external clock in milliseconds since midnight
    pub external_time: u32,
    /// 1 if the PPS signal is in use
    pub pps: u8,
}
body!(Clock, Padding::Never);

/// Sound speed profile (`U`)
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SoundSpeedProfile {
    #[brw(ignore)]
    pub stamp: Stamp,
    pub counter: u16,
    pub serial: u16,
    /// Date the profile was made as `YYYYMMDD`
    pub profile_date: u32,
    /// Time the profile was made in seconds since midnight
    pub profile_time: u32,
    #[br(temp)]
    #[bw(try_calc = u16::try_from(entries.len()))]
    entry_count: u16,
    /// Depth resolution in cm
    pub depth_resolution: u16,
    #[br(parse_with = counted, args(entry_count as usize))]
    pub entries: Vec<SoundSpeedEntry>,
}
body!(SoundSpeedProfile, Padding::Always);

/// One point of a [`SoundSpeedProfile`]
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SoundSpeedEntry {
    /// Depth in units of the profile's depth resolution
    pub depth: u32,
    /// Sound speed in 0.1 m/s
    pub sound_speed: u32,
}

impl SoundSpeedProfile {
    /// The profile as (depth in metres, sound speed in m/s) pairs
    pub fn points(&self) -> Vec<(f64, f64)> {
        let scale = f64::from(self.depth_resolution) / 100.0;
        self.entries
            .iter()
            .map(|e| (f64::from(e.depth) * scale, f64::from(e.sound_speed) / 10.0))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::all::Datagram;

    #[test]
    fn runtime_is_fixed_length() {
        let r = Runtime {
            mode: 0x23,
            ..Default::default()
        };
        assert_eq!(r.depth_mode(), 3);
        assert_eq!(r.depth_mode_name(), "Deep");
        let bytes = Datagram::Runtime(r.clone()).encode().unwrap();
        assert_eq!(bytes.len(), 56);
        assert_eq!(Datagram::decode(&bytes).unwrap(), Datagram::Runtime(r));
    }

    #[test]
    fn profile_points() {
        let u = SoundSpeedProfile {
            depth_resolution: 10,
            entries: vec![
                SoundSpeedEntry {
                    depth: 0,
                    sound_speed: 15000,
                },
                SoundSpeedEntry {
                    depth: 25,
                    sound_speed: 14950,
                },
            ],
            ..Default::default()
        };
        assert_eq!(u.points(), vec![(0.0, 1500.0), (2.5, 1495.0)]);
        let bytes = Datagram::SoundSpeedProfile(u.clone()).encode().unwrap();
        assert_eq!(bytes.len(), 32 + 16 + 1 + 3);
        assert_eq!(Datagram::decode(&bytes).unwrap(), Datagram::SoundSpeedProfile(u));
    }
}
