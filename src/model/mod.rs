//! The injection data model
//!
//! Injection sources are loaded into [`InjectionRecord`]s: a unix timestamp
//! and one sample of attitude, height or position. The conditioner turns
//! them into sonar datagrams when they fall due.
use serde::{Deserialize, Serialize};

/// One attitude sample
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[derive(Deserialize, Serialize)]
pub struct AttitudeSample {
    /// Roll in degrees, positive port up
    pub roll: f64,
    /// Pitch in degrees, positive bow up
    pub pitch: f64,
    /// Heave in metres, positive up
    pub heave: f64,
    /// Heading in degrees
    pub heading: f64,
}

/// One position fix
#[derive(Debug, Clone, PartialEq, Default)]
#[derive(Deserialize, Serialize)]
pub struct PositionFix {
    /// Position datagram counter
    pub counter: u16,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Fix quality in metres
    pub quality: f64,
    /// Speed over ground in m/s
    pub speed: f64,
    /// Course over ground in degrees
    pub course: f64,
    /// Heading in degrees
    pub heading: f64,
    /// Position system descriptor
    pub descriptor: u8,
    /// The input datagram the fix came from, usually an NMEA sentence
    pub input: String,
}

/// The sample carried by an [`InjectionRecord`]
#[derive(Debug, Clone, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum InjectionPayload {
    /// Attitude, injected as `A` datagrams
    Attitude(AttitudeSample),
    /// Height in metres, injected as `h` datagrams
    Height(f64),
    /// Position, injected as `P` datagrams
    Position(PositionFix),
}

/// Which queue a record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InjectionKind {
    /// Attitude samples
    Attitude,
    /// Height samples
    Height,
    /// Position fixes
    Position,
}

/// A timestamped sample waiting to be injected
#[derive(Debug, Clone, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct InjectionRecord {
    /// Unix seconds
    pub timestamp: f64,
    /// The sample
    pub payload: InjectionPayload,
}

impl InjectionRecord {
    /// An attitude record
    pub fn attitude(timestamp: f64, sample: AttitudeSample) -> Self {
        InjectionRecord {
            timestamp,
            payload: InjectionPayload::Attitude(sample),
        }
    }

    /// A height record
    pub fn height(timestamp: f64, height: f64) -> Self {
        InjectionRecord {
            timestamp,
            payload: InjectionPayload::Height(height),
        }
    }

    /// A position record
    pub fn position(timestamp: f64, fix: PositionFix) -> Self {
        InjectionRecord {
            timestamp,
            payload: InjectionPayload::Position(fix),
        }
    }

    /// The queue the record belongs to
    pub fn kind(&self) -> InjectionKind {
        match self.payload {
            InjectionPayload::Attitude(_) => InjectionKind::Attitude,
            InjectionPayload::Height(_) => InjectionKind::Height,
            InjectionPayload::Position(_) => InjectionKind::Position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(InjectionRecord::height(1.0, 2.0).kind(), InjectionKind::Height);
        let a = InjectionRecord::attitude(1.0, AttitudeSample::default());
        assert_eq!(a.kind(), InjectionKind::Attitude);
    }

    #[test]
    fn records_serialize() {
        let r = InjectionRecord::attitude(
            1_432_833_960.5,
            AttitudeSample {
                roll: 1.5,
                pitch: -0.25,
                heave: 0.125,
                heading: 90.0,
            },
        );
        let text = toml::to_string(&r).unwrap();
        let back: InjectionRecord = toml::from_str(&text).unwrap();
        assert_eq!(back, r);
    }
}
