//! Resolving the absolute start of the GPS week of a navigation file
use crate::clock;
use std::fmt;
use std::path::Path;
use time::Date;

/// Where a [`TimeOrigin`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginSource {
    /// An 8-digit `YYYYMMDD` token in the file name
    Filename,
    /// The date of a general data message inside the file
    Record,
    /// Nothing was found; timestamps are seconds of week after the unix epoch
    Default,
}

/// The unix time that GPS seconds of week in one file are counted from
///
/// Resolved once when the file is opened. Files are named by the logger
/// after the day recording started (`20170403_0138.000`), so the file name
/// is tried first; the calendar date of message 56 is the fallback because
/// that message is logged rarely and is often missing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeOrigin {
    /// Unix seconds of the start of the GPS week
    pub seconds: f64,
    /// How the origin was found
    pub source: OriginSource,
}

impl TimeOrigin {
    /// The origin of the GPS week containing `date`
    pub fn from_date(date: Date, source: OriginSource) -> Self {
        TimeOrigin {
            seconds: clock::gps_week_origin(date),
            source,
        }
    }

    /// The origin named by the first valid `YYYYMMDD` digit run in the file
    /// stem, if any
    pub fn from_filename(path: &Path) -> Option<Self> {
        let stem = path.file_stem()?.to_string_lossy();
        stem.split(|c: char| !c.is_ascii_digit())
            .filter(|run| run.len() == 8)
            .filter_map(|run| run.parse::<u32>().ok())
            .find_map(clock::calendar_date)
            .map(|date| TimeOrigin::from_date(date, OriginSource::Filename))
    }

    /// The fallback origin: the unix epoch itself
    pub fn uncalibrated() -> Self {
        TimeOrigin {
            seconds: 0.0,
            source: OriginSource::Default,
        }
    }

    /// Whether timestamps built on this origin are absolute
    pub fn is_calibrated(&self) -> bool {
        self.source != OriginSource::Default
    }
}

impl Default for TimeOrigin {
    fn default() -> Self {
        TimeOrigin::uncalibrated()
    }
}

impl fmt::Display for TimeOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.source {
            OriginSource::Default => write!(f, "uncalibrated"),
            OriginSource::Filename => write!(f, "{} (file name)", clock::format_unix(self.seconds)),
            OriginSource::Record => write!(f, "{} (message 56)", clock::format_unix(self.seconds)),
        }
    }
}
