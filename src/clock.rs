//! Conversions between instrument clocks and unix time
//!
//! Sonar datagrams stamp records with a calendar date (`YYYYMMDD`) and
//! milliseconds since midnight. Navigation groups carry GPS seconds of the
//! week, which become absolute once the start of the week is known.
use time::format_description::well_known::Rfc3339;
use time::{Date, Duration, Month, OffsetDateTime};

const DAY_MS: i64 = 86_400_000;

/// The GPS epoch, 1980-01-06T00:00:00Z, in unix seconds
pub const GPS_EPOCH: i64 = 315_964_800;

/// Seconds in one GPS week
pub const WEEK_SECONDS: i64 = 604_800;

/// Interpret a `YYYYMMDD` integer as a calendar date
pub fn calendar_date(yyyymmdd: u32) -> Option<Date> {
    let year = i32::try_from(yyyymmdd / 10_000).ok()?;
    let month = Month::try_from(((yyyymmdd / 100) % 100) as u8).ok()?;
    let day = (yyyymmdd % 100) as u8;
    Date::from_calendar_date(year, month, day).ok()
}

/// Unix seconds of a sonar datagram date and time of day
///
/// Returns `None` if `date` is not a valid calendar date.
pub fn datagram_to_unix(date: u32, time_ms: u32) -> Option<f64> {
    let midnight = calendar_date(date)?.midnight().assume_utc().unix_timestamp();
    Some(midnight as f64 + f64::from(time_ms) / 1000.0)
}

/// Split unix seconds into a sonar datagram date and time of day
///
/// Time is rounded to the nearest millisecond. Returns `None` for
/// timestamps outside the range of the `YYYYMMDD` representation.
pub fn unix_to_datagram(timestamp: f64) -> Option<(u32, u32)> {
    if !timestamp.is_finite() || !(0.0..=253_402_300_799.0).contains(&timestamp) {
        return None;
    }
    let total_ms = (timestamp * 1000.0).round() as i64;
    let days = total_ms.div_euclid(DAY_MS);
    let ms = total_ms.rem_euclid(DAY_MS) as u32;
    let date = OffsetDateTime::UNIX_EPOCH
        .checked_add(Duration::days(days))?
        .date();
    let yyyymmdd =
        date.year() as u32 * 10_000 + u32::from(u8::from(date.month())) * 100 + u32::from(date.day());
    Some((yyyymmdd, ms))
}

/// Unix seconds of the start of the GPS week containing `date`
pub fn gps_week_origin(date: Date) -> f64 {
    let seconds = date.midnight().assume_utc().unix_timestamp();
    let week = (seconds - GPS_EPOCH).div_euclid(WEEK_SECONDS);
    (GPS_EPOCH + week * WEEK_SECONDS) as f64
}

/// Format unix seconds as RFC 3339, or the raw number if out of range
pub fn format_unix(timestamp: f64) -> String {
    OffsetDateTime::from_unix_timestamp_nanos((timestamp * 1e9) as i128)
        .ok()
        .and_then(|t| t.format(&Rfc3339).ok())
        .unwrap_or_else(|| format!("{:.3}", timestamp))
}
