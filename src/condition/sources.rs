//! Loaders for the external data injected into a sonar stream
//!
//! Text sources are comma separated with one header row, in the layout
//! written by the acquisition exporters:
//!
//! * attitude: `timestamp, roll, pitch, heave, heading[, height]`
//! * height: `timestamp, height`
//! * position: `timestamp, counter, latitude, longitude, quality, speed,
//!   course, heading, descriptor, length, input...` where the input runs to
//!   the end of the row and may itself contain commas
//!
//! Timestamps are unix seconds. Binary sources are Seapath `.srh` delayed
//! heave and POS MV true heave.
use crate::model::{AttitudeSample, InjectionPayload, InjectionRecord, PositionFix};
use crate::parser::all::Attitude;
use crate::parser::pos::{Group, PosReader, RecordId, TRUE_HEAVE};
use crate::parser::srh;
use crate::timeseries::TimeSeries;
use crate::{Error, Result};
use std::fs;
use std::path::Path;
use std::str::FromStr;

const POSITION_COLUMNS: usize = 11;

/// The data rows of a text source with their one-based line numbers
fn rows(path: &Path) -> Result<Vec<(usize, String)>> {
    if !path.is_file() {
        return Err(Error::InjectionSourceMissing(path.to_path_buf()));
    }
    let text = fs::read_to_string(path)?;
    let rows: Vec<(usize, String)> = text
        .lines()
        .enumerate()
        .skip(1)
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| (i + 1, line.to_string()))
        .collect();
    if rows.is_empty() {
        return Err(Error::InjectionSourceEmpty(path.to_path_buf()));
    }
    Ok(rows)
}

fn field<T: FromStr>(path: &Path, line: usize, fields: &[&str], i: usize, name: &str) -> Result<T> {
    let invalid = |reason: String| Error::InvalidInjectionRow {
        path: path.to_path_buf(),
        line,
        reason,
    };
    let raw = fields
        .get(i)
        .ok_or_else(|| invalid(format!("missing {} column", name)))?
        .trim();
    raw.parse()
        .map_err(|_| invalid(format!("{} {:?} is not a number", name, raw)))
}

fn loaded(path: &Path, records: Vec<InjectionRecord>) -> Result<Vec<InjectionRecord>> {
    log::info!("{}: {} injection records", path.display(), records.len());
    Ok(records)
}

/// Load an attitude text file as attitude records
///
/// A sixth height column, if present, is ignored; see
/// [`load_attitude_height`].
pub fn load_attitude<P: AsRef<Path>>(path: P) -> Result<Vec<InjectionRecord>> {
    let path = path.as_ref();
    let mut records = Vec::new();
    for (line, row) in rows(path)? {
        let f: Vec<&str> = row.split(',').collect();
        records.push(InjectionRecord::attitude(
            field(path, line, &f, 0, "timestamp")?,
            AttitudeSample {
                roll: field(path, line, &f, 1, "roll")?,
                pitch: field(path, line, &f, 2, "pitch")?,
                heave: field(path, line, &f, 3, "heave")?,
                heading: field(path, line, &f, 4, "heading")?,
            },
        ));
    }
    loaded(path, records)
}

/// Load an attitude text file with a height column
///
/// Every row yields an attitude record and a height record at the same
/// time. Rows without a height column get a height of zero.
pub fn load_attitude_height<P: AsRef<Path>>(path: P) -> Result<Vec<InjectionRecord>> {
    let path = path.as_ref();
    let mut records = Vec::new();
    for (line, row) in rows(path)? {
        let f: Vec<&str> = row.split(',').collect();
        let timestamp = field(path, line, &f, 0, "timestamp")?;
        let height = if f.len() > 5 {
            field(path, line, &f, 5, "height")?
        } else {
            0.0
        };
        records.push(InjectionRecord::attitude(
            timestamp,
            AttitudeSample {
                roll: field(path, line, &f, 1, "roll")?,
                pitch: field(path, line, &f, 2, "pitch")?,
                heave: field(path, line, &f, 3, "heave")?,
                heading: field(path, line, &f, 4, "heading")?,
            },
        ));
        records.push(InjectionRecord::height(timestamp, height));
    }
    loaded(path, records)
}

/// Load a height text file as a series
pub fn load_heights<P: AsRef<Path>>(path: P) -> Result<TimeSeries> {
    let path = path.as_ref();
    let mut samples = Vec::new();
    for (line, row) in rows(path)? {
        let f: Vec<&str> = row.split(',').collect();
        samples.push((
            field(path, line, &f, 0, "timestamp")?,
            field(path, line, &f, 1, "height")?,
        ));
    }
    log::info!("{}: {} height samples", path.display(), samples.len());
    Ok(TimeSeries::new(samples))
}

/// Load a position text file as position records
///
/// The length column is informational; the input datagram is whatever
/// follows it on the row.
pub fn load_positions<P: AsRef<Path>>(path: P) -> Result<Vec<InjectionRecord>> {
    let path = path.as_ref();
    let mut records = Vec::new();
    for (line, row) in rows(path)? {
        let f: Vec<&str> = row.splitn(POSITION_COLUMNS, ',').collect();
        let timestamp = field(path, line, &f, 0, "timestamp")?;
        let fix = PositionFix {
            counter: field(path, line, &f, 1, "counter")?,
            latitude: field(path, line, &f, 2, "latitude")?,
            longitude: field(path, line, &f, 3, "longitude")?,
            quality: field(path, line, &f, 4, "quality")?,
            speed: field(path, line, &f, 5, "speed")?,
            course: field(path, line, &f, 6, "course")?,
            heading: field(path, line, &f, 7, "heading")?,
            descriptor: field(path, line, &f, 8, "descriptor")?,
            input: f.get(10).map(|s| s.to_string()).unwrap_or_default(),
        };
        records.push(InjectionRecord::position(timestamp, fix));
    }
    loaded(path, records)
}

/// Load Seapath delayed heave as attitude records
///
/// Roll, pitch and heading are zero; only the heave is meaningful.
pub fn load_srh<P: AsRef<Path>>(path: P) -> Result<Vec<InjectionRecord>> {
    let path = path.as_ref();
    let packets = srh::load(path)?;
    if packets.is_empty() {
        return Err(Error::InjectionSourceEmpty(path.to_path_buf()));
    }
    let records = packets
        .iter()
        .map(|p| {
            InjectionRecord::attitude(
                p.timestamp(),
                AttitudeSample {
                    heave: p.heave(),
                    ..Default::default()
                },
            )
        })
        .collect();
    loaded(path, records)
}

/// Height records at the time of every attitude record
///
/// Heights are interpolated from `heights`; other records in `attitude`
/// are ignored.
pub fn fuse_attitude_height(attitude: &[InjectionRecord], heights: &TimeSeries) -> Vec<InjectionRecord> {
    attitude
        .iter()
        .filter(|r| matches!(r.payload, InjectionPayload::Attitude(_)))
        .filter_map(|r| Some(InjectionRecord::height(r.timestamp, heights.value_at(r.timestamp)?)))
        .collect()
}

/// Load POS MV true heave as a series of unix time and heave in metres
///
/// The sample time is the heave time tag of each true heave group, which
/// trails the group time by the filter delay.
pub fn load_true_heave<P: AsRef<Path>>(path: P) -> Result<TimeSeries> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::InjectionSourceMissing(path.to_path_buf()));
    }
    let mut reader = PosReader::open(path)?;
    let origin = reader.origin();

    let mut samples = Vec::new();
    while let Some(handle) = reader.read_next()? {
        if handle.header.record_id() != RecordId::Group(TRUE_HEAVE) {
            continue;
        }
        if let Group::TrueHeave(g) = reader.decode(&handle)? {
            samples.push((g.heave_time1 + origin.seconds, f64::from(g.true_heave)));
        }
    }
    if samples.is_empty() {
        return Err(Error::InjectionSourceEmpty(path.to_path_buf()));
    }
    log::info!("{}: {} true heave samples", path.display(), samples.len());
    Ok(TimeSeries::new(samples))
}

/// Replace the heave of every sample of `datagram` with `heave`
///
/// Samples outside the series take its nearest end value. Returns false,
/// leaving the datagram alone, if the series is empty.
pub fn apply_heave(datagram: &mut Attitude, heave: &TimeSeries) -> bool {
    if heave.is_empty() {
        return false;
    }
    let times = datagram.sample_times();
    for (entry, t) in datagram.entries.iter_mut().zip(times) {
        if let Some(h) = heave.value_at(t) {
            entry.heave = crate::parser::all::centi(h);
        }
    }
    true
}
