//! Rewriting one sonar file with injected, excluded and split output
use super::queue::{InjectionPolicy, InjectionQueue};
use super::sources::apply_heave;
use super::split::{split_path, SplitPolicy, SplitReason};
use crate::model::{InjectionKind, InjectionPayload, InjectionRecord};
use crate::parser::all::{Attitude, AttitudeEntry, Datagram, DatagramHeader, Height, Position, Sonar, Stamp};
use crate::reader::{RecordHandle, Reader};
use crate::timeseries::TimeSeries;
use crate::{Error, Result};
use binrw::io::{Read, Seek};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Serial number of injected datagrams when the file has no installation
/// record
pub const DEFAULT_SERIAL: u16 = 999;

/// Sensor system descriptor of injected attitude datagrams
pub const ATTITUDE_DESCRIPTOR: u8 = 30;

/// Split time-ordered attitude records into runs that each fit one attitude
/// datagram
///
/// Entry offsets are whole milliseconds from the first record of the run in
/// a `u16`, and so is the entry count.
fn attitude_batches(records: &[InjectionRecord]) -> Vec<&[InjectionRecord]> {
    let limit = f64::from(u16::MAX);
    let mut batches = Vec::new();
    let mut start = 0;
    for (i, r) in records.iter().enumerate() {
        let span = ((r.timestamp - records[start].timestamp) * 1000.0).round();
        if span > limit || i - start == usize::from(u16::MAX) {
            batches.push(&records[start..i]);
            start = i;
        }
    }
    if start < records.len() {
        batches.push(&records[start..]);
    }
    batches
}

/// What a header scan of the input learns before the copy starts
#[derive(Debug, Default)]
struct Survey {
    first_timestamp: Option<f64>,
    model: u16,
    serial: Option<u16>,
    start_marker: Option<Vec<u8>>,
    stop_marker: Option<Vec<u8>>,
    depth_mode: Option<u8>,
    frequency: Option<f32>,
}

/// The values the split triggers compare against
#[derive(Debug, Default)]
struct Baseline {
    depth_mode: Option<u8>,
    frequency: Option<f32>,
    since: Option<f64>,
}

#[derive(Debug, Default)]
struct Tally {
    copied: usize,
    injected: usize,
    excluded: usize,
}

struct Output {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl Output {
    fn create(path: &Path) -> Result<Self> {
        log::info!("writing {}", path.display());
        Ok(Output {
            path: path.to_path_buf(),
            writer: BufWriter::new(File::create(path)?),
        })
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes)?;
        Ok(())
    }

    fn close(mut self) -> Result<()> {
        self.writer.flush()?;
        log::info!("closed {}", self.path.display());
        Ok(())
    }
}

/// A conditioning session over one input file
///
/// Each record of the input passes through the same steps: the split
/// triggers look at it, injection records that have fallen due are written,
/// and then the record itself is copied unless its type is excluded. A
/// split closes the current output before the triggering record, so every
/// file begins with its own installation record.
#[derive(Debug)]
pub struct StreamConditioner {
    exclude: BTreeSet<u8>,
    split: SplitPolicy,
    policy: InjectionPolicy,
    attitude: InjectionQueue,
    heights: InjectionQueue,
    positions: InjectionQueue,
    true_heave: Option<TimeSeries>,
    counter: u16,
    last_height: f64,
    outputs: Vec<PathBuf>,
}

impl StreamConditioner {
    /// A session that drops datagrams whose tag is in `exclude`
    pub fn new(exclude: &str, split: SplitPolicy, policy: InjectionPolicy) -> Self {
        StreamConditioner {
            exclude: exclude.bytes().collect(),
            split,
            policy,
            attitude: InjectionQueue::default(),
            heights: InjectionQueue::default(),
            positions: InjectionQueue::default(),
            true_heave: None,
            counter: 0,
            last_height: f64::NEG_INFINITY,
            outputs: Vec::new(),
        }
    }

    /// Queue records for injection
    pub fn add_records(&mut self, records: Vec<InjectionRecord>) {
        let (mut attitude, mut heights, mut positions) = (Vec::new(), Vec::new(), Vec::new());
        for r in records {
            match r.kind() {
                InjectionKind::Attitude => attitude.push(r),
                InjectionKind::Height => heights.push(r),
                InjectionKind::Position => positions.push(r),
            }
        }
        self.attitude.extend(attitude);
        self.heights.extend(heights);
        self.positions.extend(positions);
    }

    /// Replace the heave of the input's own attitude datagrams
    pub fn set_true_heave(&mut self, heave: TimeSeries) {
        self.true_heave = Some(heave);
    }

    /// Number of records still waiting to be injected
    pub fn pending(&self) -> usize {
        self.attitude.len() + self.heights.len() + self.positions.len()
    }

    /// Every output file written so far, in order
    pub fn outputs(&self) -> &[PathBuf] {
        &self.outputs
    }

    /// Condition the whole of `reader` into `output` and any split files
    /// next to it
    ///
    /// The first output is `output` itself. Returns every file written.
    ///
    /// # Errors
    ///
    /// Stops at the first read or write error. Outputs written so far are
    /// closed and kept; after [`Error::TruncatedPayload`] the bytes of the
    /// abandoned datagram are copied to the current output first.
    pub fn run<T: Read + Seek>(&mut self, reader: &mut Reader<Sonar, T>, output: &Path) -> Result<Vec<PathBuf>> {
        let survey = survey(reader)?;
        if let Some(t0) = survey.first_timestamp {
            let trimmed = self.attitude.trim(t0, self.policy.trim_epsilon)
                + self.heights.trim(t0, self.policy.trim_epsilon)
                + self.positions.trim(t0, self.policy.trim_epsilon);
            log::info!("trimmed {} injection records before the first datagram", trimmed);
        }
        if self.split.is_enabled() && survey.start_marker.is_none() {
            log::warn!("no installation record, split files will not start with one");
        }

        let mut baseline = Baseline {
            depth_mode: survey.depth_mode,
            frequency: survey.frequency,
            since: survey.first_timestamp,
        };
        let mut out = Output::create(output)?;
        self.outputs = vec![output.to_path_buf()];

        let mut tally = Tally::default();
        let result = self.copy(reader, &survey, &mut baseline, output, &mut out, &mut tally);
        let closed = out.close();
        log::info!(
            "{} datagrams copied, {} injected, {} excluded, {} files",
            tally.copied,
            tally.injected,
            tally.excluded,
            self.outputs.len()
        );
        result.and(closed)?;
        Ok(self.outputs.clone())
    }

    fn copy<T: Read + Seek>(
        &mut self,
        reader: &mut Reader<Sonar, T>,
        survey: &Survey,
        baseline: &mut Baseline,
        base: &Path,
        out: &mut Output,
        tally: &mut Tally,
    ) -> Result<()> {
        loop {
            let handle = match reader.read_next() {
                Ok(Some(handle)) => handle,
                Ok(None) => return Ok(()),
                Err(e @ Error::TruncatedPayload { .. }) => {
                    let tail = reader.tail()?;
                    log::warn!("copying {} bytes of a truncated datagram", tail.len());
                    out.write(&tail)?;
                    return Err(e);
                }
                Err(e) => return Err(e),
            };
            let tag = handle.header.datagram_type;
            let now = handle.timestamp;

            if let Some(reason) = self.split_trigger(reader, &handle, baseline) {
                self.rotate(out, base, survey, reason)?;
            }

            for datagram in self.due(now, survey) {
                out.write(&datagram.encode()?)?;
                tally.injected += 1;
            }

            if self.exclude.contains(&tag) {
                tally.excluded += 1;
                continue;
            }
            let bytes = self.original(reader, &handle)?;
            out.write(&bytes)?;
            tally.copied += 1;
        }
    }

    fn split_trigger<T: Read + Seek>(
        &self,
        reader: &mut Reader<Sonar, T>,
        handle: &RecordHandle<DatagramHeader>,
        baseline: &mut Baseline,
    ) -> Option<SplitReason> {
        let mut reason = match handle.header.datagram_type {
            b'R' if self.split.depth_mode => match reader.decode(handle) {
                Ok(Datagram::Runtime(r)) => {
                    let mode = r.depth_mode();
                    let previous = baseline.depth_mode.replace(mode);
                    match previous {
                        Some(m) if m != mode => Some(SplitReason::DepthMode(r.depth_mode_name().to_string())),
                        _ => None,
                    }
                }
                Ok(_) => None,
                Err(e) => {
                    log::warn!("cannot read ping mode: {}", e);
                    None
                }
            },
            b'N' if self.split.frequency => match reader.decode(handle) {
                Ok(Datagram::RangeAngle(n)) => n.centre_frequency().and_then(|hz| {
                    match baseline.frequency.replace(hz) {
                        Some(f) if f != hz => Some(SplitReason::Frequency(hz)),
                        _ => None,
                    }
                }),
                Ok(_) => None,
                Err(e) => {
                    log::warn!("cannot read centre frequency: {}", e);
                    None
                }
            },
            _ => None,
        };

        let now = handle.timestamp;
        if reason.is_none() {
            if let (Some(interval), Some(since)) = (self.split.interval_seconds, baseline.since) {
                if now > since + interval {
                    reason = Some(SplitReason::Interval);
                }
            }
        }
        if reason.is_some() || baseline.since.is_none() {
            baseline.since = Some(now);
        }
        reason
    }

    fn rotate(&mut self, out: &mut Output, base: &Path, survey: &Survey, reason: SplitReason) -> Result<()> {
        if let Some(stop) = &survey.stop_marker {
            out.write(stop)?;
        }
        let path = split_path(base, reason.label().as_deref());
        log::info!("splitting on {:?}", reason);
        let next = Output::create(&path)?;
        std::mem::replace(out, next).close()?;
        self.outputs.push(path);
        if let Some(start) = &survey.start_marker {
            out.write(start)?;
        }
        Ok(())
    }

    /// Datagrams for every injection record due at `now`, in time order
    fn due(&mut self, now: f64, survey: &Survey) -> Vec<Datagram> {
        let serial = survey.serial.unwrap_or(DEFAULT_SERIAL);
        let mut due: Vec<(f64, Datagram)> = Vec::new();

        let attitude = self.attitude.inject_due(now, self.policy.max_lookahead);
        for batch in attitude_batches(&attitude) {
            let t0 = batch[0].timestamp;
            let entries = batch
                .iter()
                .filter_map(|r| match &r.payload {
                    InjectionPayload::Attitude(a) => {
                        let offset = ((r.timestamp - t0) * 1000.0).round() as u16;
                        Some(AttitudeEntry::new(offset, a.roll, a.pitch, a.heave, a.heading))
                    }
                    _ => None,
                })
                .collect();
            if let Some(stamp) = injection_stamp(survey.model, t0) {
                let counter = self.next_counter();
                due.push((
                    t0,
                    Datagram::Attitude(Attitude {
                        stamp,
                        counter,
                        serial,
                        entries,
                        system_descriptor: ATTITUDE_DESCRIPTOR,
                    }),
                ));
            }
        }

        for r in self.heights.inject_due(now, self.policy.max_lookahead) {
            let InjectionPayload::Height(height) = r.payload else {
                continue;
            };
            if r.timestamp - self.last_height <= self.policy.height_interval {
                continue;
            }
            if let Some(stamp) = injection_stamp(survey.model, r.timestamp) {
                self.last_height = r.timestamp;
                let counter = self.next_counter();
                due.push((
                    r.timestamp,
                    Datagram::Height(Height {
                        stamp,
                        counter,
                        serial,
                        height: (height * 100.0).round() as i32,
                        height_type: 0,
                    }),
                ));
            }
        }

        for r in self.positions.inject_due(now, self.policy.max_lookahead) {
            let InjectionPayload::Position(fix) = r.payload else {
                continue;
            };
            let Some(stamp) = injection_stamp(survey.model, r.timestamp) else {
                continue;
            };
            let mut input = fix.input.into_bytes();
            if input.len() > usize::from(u8::MAX) {
                log::warn!("position input of {} bytes cut to {}", input.len(), u8::MAX);
                input.truncate(usize::from(u8::MAX));
            }
            due.push((
                r.timestamp,
                Datagram::Position(Position::new(
                    stamp,
                    fix.counter,
                    serial,
                    fix.latitude,
                    fix.longitude,
                    fix.quality,
                    fix.speed,
                    fix.course,
                    fix.heading,
                    fix.descriptor,
                    input,
                )),
            ));
        }

        due.sort_by(|a, b| a.0.total_cmp(&b.0));
        due.into_iter().map(|(_, d)| d).collect()
    }

    fn next_counter(&mut self) -> u16 {
        let counter = self.counter;
        self.counter = self.counter.wrapping_add(1);
        counter
    }

    /// The bytes to write for an input datagram
    ///
    /// Verbatim, except attitude when true heave replaces its heave.
    fn original<T: Read + Seek>(
        &self,
        reader: &mut Reader<Sonar, T>,
        handle: &RecordHandle<DatagramHeader>,
    ) -> Result<Vec<u8>> {
        let bytes = reader.raw_bytes(handle)?;
        let Some(heave) = &self.true_heave else {
            return Ok(bytes);
        };
        if handle.header.datagram_type != b'A' {
            return Ok(bytes);
        }
        match Datagram::decode(&bytes) {
            Ok(Datagram::Attitude(mut a)) => {
                if apply_heave(&mut a, heave) {
                    Datagram::Attitude(a).encode()
                } else {
                    Ok(bytes)
                }
            }
            Ok(_) => Ok(bytes),
            Err(e) => {
                log::warn!("copying unreadable attitude at {} unchanged: {}", handle.offset, e);
                Ok(bytes)
            }
        }
    }
}

fn injection_stamp(model: u16, timestamp: f64) -> Option<Stamp> {
    let stamp = Stamp::at(model, timestamp);
    if stamp.is_none() {
        log::warn!("cannot inject a record at {}", timestamp);
    }
    stamp
}

/// Scan the headers of the whole file and rewind
fn survey<T: Read + Seek>(reader: &mut Reader<Sonar, T>) -> Result<Survey> {
    reader.rewind()?;
    let mut s = Survey::default();
    loop {
        let handle = match reader.read_next() {
            Ok(Some(handle)) => handle,
            Ok(None) => break,
            Err(e) => {
                log::debug!("header scan stopped early: {}", e);
                break;
            }
        };
        if s.first_timestamp.is_none() {
            s.first_timestamp = Some(handle.timestamp);
            s.model = handle.header.model;
        }
        match handle.header.datagram_type {
            b'I' if s.start_marker.is_none() => {
                let bytes = reader.raw_bytes(&handle)?;
                if let Ok(Datagram::InstallationStart(i)) = Datagram::decode(&bytes) {
                    s.serial = Some(i.serial);
                }
                s.start_marker = Some(bytes);
            }
            b'i' if s.stop_marker.is_none() => {
                s.stop_marker = Some(reader.raw_bytes(&handle)?);
            }
            b'R' if s.depth_mode.is_none() => {
                if let Ok(Datagram::Runtime(r)) = reader.decode(&handle) {
                    s.depth_mode = Some(r.depth_mode());
                }
            }
            b'N' if s.frequency.is_none() => {
                if let Ok(Datagram::RangeAngle(n)) = reader.decode(&handle) {
                    s.frequency = n.centre_frequency();
                }
            }
            _ => {}
        }
    }

    if s.stop_marker.is_none() {
        // Close split files with the opening parameters re-tagged
        s.stop_marker = match s.start_marker.as_deref().map(Datagram::decode) {
            Some(Ok(Datagram::InstallationStart(i))) => Datagram::InstallationStop(i).encode().ok(),
            _ => None,
        };
    }
    reader.rewind()?;
    Ok(s)
}
