//! Parsing Applanix POS MV `.000` group files
//!
//! A POS MV log is a sequence of *groups* (`$GRP`, periodic navigation
//! output) and *messages* (`$MSG`, configuration echoed into the log). Both
//! start with the 4-byte marker, a numeric id and a byte count covering the
//! rest of the record. Groups continue with a time/distance block; messages
//! with a transaction number. Records end with padding to a 4-byte boundary,
//! a 16-bit checksum and `$#`.
use crate::parser::{body_error, checked_vec, min_len};
use crate::reader::{Format, RecordHandle, Reader};
use crate::{Error, Result};
use binrw::io::{BufReader, Cursor, Read, Seek, SeekFrom};
use binrw::{binrw, BinRead, BinReaderExt, BinResult, BinWrite, BinWriterExt, Endian};
use std::fmt;
use std::fs::File;
use std::path::Path;

mod groups;
mod messages;
mod origin;

pub use groups::{
    CalibratedInstallation, GeneralStatus, GnssStatus, ImuData, MvStatus, NmeaStrings, TrueHeave,
    VesselNavigation,
};
pub use messages::{GeneralData, InstallationParameters};
pub use origin::{OriginSource, TimeOrigin};

/// Marker at the start of every group
pub const GROUP_START: [u8; 4] = *b"$GRP";

/// Marker at the start of every message
pub const MESSAGE_START: [u8; 4] = *b"$MSG";

/// Marker at the end of every group and message
pub const GROUP_END: [u8; 2] = *b"$#";

/// Bytes before the byte count stops counting: marker, id and the count
pub const SYNC_LEN: u64 = 8;

/// Header width of a group, including the time/distance block
pub const GROUP_HEADER_LEN: u64 = SYNC_LEN + 26;

/// Header width of a message, including the transaction number
pub const MESSAGE_HEADER_LEN: u64 = SYNC_LEN + 2;

/// Checksum and end marker
pub const FOOTER_LEN: u64 = 4;

/// The time/distance block that opens every group
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimeDistance {
    /// First time tag, normally GPS seconds of the week
    pub time1: f64,
    /// Second time tag, normally POS seconds since power-up
    pub time2: f64,
    /// Distance tag in metres
    pub distance_tag: f64,
    /// Time types of the two tags (low and high nibble)
    pub time_types: u8,
    /// Distance type
    pub distance_types: u8,
}

/// Identifies a record kind: groups and messages have separate id spaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordId {
    /// A `$GRP` record
    Group(u16),
    /// A `$MSG` record
    Message(u16),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Group(id) => write!(f, "GRP {}", id),
            RecordId::Message(id) => write!(f, "MSG {}", id),
        }
    }
}

/// What follows the byte count
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Preamble {
    /// Groups carry a time/distance block
    Group(TimeDistance),
    /// Messages carry a transaction number and no time
    Message {
        /// Transaction number
        transaction: u16,
    },
}

/// The common header of a group or message
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupHeader {
    /// Group or message number
    pub id: u16,
    /// Bytes after the byte count field, through the end marker
    pub byte_count: u16,
    /// Time block or transaction number
    pub preamble: Preamble,
}

impl GroupHeader {
    /// Total on-disk length of the record
    pub fn total_length(&self) -> u64 {
        u64::from(self.byte_count) + SYNC_LEN
    }

    /// Whether this is a `$MSG` record
    pub fn is_message(&self) -> bool {
        matches!(self.preamble, Preamble::Message { .. })
    }

    /// The group or message id
    pub fn record_id(&self) -> RecordId {
        match self.preamble {
            Preamble::Group(_) => RecordId::Group(self.id),
            Preamble::Message { .. } => RecordId::Message(self.id),
        }
    }

    /// The time block of a group
    pub fn time(&self) -> Option<&TimeDistance> {
        match &self.preamble {
            Preamble::Group(t) => Some(t),
            Preamble::Message { .. } => None,
        }
    }

    /// Width of the header including the preamble
    pub fn header_len(&self) -> u64 {
        match self.preamble {
            Preamble::Group(_) => GROUP_HEADER_LEN,
            Preamble::Message { .. } => MESSAGE_HEADER_LEN,
        }
    }
}

/// The fixed body of one record kind
///
/// Bodies start right after the byte count, so a group body begins with its
/// [`TimeDistance`] and a message body with its transaction number.
pub(crate) trait Body {
    const START: [u8; 4];
    const ID: u16;
}

macro_rules! record {
    ($name:ty, $start:expr, $id:expr) => {
        impl $crate::parser::pos::Body for $name {
            const START: [u8; 4] = $start;
            const ID: u16 = $id;
        }
    };
}
pub(crate) use record;

/// Read `count` entries of an array that must end before the footer
pub(crate) fn counted<T, R>(reader: &mut R, endian: Endian, (count,): (usize,)) -> BinResult<Vec<T>>
where
    R: Read + Seek,
    T: Default + for<'a> BinRead<Args<'a> = ()> + for<'a> BinWrite<Args<'a> = ()>,
{
    checked_vec(reader, endian, count, FOOTER_LEN)
}

/// Read everything up to the footer, alignment padding included
pub(crate) fn to_footer<R: Read + Seek>(reader: &mut R, _endian: Endian, _: ()) -> BinResult<Vec<u8>> {
    let pos = reader.stream_position()?;
    let end = reader.seek(SeekFrom::End(0))?;
    let len = end.saturating_sub(pos).saturating_sub(FOOTER_LEN);
    reader.seek(SeekFrom::Start(pos))?;
    let mut content = vec![0; len as usize];
    reader.read_exact(&mut content)?;
    Ok(content)
}

/// Padding after `consumed` bytes that makes the record a multiple of four
/// bytes long once the footer is added
pub fn alignment_pad(consumed: u64) -> u64 {
    (4 - (consumed + FOOTER_LEN) % 4) % 4
}

fn word_sum(bytes: &[u8]) -> u16 {
    bytes.chunks(2).fold(0u16, |sum, w| {
        let word = u16::from_le_bytes([w[0], w.get(1).copied().unwrap_or(0)]);
        sum.wrapping_add(word)
    })
}

/// Whether the 16-bit words of a whole record sum to zero
///
/// POS MV chooses the checksum so that they do. Like sonar checksums this
/// is advisory and never used to reject a record.
pub fn verify_checksum(record: &[u8]) -> bool {
    record.len() % 2 == 0 && word_sum(record) == 0
}

fn read_footer(cursor: &Cursor<&[u8]>) -> Result<()> {
    let buf = *cursor.get_ref();
    let pos = cursor.position();
    let len = buf.len() as u64;
    if len < pos + FOOTER_LEN {
        return Err(Error::TruncatedPayload {
            offset: pos,
            declared: FOOTER_LEN,
            available: len.saturating_sub(pos),
        });
    }

    // The byte count fixes where the footer is; anything between the body
    // and the footer is padding.
    let footer = (len - FOOTER_LEN) as usize;
    let pad = len - FOOTER_LEN - pos;
    if pad != alignment_pad(pos) {
        log::debug!("{} pad bytes where {} were expected", pad, alignment_pad(pos));
    }
    if buf[footer + 2..] != GROUP_END {
        log::debug!("expected group end at {}, found {:?}", footer + 2, &buf[footer + 2..]);
    }
    if !verify_checksum(buf) {
        log::debug!("advisory checksum mismatch in {} byte record", len);
    }
    Ok(())
}

fn decode_body<B>(bytes: &[u8]) -> Result<B>
where
    B: Body + Default + for<'a> BinRead<Args<'a> = ()> + for<'a> BinWrite<Args<'a> = ()>,
{
    let available = (bytes.len() as u64).saturating_sub(SYNC_LEN + FOOTER_LEN);
    let needed = min_len::<B>() as u64;
    if needed > available {
        return Err(Error::TruncatedPayload {
            offset: SYNC_LEN,
            declared: needed,
            available,
        });
    }

    let mut cursor = Cursor::new(bytes);
    cursor.set_position(SYNC_LEN);
    let body: B = cursor.read_le().map_err(body_error)?;
    read_footer(&cursor)?;
    Ok(body)
}

fn encode_body<B>(name: &'static str, body: &B) -> Result<Vec<u8>>
where
    B: Body + for<'a> BinWrite<Args<'a> = ()>,
{
    let mut out = Cursor::new(Vec::new());
    out.write_le(&B::START)
        .and_then(|_| out.write_le(&B::ID))
        .and_then(|_| out.write_le(&0u16))
        .and_then(|_| out.write_le(body))
        .map_err(|e| Error::Encode {
            record: name,
            reason: e.to_string(),
        })?;

    let mut bytes = out.into_inner();
    let pad = alignment_pad(bytes.len() as u64) as usize;
    bytes.resize(bytes.len() + pad, 0);
    bytes.extend_from_slice(&[0, 0]);
    bytes.extend_from_slice(&GROUP_END);

    let byte_count = u16::try_from(bytes.len() as u64 - SYNC_LEN).map_err(|_| Error::Encode {
        record: name,
        reason: format!("{} bytes do not fit a group", bytes.len()),
    })?;
    bytes[6..8].copy_from_slice(&byte_count.to_le_bytes());

    let n = bytes.len();
    let sum = word_sum(&bytes);
    bytes[n - 4..n - 2].copy_from_slice(&0u16.wrapping_sub(sum).to_le_bytes());
    Ok(bytes)
}

/// Group id of vessel position, velocity and attitude
pub const VESSEL_NAVIGATION: u16 = 1;
/// Group id of true heave
pub const TRUE_HEAVE: u16 = 111;
/// Message id of the general data message that carries the date
pub const GENERAL_DATA: u16 = 56;

/// A decoded POS MV record
#[derive(Debug, Clone, PartialEq)]
pub enum Group {
    /// GRP 1: vessel position, velocity, attitude and dynamics
    VesselNavigation(VesselNavigation),
    /// GRP 4: time-tagged IMU data
    Imu(ImuData),
    /// GRP 10: general status and FDIR
    Status(GeneralStatus),
    /// GRP 14: calibrated installation parameters
    Calibration(CalibratedInstallation),
    /// GRP 29: GNSS receiver MarineSTAR status
    GnssStatus(GnssStatus),
    /// GRP 110: MV general status and FDIR
    MvStatus(MvStatus),
    /// GRP 111: true heave
    TrueHeave(TrueHeave),
    /// GRP 112: NMEA strings
    Nmea(NmeaStrings),
    /// MSG 20: general installation and processing parameters
    Installation(InstallationParameters),
    /// MSG 56: general data
    GeneralData(GeneralData),
    /// Any record kind without a codec, kept verbatim
    Unknown {
        /// The record kind
        id: RecordId,
        /// The whole record, marker to end marker
        bytes: Vec<u8>,
    },
}

/// The decoder for one record kind
#[derive(Clone, Copy)]
pub struct Codec {
    /// Name of the record kind
    pub name: &'static str,
    /// Decode a whole record, marker to end marker
    pub decode: fn(&[u8]) -> Result<Group>,
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec").field("name", &self.name).finish()
    }
}

fn record_id(bytes: &[u8]) -> Result<RecordId> {
    if bytes.len() < SYNC_LEN as usize {
        return Err(Error::CorruptHeader {
            offset: 0,
            reason: format!("{} bytes is shorter than a group header", bytes.len()),
        });
    }
    let id = u16::from_le_bytes([bytes[4], bytes[5]]);
    if bytes[..4] == MESSAGE_START {
        Ok(RecordId::Message(id))
    } else if bytes[..4] == GROUP_START {
        Ok(RecordId::Group(id))
    } else {
        Err(Error::CorruptHeader {
            offset: 0,
            reason: format!("expected $GRP or $MSG, found {:?}", &bytes[..4]),
        })
    }
}

fn decode_unknown(bytes: &[u8]) -> Result<Group> {
    Ok(Group::Unknown {
        id: record_id(bytes)?,
        bytes: bytes.to_vec(),
    })
}

/// Look up the codec for a record kind
///
/// Kinds without a codec get the pass-through codec.
pub fn codec(id: RecordId) -> Codec {
    let name = group_name(id);
    match id {
        RecordId::Group(1) => Codec {
            name,
            decode: |b| decode_body(b).map(Group::VesselNavigation),
        },
        RecordId::Group(4) => Codec {
            name,
            decode: |b| decode_body(b).map(Group::Imu),
        },
        RecordId::Group(10) => Codec {
            name,
            decode: |b| decode_body(b).map(Group::Status),
        },
        RecordId::Group(14) => Codec {
            name,
            decode: |b| decode_body(b).map(Group::Calibration),
        },
        RecordId::Group(29) => Codec {
            name,
            decode: |b| decode_body(b).map(Group::GnssStatus),
        },
        RecordId::Group(110) => Codec {
            name,
            decode: |b| decode_body(b).map(Group::MvStatus),
        },
        RecordId::Group(111) => Codec {
            name,
            decode: |b| decode_body(b).map(Group::TrueHeave),
        },
        RecordId::Group(112) => Codec {
            name,
            decode: |b| decode_body(b).map(Group::Nmea),
        },
        RecordId::Message(20) => Codec {
            name,
            decode: |b| decode_body(b).map(Group::Installation),
        },
        RecordId::Message(56) => Codec {
            name,
            decode: |b| decode_body(b).map(Group::GeneralData),
        },
        _ => Codec {
            name,
            decode: decode_unknown,
        },
    }
}

/// Readable name of a record kind, including kinds without a codec
pub fn group_name(id: RecordId) -> &'static str {
    match id {
        RecordId::Group(1) => "Vessel position, velocity, attitude & dynamics",
        RecordId::Group(2) => "Vessel navigation performance metrics",
        RecordId::Group(3) => "Primary GNSS status",
        RecordId::Group(4) => "Time-tagged IMU data",
        RecordId::Group(9) => "GAMS solution",
        RecordId::Group(10) => "General status & FDIR",
        RecordId::Group(14) => "Calibrated installation parameters",
        RecordId::Group(20) => "IIN solution status",
        RecordId::Group(21) => "Base GNSS 1 modem status",
        RecordId::Group(24) => "Auxiliary GNSS status",
        RecordId::Group(29) => "GNSS receiver MarineSTAR status",
        RecordId::Group(99) => "Versions & statistics",
        RecordId::Group(102) => "Sensor 1 position, velocity, attitude & dynamics",
        RecordId::Group(110) => "MV general status & FDIR",
        RecordId::Group(111) => "True heave",
        RecordId::Group(112) => "NMEA strings",
        RecordId::Group(113) => "True heave performance metrics",
        RecordId::Group(114) => "TrueZ & TrueTide",
        RecordId::Group(10001) => "Primary GNSS data stream",
        RecordId::Message(20) => "General installation & processing parameters",
        RecordId::Message(32) => "Set POS IP address",
        RecordId::Message(33) => "Event discrete setup",
        RecordId::Message(34) => "COM port setup",
        RecordId::Message(35) => "NMEA output setup",
        RecordId::Message(36) => "Binary output setup",
        RecordId::Message(37) => "Base GNSS 1 setup",
        RecordId::Message(38) => "Base GNSS 2 setup",
        RecordId::Message(39) => "Auxiliary GNSS setup",
        RecordId::Message(41) => "Primary GNSS integrated DGNSS source control",
        RecordId::Message(50) => "Navigation mode control",
        RecordId::Message(51) => "Display port control",
        RecordId::Message(52) => "Real-time data port control",
        RecordId::Message(53) => "Logging port control",
        RecordId::Message(56) => "General data",
        RecordId::Message(61) => "Logging data port control",
        RecordId::Message(91) => "GNSS control",
        RecordId::Message(106) => "Heave filter setup",
        RecordId::Message(120) => "Sensor parameter setup",
        RecordId::Message(135) => "NMEA output setup",
        RecordId::Message(136) => "Binary output setup",
        RecordId::Message(20102) => "Binary output diagnostics",
        _ => "Unknown",
    }
}

impl Group {
    /// Decode a whole record, marker to end marker
    ///
    /// Offsets in errors are relative to the start of `bytes`.
    pub fn decode(bytes: &[u8]) -> Result<Group> {
        let id = record_id(bytes)?;
        log::trace!("decoding {} ({})", id, group_name(id));
        (codec(id).decode)(bytes)
    }

    /// Encode the record, computing its byte count, padding and checksum
    ///
    /// Unknown records are returned exactly as they were read.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let name = self.name();
        match self {
            Group::VesselNavigation(g) => encode_body(name, g),
            Group::Imu(g) => encode_body(name, g),
            Group::Status(g) => encode_body(name, g),
            Group::Calibration(g) => encode_body(name, g),
            Group::GnssStatus(g) => encode_body(name, g),
            Group::MvStatus(g) => encode_body(name, g),
            Group::TrueHeave(g) => encode_body(name, g),
            Group::Nmea(g) => encode_body(name, g),
            Group::Installation(m) => encode_body(name, m),
            Group::GeneralData(m) => encode_body(name, m),
            Group::Unknown { bytes, .. } => Ok(bytes.clone()),
        }
    }

    /// The record kind
    pub fn id(&self) -> RecordId {
        match self {
            Group::VesselNavigation(_) => RecordId::Group(1),
            Group::Imu(_) => RecordId::Group(4),
            Group::Status(_) => RecordId::Group(10),
            Group::Calibration(_) => RecordId::Group(14),
            Group::GnssStatus(_) => RecordId::Group(29),
            Group::MvStatus(_) => RecordId::Group(110),
            Group::TrueHeave(_) => RecordId::Group(111),
            Group::Nmea(_) => RecordId::Group(112),
            Group::Installation(_) => RecordId::Message(20),
            Group::GeneralData(_) => RecordId::Message(56),
            Group::Unknown { id, .. } => *id,
        }
    }

    /// Name of the record kind
    pub fn name(&self) -> &'static str {
        group_name(self.id())
    }
}

/// The POS MV `.000` stream family
#[derive(Debug, Clone, Copy)]
pub struct Navigation;

/// Turns GPS seconds of week into unix time
///
/// Messages carry no time of their own and take the time of the last group.
#[derive(Debug, Default)]
pub struct NavClock {
    origin: TimeOrigin,
    last: f64,
}

impl NavClock {
    /// A clock counting from `origin`
    pub fn new(origin: TimeOrigin) -> Self {
        NavClock {
            origin,
            last: origin.seconds,
        }
    }

    /// The origin timestamps are counted from
    pub fn origin(&self) -> TimeOrigin {
        self.origin
    }

    /// Replace the origin and forget the last group time
    pub fn set_origin(&mut self, origin: TimeOrigin) {
        *self = NavClock::new(origin);
    }
}

fn short_header(offset: u64, cursor_offset: u64) -> Error {
    Error::CorruptHeader {
        offset,
        reason: format!("only {} bytes left for a header", cursor_offset - offset),
    }
}

impl Format for Navigation {
    type Header = GroupHeader;
    type Clock = NavClock;
    const NAME: &'static str = "POS MV";

    fn peek_header<T: Read + Seek>(
        cursor: &mut crate::cursor::ByteCursor<T>,
    ) -> Result<Option<GroupHeader>> {
        let offset = cursor.offset();
        if cursor.remaining() == 0 {
            return Ok(None);
        }

        let sync = match cursor.read_exact(SYNC_LEN as usize) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Err(short_header(offset, cursor.offset()))
            }
            Err(e) => return Err(e.into()),
        };
        let id = u16::from_le_bytes([sync[4], sync[5]]);
        let byte_count = u16::from_le_bytes([sync[6], sync[7]]);

        // Groups and messages differ after the byte count, and so does the
        // width of the header.
        let preamble = if sync[..4] == GROUP_START {
            let block = match cursor.read_exact((GROUP_HEADER_LEN - SYNC_LEN) as usize) {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    return Err(short_header(offset, cursor.offset()))
                }
                Err(e) => return Err(e.into()),
            };
            let time = TimeDistance::read(&mut Cursor::new(&block)).map_err(|e| {
                Error::CorruptHeader {
                    offset,
                    reason: e.to_string(),
                }
            })?;
            Preamble::Group(time)
        } else if sync[..4] == MESSAGE_START {
            let block = match cursor.read_exact((MESSAGE_HEADER_LEN - SYNC_LEN) as usize) {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    return Err(short_header(offset, cursor.offset()))
                }
                Err(e) => return Err(e.into()),
            };
            Preamble::Message {
                transaction: u16::from_le_bytes([block[0], block[1]]),
            }
        } else {
            return Err(Error::CorruptHeader {
                offset,
                reason: format!("expected $GRP or $MSG, found {:?}", &sync[..4]),
            });
        };
        cursor.seek_to(offset)?;

        let header = GroupHeader {
            id,
            byte_count,
            preamble,
        };
        if header.total_length() < header.header_len() + FOOTER_LEN {
            return Err(Error::CorruptHeader {
                offset,
                reason: format!("byte count {} is shorter than a {} header", byte_count, header.record_id()),
            });
        }
        Ok(Some(header))
    }

    fn record_length(header: &GroupHeader) -> u64 {
        header.total_length()
    }

    fn timestamp(header: &GroupHeader, clock: &mut NavClock) -> f64 {
        if let Some(time) = header.time() {
            clock.last = clock.origin.seconds + time.time1;
        }
        clock.last
    }
}

/// A reader over a POS MV file
pub type PosReader<T = BufReader<File>> = Reader<Navigation, T>;

impl Reader<Navigation, BufReader<File>> {
    /// Open a POS MV file and resolve its time origin
    ///
    /// The origin comes from the file name if it holds a `YYYYMMDD` date,
    /// otherwise from the first general data message in the file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::info!("opening {}", path.display());
        let f = File::open(path)?;
        let mut reader = Self::new(BufReader::new(f), NavClock::default())?;
        match TimeOrigin::from_filename(path) {
            Some(origin) => reader.clock_mut().set_origin(origin),
            None => {
                reader.resolve_origin()?;
            }
        }
        log::info!("{}: GPS week origin {}", path.display(), reader.origin());
        Ok(reader)
    }
}

impl<T: Read + Seek> Reader<Navigation, T> {
    /// A reader over `inner` with a known time origin
    pub fn with_origin(inner: T, origin: TimeOrigin) -> Result<Self> {
        Reader::new(inner, NavClock::new(origin))
    }

    /// Find the time origin from the first general data message
    ///
    /// Falls back to an uncalibrated origin when there is none. The reader
    /// is rewound either way.
    pub fn resolve_origin(&mut self) -> Result<TimeOrigin> {
        self.rewind()?;
        let mut found = None;
        while let Ok(Some(handle)) = self.read_next() {
            if handle.header.record_id() != RecordId::Message(GENERAL_DATA) {
                continue;
            }
            match self.decode(&handle) {
                Ok(Group::GeneralData(m)) => {
                    found = m.origin();
                    if found.is_some() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(e) => log::debug!("skipping unreadable general data message: {}", e),
            }
        }
        self.rewind()?;

        let origin = found.unwrap_or_else(|| {
            log::warn!("no date found, navigation timestamps are relative to the unix epoch");
            TimeOrigin::uncalibrated()
        });
        self.clock_mut().set_origin(origin);
        Ok(origin)
    }

    /// The time origin of the file
    pub fn origin(&self) -> TimeOrigin {
        self.clock().origin()
    }

    /// Decode a record located by [`Reader::read_next`]
    ///
    /// # Errors
    ///
    /// Decode errors carry absolute file offsets.
    pub fn decode(&mut self, handle: &RecordHandle<GroupHeader>) -> Result<Group> {
        let bytes = self.raw_bytes(handle)?;
        Group::decode(&bytes).map_err(|e| e.rebase(handle.offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::ByteCursor;
    use time::macros::date;

    fn status(time1: f64) -> Group {
        Group::MvStatus(MvStatus {
            time: TimeDistance {
                time1,
                time2: 12.5,
                ..Default::default()
            },
            general_status: 0x0101,
            truez_time_remaining: 30,
        })
    }

    fn general_data() -> Group {
        Group::GeneralData(GeneralData {
            transaction: 4,
            year: 2015,
            month: 5,
            day: 28,
            ..Default::default()
        })
    }

    #[test]
    fn groups_and_messages_branch() {
        let bytes = status(100.0).encode().unwrap();
        let mut cursor = ByteCursor::new(Cursor::new(bytes.clone())).unwrap();
        let header = Navigation::peek_header(&mut cursor).unwrap().unwrap();
        assert_eq!(cursor.offset(), 0);
        assert_eq!(header.record_id(), RecordId::Group(110));
        assert_eq!(header.header_len(), GROUP_HEADER_LEN);
        assert_eq!(header.total_length(), bytes.len() as u64);
        assert_eq!(header.time().unwrap().time1, 100.0);

        let bytes = general_data().encode().unwrap();
        let mut cursor = ByteCursor::new(Cursor::new(bytes.clone())).unwrap();
        let header = Navigation::peek_header(&mut cursor).unwrap().unwrap();
        assert!(header.is_message());
        assert_eq!(header.record_id(), RecordId::Message(56));
        assert_eq!(header.preamble, Preamble::Message { transaction: 4 });
        assert_eq!(header.header_len(), MESSAGE_HEADER_LEN);
        assert!(header.time().is_none());
        assert_eq!(header.total_length(), bytes.len() as u64);
    }

    #[test]
    fn records_are_aligned_and_sum_to_zero() {
        for g in [status(1.0), general_data()] {
            let bytes = g.encode().unwrap();
            assert_eq!(bytes.len() % 4, 0);
            assert_eq!(&bytes[bytes.len() - 2..], b"$#");
            assert!(verify_checksum(&bytes));
            assert_eq!(Group::decode(&bytes).unwrap(), g);
        }
        // 38 bytes of status group need two pad bytes
        assert_eq!(status(1.0).encode().unwrap().len(), 44);
        assert_eq!(alignment_pad(38), 2);
        assert_eq!(alignment_pad(40), 0);
    }

    #[test]
    fn peek_rejects_bad_marker() {
        let mut bytes = status(1.0).encode().unwrap();
        bytes[1] = b'X';
        let mut cursor = ByteCursor::new(Cursor::new(bytes)).unwrap();
        assert!(matches!(
            Navigation::peek_header(&mut cursor),
            Err(Error::CorruptHeader { offset: 0, .. })
        ));
    }

    #[test]
    fn short_group_header_is_corrupt() {
        let bytes = status(1.0).encode().unwrap();
        // a message header would fit in 12 bytes, a group header does not
        let mut cursor = ByteCursor::new(Cursor::new(bytes[..12].to_vec())).unwrap();
        assert!(matches!(
            Navigation::peek_header(&mut cursor),
            Err(Error::CorruptHeader { .. })
        ));
    }

    #[test]
    fn unknown_records_pass_through() {
        let mut bytes = status(1.0).encode().unwrap();
        bytes[4] = 200;
        let g = Group::decode(&bytes).unwrap();
        assert_eq!(g.id(), RecordId::Group(200));
        assert_eq!(g.name(), "Unknown");
        assert_eq!(g.encode().unwrap(), bytes);
        assert_eq!(group_name(RecordId::Group(113)), "True heave performance metrics");
    }

    #[test]
    fn messages_take_the_time_of_the_last_group() {
        let mut file = status(100.0).encode().unwrap();
        file.extend(general_data().encode().unwrap());
        file.extend(status(101.5).encode().unwrap());

        let origin = TimeOrigin::from_date(date!(2015 - 05 - 28), OriginSource::Record);
        let reader = PosReader::<Cursor<Vec<u8>>>::with_origin(Cursor::new(file), origin).unwrap();
        let times: Vec<f64> = reader.map(|h| h.unwrap().timestamp).collect();
        assert_eq!(
            times,
            vec![origin.seconds + 100.0, origin.seconds + 100.0, origin.seconds + 101.5]
        );
    }

    #[test]
    fn origin_from_general_data() {
        let mut file = status(100.0).encode().unwrap();
        file.extend(general_data().encode().unwrap());

        let mut reader = PosReader::<Cursor<Vec<u8>>>::new(Cursor::new(file), NavClock::default()).unwrap();
        let origin = reader.resolve_origin().unwrap();
        assert_eq!(origin.source, OriginSource::Record);
        assert_eq!(origin.seconds, 1_432_425_600.0);
        let first = reader.read_next().unwrap().unwrap();
        assert_eq!(first.offset, 0);
        assert_eq!(first.timestamp, 1_432_425_700.0);
    }

    #[test]
    fn missing_origin_is_uncalibrated() {
        let file = status(100.0).encode().unwrap();
        let mut reader = PosReader::<Cursor<Vec<u8>>>::new(Cursor::new(file), NavClock::default()).unwrap();
        let origin = reader.resolve_origin().unwrap();
        assert!(!origin.is_calibrated());
        assert_eq!(reader.next().unwrap().unwrap().timestamp, 100.0);
    }
}
