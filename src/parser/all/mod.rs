//! Parsing Kongsberg EM `.all` datagram files
//!
//! Every datagram starts with a 4-byte little-endian length (counting the
//! bytes that follow it), the `STX` sync byte, an ASCII type tag, the model
//! number and a date/time stamp. It ends with an optional spare byte, `ETX`
//! and a 16-bit checksum.
//!
//! Whether the spare byte is present is fixed per datagram kind; see
//! [`Padding`].
use crate::clock;
use crate::parser::{body_error, checked_vec, min_len};
use crate::reader::{Format, RecordHandle, Reader};
use crate::{Error, Result};
use binrw::io::{BufReader, Cursor, Read, Seek};
use binrw::{binrw, BinRead, BinReaderExt, BinResult, BinWrite, BinWriterExt, Endian};
use std::fs::File;
use std::path::Path;

mod attitude;
mod depth;
mod install;
mod position;
mod range;
mod runtime;
mod seabed;

pub use attitude::{
    Attitude, AttitudeEntry, Heading, HeadingEntry, Height, NetworkAttitude,
    NetworkAttitudeEntry,
};
pub(crate) use attitude::centi;
pub use depth::{Depth, DepthBeam, Xyz, XyzBeam};
pub use install::{ExtraParameters, Installation};
pub use position::Position;
pub use range::{RangeAngle, RxBeam, TxSector};
pub use runtime::{Clock, Runtime, SoundSpeedProfile, SoundSpeedEntry};
pub use seabed::{SeabedBeam, SeabedImage};

/// Start-of-datagram marker
pub const STX: u8 = 0x02;

/// End-of-datagram marker
pub const ETX: u8 = 0x03;

/// Bytes in the common header, including the length field
pub const HEADER_LEN: u64 = 16;

/// Bytes in the footer after any spare byte (`ETX` and checksum)
pub const FOOTER_LEN: u64 = 3;

const LENGTH_FIELD: u64 = 4;

/// The common header at the start of every datagram
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DatagramHeader {
    /// Bytes following this field, up to and including the checksum
    pub length: u32,
    /// Should always be [`STX`]
    pub stx: u8,
    /// The ASCII type tag
    pub datagram_type: u8,
    /// EM model number, e.g. 2040
    pub model: u16,
    /// Date as `YYYYMMDD`
    pub date: u32,
    /// Milliseconds since midnight
    pub time: u32,
}

impl DatagramHeader {
    /// Total on-disk length of the datagram
    pub fn total_length(&self) -> u64 {
        u64::from(self.length) + LENGTH_FIELD
    }

    /// Unix seconds of the datagram, if its date is valid
    pub fn timestamp(&self) -> Option<f64> {
        clock::datagram_to_unix(self.date, self.time)
    }

    /// The model and time fields
    pub fn stamp(&self) -> Stamp {
        Stamp {
            model: self.model,
            date: self.date,
            time: self.time,
        }
    }
}

/// The model number and clock of a datagram
///
/// Every decoded datagram carries the stamp of its header so that it can
/// be written back unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stamp {
    /// EM model number
    pub model: u16,
    /// Date as `YYYYMMDD`
    pub date: u32,
    /// Milliseconds since midnight
    pub time: u32,
}

impl Stamp {
    /// A stamp for `model` at unix time `timestamp`
    ///
    /// Returns `None` if the time cannot be expressed as a datagram date.
    pub fn at(model: u16, timestamp: f64) -> Option<Stamp> {
        let (date, time) = clock::unix_to_datagram(timestamp)?;
        Some(Stamp { model, date, time })
    }

    /// Unix seconds of the stamp, if its date is valid
    pub fn timestamp(&self) -> Option<f64> {
        clock::datagram_to_unix(self.date, self.time)
    }
}

/// Whether a datagram kind carries a spare byte before `ETX`
///
/// Kongsberg pads datagrams so that their length is even. For most kinds
/// the layout fixes the parity, so the spare byte is either always or never
/// there; kinds with free-length content follow the parity of the bytes
/// actually written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Padding {
    /// No spare byte
    Never,
    /// Always one spare byte
    Always,
    /// A spare byte iff the bytes before the footer plus the footer is odd
    Parity,
}

impl Padding {
    /// Whether a spare byte follows `consumed` bytes of datagram
    pub fn present(self, consumed: u64) -> bool {
        match self {
            Padding::Never => false,
            Padding::Always => true,
            Padding::Parity => (consumed + FOOTER_LEN) % 2 == 1,
        }
    }
}

/// The fixed body of one datagram kind
pub(crate) trait Body {
    const PADDING: Padding;

    fn stamp(&self) -> Stamp;

    fn set_stamp(&mut self, stamp: Stamp);
}

macro_rules! body {
    ($name:ty, $padding:expr) => {
        impl $crate::parser::all::Body for $name {
            const PADDING: $crate::parser::all::Padding = $padding;

            fn stamp(&self) -> $crate::parser::all::Stamp {
                self.stamp
            }

            fn set_stamp(&mut self, stamp: $crate::parser::all::Stamp) {
                self.stamp = stamp;
            }
        }
    };
}
pub(crate) use body;

/// Read `count` entries of an array that must end before the footer
pub(crate) fn counted<T, R>(reader: &mut R, endian: Endian, (count,): (usize,)) -> BinResult<Vec<T>>
where
    R: Read + Seek,
    T: Default + for<'a> BinRead<Args<'a> = ()> + for<'a> BinWrite<Args<'a> = ()>,
{
    checked_vec(reader, endian, count, FOOTER_LEN)
}

/// Read free-length content up to the footer
///
/// A trailing NUL that sits where the parity rule puts a spare byte is left
/// unread so the footer reader consumes it as padding.
pub(crate) fn to_footer<R: Read + Seek>(reader: &mut R, _endian: Endian, _: ()) -> BinResult<Vec<u8>> {
    let mut rest = Vec::new();
    reader.read_to_end(&mut rest)?;
    let start = reader.stream_position()? - rest.len() as u64;

    let mut len = rest.len().saturating_sub(FOOTER_LEN as usize);
    if len > 0 && rest[len - 1] == 0 && Padding::Parity.present(start + len as u64 - 1) {
        len -= 1;
    }
    rest.truncate(len);
    reader.seek(binrw::io::SeekFrom::Start(start + len as u64))?;
    Ok(rest)
}

/// Free-length ASCII content up to the footer
///
/// Bytes that are not UTF-8 are replaced.
pub(crate) fn footer_text<R: Read + Seek>(reader: &mut R, endian: Endian, _: ()) -> BinResult<String> {
    let bytes = to_footer(reader, endian, ())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Kongsberg checksum: the 16-bit sum of the bytes between `STX` and `ETX`
pub fn checksum(bytes: &[u8]) -> u16 {
    bytes
        .iter()
        .fold(0u16, |sum, b| sum.wrapping_add(u16::from(*b)))
}

/// Whether the checksum of an encoded datagram matches its content
///
/// Checksums are advisory: recorded files often carry zeros, and nothing in
/// this crate rejects a datagram because of its checksum.
pub fn verify_checksum(datagram: &[u8]) -> bool {
    let n = datagram.len();
    if n < (HEADER_LEN + FOOTER_LEN) as usize {
        return false;
    }
    let stored = u16::from_le_bytes([datagram[n - 2], datagram[n - 1]]);
    stored == checksum(&datagram[5..n - 3])
}

fn read_footer(cursor: &Cursor<&[u8]>, padding: Padding) -> Result<()> {
    let buf = *cursor.get_ref();
    let pos = cursor.position();
    let mut pad = u64::from(padding.present(pos));
    if padding == Padding::Parity && pad == 1 && buf.len() as u64 == pos + FOOTER_LEN {
        log::debug!("odd-length datagram without a spare byte");
        pad = 0;
    }
    let end = pos + pad + FOOTER_LEN;
    if end > buf.len() as u64 {
        return Err(Error::TruncatedPayload {
            offset: pos,
            declared: pad + FOOTER_LEN,
            available: buf.len() as u64 - pos.min(buf.len() as u64),
        });
    }

    let etx_at = (pos + pad) as usize;
    if buf[etx_at] != ETX {
        log::debug!("expected ETX at {}, found {:#04x}", etx_at, buf[etx_at]);
    }
    let stored = u16::from_le_bytes([buf[etx_at + 1], buf[etx_at + 2]]);
    if stored != checksum(&buf[5..etx_at]) {
        log::debug!("advisory checksum mismatch: stored {:#06x}", stored);
    }
    if (end as usize) < buf.len() {
        log::trace!("ignoring {} bytes after the footer", buf.len() - end as usize);
    }
    Ok(())
}

fn decode_body<B>(bytes: &[u8]) -> Result<B>
where
    B: Body + Default + for<'a> BinRead<Args<'a> = ()> + for<'a> BinWrite<Args<'a> = ()>,
{
    let mut cursor = Cursor::new(bytes);
    let header: DatagramHeader = cursor.read_le().map_err(body_error)?;

    let available = (bytes.len() as u64).saturating_sub(HEADER_LEN + FOOTER_LEN);
    let needed = min_len::<B>() as u64;
    if needed > available {
        return Err(Error::TruncatedPayload {
            offset: HEADER_LEN,
            declared: needed,
            available,
        });
    }

    let mut body: B = cursor.read_le().map_err(body_error)?;
    read_footer(&cursor, B::PADDING)?;
    body.set_stamp(header.stamp());
    Ok(body)
}

fn encode_body<B>(tag: u8, name: &'static str, body: &B) -> Result<Vec<u8>>
where
    B: Body + for<'a> BinWrite<Args<'a> = ()>,
{
    let stamp = body.stamp();
    let header = DatagramHeader {
        length: 0,
        stx: STX,
        datagram_type: tag,
        model: stamp.model,
        date: stamp.date,
        time: stamp.time,
    };

    let mut out = Cursor::new(Vec::new());
    out.write_le(&header)
        .and_then(|_| out.write_le(body))
        .map_err(|e| Error::Encode {
            record: name,
            reason: e.to_string(),
        })?;

    let mut bytes = out.into_inner();
    if B::PADDING.present(bytes.len() as u64) {
        bytes.push(0);
    }
    let sum = checksum(&bytes[5..]);
    bytes.push(ETX);
    bytes.extend_from_slice(&sum.to_le_bytes());

    let length = u32::try_from(bytes.len() as u64 - LENGTH_FIELD).map_err(|_| Error::Encode {
        record: name,
        reason: format!("{} bytes do not fit a datagram", bytes.len()),
    })?;
    bytes[..4].copy_from_slice(&length.to_le_bytes());
    Ok(bytes)
}

/// A decoded `.all` datagram
#[derive(Debug, Clone, PartialEq)]
pub enum Datagram {
    /// `3`: extra parameters
    ExtraParameters(ExtraParameters),
    /// `A`: attitude
    Attitude(Attitude),
    /// `C`: clock
    Clock(Clock),
    /// `D`: depth
    Depth(Depth),
    /// `H`: heading
    Heading(Heading),
    /// `h`: height
    Height(Height),
    /// `I`: installation parameters at the start of a line
    InstallationStart(Installation),
    /// `i`: installation parameters at the end of a line
    InstallationStop(Installation),
    /// `n`: network attitude velocity
    NetworkAttitude(NetworkAttitude),
    /// `N`: raw range and angle
    RangeAngle(RangeAngle),
    /// `P`: position
    Position(Position),
    /// `R`: runtime parameters
    Runtime(Runtime),
    /// `U`: sound speed profile
    SoundSpeedProfile(SoundSpeedProfile),
    /// `X`: XYZ depth
    Xyz(Xyz),
    /// `Y`: seabed image
    SeabedImage(SeabedImage),
    /// Any datagram kind without a codec, kept verbatim
    Unknown {
        /// The ASCII type tag
        tag: u8,
        /// The whole datagram, length field to checksum
        bytes: Vec<u8>,
    },
}

/// The decoder for one datagram kind
#[derive(Clone, Copy)]
pub struct Codec {
    /// Name of the datagram kind
    pub name: &'static str,
    /// Decode a whole datagram, length field to checksum
    pub decode: fn(&[u8]) -> Result<Datagram>,
}

impl std::fmt::Debug for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Codec").field("name", &self.name).finish()
    }
}

fn decode_unknown(bytes: &[u8]) -> Result<Datagram> {
    let tag = bytes.get(5).copied().ok_or_else(|| Error::CorruptHeader {
        offset: 0,
        reason: format!("{} bytes is shorter than a datagram header", bytes.len()),
    })?;
    Ok(Datagram::Unknown {
        tag,
        bytes: bytes.to_vec(),
    })
}

/// Look up the codec for a type tag
///
/// Tags without a codec get the pass-through codec, which keeps the raw
/// bytes so that the datagram can be copied unchanged.
pub fn codec(tag: u8) -> Codec {
    match tag {
        b'3' => Codec {
            name: "Extra parameters",
            decode: |b| decode_body(b).map(Datagram::ExtraParameters),
        },
        b'A' => Codec {
            name: "Attitude",
            decode: |b| decode_body(b).map(Datagram::Attitude),
        },
        b'C' => Codec {
            name: "Clock",
            decode: |b| decode_body(b).map(Datagram::Clock),
        },
        b'D' => Codec {
            name: "Depth",
            decode: |b| decode_body(b).map(Datagram::Depth),
        },
        b'H' => Codec {
            name: "Heading",
            decode: |b| decode_body(b).map(Datagram::Heading),
        },
        b'h' => Codec {
            name: "Height",
            decode: |b| decode_body(b).map(Datagram::Height),
        },
        b'I' => Codec {
            name: "Installation start",
            decode: |b| decode_body(b).map(Datagram::InstallationStart),
        },
        b'i' => Codec {
            name: "Installation stop",
            decode: |b| decode_body(b).map(Datagram::InstallationStop),
        },
        b'n' => Codec {
            name: "Network attitude",
            decode: |b| decode_body(b).map(Datagram::NetworkAttitude),
        },
        b'N' => Codec {
            name: "Raw range and angle",
            decode: |b| decode_body(b).map(Datagram::RangeAngle),
        },
        b'P' => Codec {
            name: "Position",
            decode: |b| decode_body(b).map(Datagram::Position),
        },
        b'R' => Codec {
            name: "Runtime parameters",
            decode: |b| decode_body(b).map(Datagram::Runtime),
        },
        b'U' => Codec {
            name: "Sound speed profile",
            decode: |b| decode_body(b).map(Datagram::SoundSpeedProfile),
        },
        b'X' => Codec {
            name: "XYZ depth",
            decode: |b| decode_body(b).map(Datagram::Xyz),
        },
        b'Y' => Codec {
            name: "Seabed image",
            decode: |b| decode_body(b).map(Datagram::SeabedImage),
        },
        _ => Codec {
            name: "Unknown",
            decode: decode_unknown,
        },
    }
}

/// Name of the datagram kind with this tag
pub fn datagram_name(tag: u8) -> &'static str {
    codec(tag).name
}

impl Datagram {
    /// Decode a whole datagram, length field to checksum
    ///
    /// Offsets in errors are relative to the start of `bytes`.
    pub fn decode(bytes: &[u8]) -> Result<Datagram> {
        let tag = bytes.get(5).copied().unwrap_or_default();
        log::trace!("decoding {} datagram", datagram_name(tag));
        (codec(tag).decode)(bytes)
    }

    /// Encode the datagram, computing its length, padding and checksum
    ///
    /// Unknown datagrams are returned exactly as they were read.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let tag = self.tag();
        let name = datagram_name(tag);
        match self {
            Datagram::ExtraParameters(d) => encode_body(tag, name, d),
            Datagram::Attitude(d) => encode_body(tag, name, d),
            Datagram::Clock(d) => encode_body(tag, name, d),
            Datagram::Depth(d) => encode_body(tag, name, d),
            Datagram::Heading(d) => encode_body(tag, name, d),
            Datagram::Height(d) => encode_body(tag, name, d),
            Datagram::InstallationStart(d) | Datagram::InstallationStop(d) => {
                encode_body(tag, name, d)
            }
            Datagram::NetworkAttitude(d) => encode_body(tag, name, d),
            Datagram::RangeAngle(d) => encode_body(tag, name, d),
            Datagram::Position(d) => encode_body(tag, name, d),
            Datagram::Runtime(d) => encode_body(tag, name, d),
            Datagram::SoundSpeedProfile(d) => encode_body(tag, name, d),
            Datagram::Xyz(d) => encode_body(tag, name, d),
            Datagram::SeabedImage(d) => encode_body(tag, name, d),
            Datagram::Unknown { bytes, .. } => Ok(bytes.clone()),
        }
    }

    /// The ASCII type tag
    pub fn tag(&self) -> u8 {
        match self {
            Datagram::ExtraParameters(_) => b'3',
            Datagram::Attitude(_) => b'A',
            Datagram::Clock(_) => b'C',
            Datagram::Depth(_) => b'D',
            Datagram::Heading(_) => b'H',
            Datagram::Height(_) => b'h',
            Datagram::InstallationStart(_) => b'I',
            Datagram::InstallationStop(_) => b'i',
            Datagram::NetworkAttitude(_) => b'n',
            Datagram::RangeAngle(_) => b'N',
            Datagram::Position(_) => b'P',
            Datagram::Runtime(_) => b'R',
            Datagram::SoundSpeedProfile(_) => b'U',
            Datagram::Xyz(_) => b'X',
            Datagram::SeabedImage(_) => b'Y',
            Datagram::Unknown { tag, .. } => *tag,
        }
    }

    /// Name of the datagram kind
    pub fn name(&self) -> &'static str {
        datagram_name(self.tag())
    }
}

/// The Kongsberg `.all` stream family
#[derive(Debug, Clone, Copy)]
pub struct Sonar;

/// Timestamps for datagrams whose date cannot be read
///
/// Such datagrams take the time of the last datagram that had a valid one.
#[derive(Debug, Default)]
pub struct SonarClock {
    last: f64,
}

impl Format for Sonar {
    type Header = DatagramHeader;
    type Clock = SonarClock;
    const NAME: &'static str = ".all";

    fn peek_header<T: Read + Seek>(
        cursor: &mut crate::cursor::ByteCursor<T>,
    ) -> Result<Option<DatagramHeader>> {
        let offset = cursor.offset();
        if cursor.remaining() == 0 {
            return Ok(None);
        }

        let bytes = match cursor.read_exact(HEADER_LEN as usize) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Err(Error::CorruptHeader {
                    offset,
                    reason: format!("only {} bytes left for a header", cursor.offset() - offset),
                })
            }
            Err(e) => return Err(e.into()),
        };
        cursor.seek_to(offset)?;

        let header = DatagramHeader::read(&mut Cursor::new(&bytes)).map_err(|e| {
            Error::CorruptHeader {
                offset,
                reason: e.to_string(),
            }
        })?;
        if header.stx != STX {
            return Err(Error::CorruptHeader {
                offset,
                reason: format!("expected STX, found {:#04x}", header.stx),
            });
        }
        if header.total_length() < HEADER_LEN + FOOTER_LEN {
            return Err(Error::CorruptHeader {
                offset,
                reason: format!("declared length {} is shorter than a datagram", header.length),
            });
        }
        Ok(Some(header))
    }

    fn record_length(header: &DatagramHeader) -> u64 {
        header.total_length()
    }

    fn timestamp(header: &DatagramHeader, clock: &mut SonarClock) -> f64 {
        if let Some(t) = header.timestamp() {
            clock.last = t;
        }
        clock.last
    }
}

/// A reader over a `.all` file
pub type AllReader<T = BufReader<File>> = Reader<Sonar, T>;

impl Reader<Sonar, BufReader<File>> {
    /// Open a `.all` file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        log::info!("opening {}", path.as_ref().display());
        let f = File::open(path.as_ref())?;
        Reader::new(BufReader::new(f), SonarClock::default())
    }
}

impl<T: Read + Seek> Reader<Sonar, T> {
    /// Decode a datagram located by [`Reader::read_next`]
    ///
    /// # Errors
    ///
    /// Decode errors carry absolute file offsets.
    pub fn decode(&mut self, handle: &RecordHandle<DatagramHeader>) -> Result<Datagram> {
        let bytes = self.raw_bytes(handle)?;
        Datagram::decode(&bytes).map_err(|e| e.rebase(handle.offset))
    }
}
