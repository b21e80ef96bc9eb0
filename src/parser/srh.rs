//! Kongsberg Seapath `.srh` delayed heave files
//!
//! The file is a flat array of fixed-size big-endian packets, one heave
//! sample each. It is the only big-endian format handled by the crate.
use crate::{Error, Result};
use binrw::io::Cursor;
use binrw::{binrw, BinRead};
use std::fs;
use std::path::Path;

/// Size of one packet on disk
pub const PACKET_LEN: usize = 15;

/// One delayed heave sample
#[binrw]
#[brw(big)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SrhPacket {
    /// Packet header
    pub header: u16,
    /// Data type
    pub data_type: u8,
    /// Packet status
    pub status: u8,
    /// Whole seconds since the unix epoch
    pub seconds: u32,
    /// Fraction of a second in units of 0.1 ms
    pub fraction: u16,
    /// Delayed heave in cm
    pub heave: i16,
    /// Heave status
    pub heave_status: u8,
    /// Packet checksum
    pub checksum: u16,
}

impl SrhPacket {
    /// A packet for `heave` metres at unix time `timestamp`
    pub fn new(timestamp: f64, heave: f64) -> Self {
        let seconds = timestamp.floor();
        SrhPacket {
            seconds: seconds as u32,
            fraction: ((timestamp - seconds) * 10_000.0).round().min(9_999.0) as u16,
            heave: (heave * 100.0).round() as i16,
            ..Default::default()
        }
    }

    /// Unix seconds of the sample
    pub fn timestamp(&self) -> f64 {
        f64::from(self.seconds) + f64::from(self.fraction) * 0.0001
    }

    /// Heave in metres
    pub fn heave(&self) -> f64 {
        f64::from(self.heave) * 0.01
    }
}

/// Parse every whole packet in `bytes`
///
/// A partial packet at the end of the data is ignored.
pub fn parse_packets(bytes: &[u8]) -> Result<Vec<SrhPacket>> {
    let chunks = bytes.chunks_exact(PACKET_LEN);
    if !chunks.remainder().is_empty() {
        log::warn!(
            "ignoring {} bytes after the last whole heave packet",
            chunks.remainder().len()
        );
    }
    chunks
        .enumerate()
        .map(|(i, chunk)| {
            SrhPacket::read(&mut Cursor::new(chunk)).map_err(|e| Error::Decode {
                offset: (i * PACKET_LEN) as u64,
                source: e,
            })
        })
        .collect()
}

/// Load all packets of an `.srh` file
pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<SrhPacket>> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::InjectionSourceMissing(path.to_path_buf()));
    }
    let packets = parse_packets(&fs::read(path)?)?;
    log::info!("{}: {} heave samples", path.display(), packets.len());
    Ok(packets)
}
