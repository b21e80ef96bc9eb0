//! Parsers for the supported datagram formats
//!
//! Each format module exposes a header peeker for the [`Reader`](crate::reader::Reader),
//! a record enum with an `Unknown` pass-through variant, and a codec table
//! keyed by the format's type tag.
use binrw::io::{Cursor, Read, Seek, SeekFrom};
use binrw::{BinRead, BinResult, BinWrite, BinWriterExt, Endian};
use std::fmt;

pub mod all;
pub mod pos;
pub mod srh;

/// An array inside a record claims more bytes than the record holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overrun {
    /// Record-relative offset of the array
    pub pos: u64,
    /// Bytes the array needs
    pub needed: u64,
    /// Bytes left before the record footer
    pub available: u64,
}

impl fmt::Display for Overrun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "array at {} needs {} bytes, {} available",
            self.pos, self.needed, self.available
        )
    }
}

/// Encoded size of the default value of `T`
///
/// For fixed-layout structs this is their size on disk; for structs that
/// end in arrays it is the size of the fixed prefix.
pub(crate) fn min_len<T>() -> usize
where
    T: Default + for<'a> BinWrite<Args<'a> = ()>,
{
    let mut out = Cursor::new(Vec::new());
    match out.write_le(&T::default()) {
        Ok(()) => out.into_inner().len(),
        Err(_) => 0,
    }
}

/// Read `count` entries after checking they fit before the last `reserve`
/// bytes of the stream
///
/// Decoders parse one record from an in-memory buffer, so the end of the
/// stream is the end of the record. `reserve` is the width of the footer
/// that follows the arrays.
pub(crate) fn checked_vec<T, R>(
    reader: &mut R,
    endian: Endian,
    count: usize,
    reserve: u64,
) -> BinResult<Vec<T>>
where
    R: Read + Seek,
    T: Default + for<'a> BinRead<Args<'a> = ()> + for<'a> BinWrite<Args<'a> = ()>,
{
    let pos = reader.stream_position()?;
    let end = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(pos))?;

    let available = end.saturating_sub(pos).saturating_sub(reserve);
    let needed = (count as u64).saturating_mul(min_len::<T>() as u64);
    if needed > available {
        return Err(binrw::Error::Custom {
            pos,
            err: Box::new(Overrun {
                pos,
                needed,
                available,
            }),
        });
    }

    let mut entries = Vec::with_capacity(count);
    for _ in 0..count {
        entries.push(T::read_options(reader, endian, ())?);
    }
    Ok(entries)
}

/// Convert a parse failure inside a record into a crate error
pub(crate) fn body_error(err: binrw::Error) -> crate::Error {
    // Field errors from derived parsers arrive wrapped in a backtrace
    if let Some(o) = err.root_cause().custom_err::<Overrun>().copied() {
        return crate::Error::TruncatedPayload {
            offset: o.pos,
            declared: o.needed,
            available: o.available,
        };
    }
    crate::Error::Decode {
        offset: 0,
        source: err,
    }
}
