//! List the records in a file
use super::{writer, Family};
use crate::clock::format_unix;
use crate::parser::all::{datagram_name, AllReader};
use crate::parser::pos::{group_name, PosReader};
use crate::reader::{Format, Reader};
use crate::Result;
use binrw::io::{Read, Seek};
use std::io::Write;
use std::path::PathBuf;

fn list_records<F, T, L, W>(reader: &mut Reader<F, T>, label: L, out: &mut W) -> Result<()>
where
    F: Format,
    T: Read + Seek,
    L: Fn(&F::Header) -> String,
    W: Write + ?Sized,
{
    for handle in reader {
        let handle = handle?;
        writeln!(
            out,
            "{}\t{}\t{}\t{}",
            handle.offset,
            format_unix(handle.timestamp),
            handle.length,
            label(&handle.header)
        )?;
    }
    Ok(())
}

/// Print offset, time, length and type of every record in the file at
/// `path`
pub fn list(path: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let mut writer = writer(output.as_deref())?;
    let result = match Family::detect(&path)? {
        Family::Sonar => list_records(
            &mut AllReader::open(&path)?,
            |h| format!("{} {}", char::from(h.datagram_type), datagram_name(h.datagram_type)),
            &mut writer,
        ),
        Family::Navigation => list_records(
            &mut PosReader::open(&path)?,
            |h| format!("{} {}", h.record_id(), group_name(h.record_id())),
            &mut writer,
        ),
    };
    writer.flush()?;
    result
}
