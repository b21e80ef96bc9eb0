//! Count the records of each type in a file
use super::{writer, Family};
use crate::parser::all::{datagram_name, AllReader};
use crate::parser::pos::{group_name, PosReader};
use crate::reader::{Format, Reader};
use crate::Result;
use binrw::io::{Read, Seek};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;

/// Tally records by label with a header-only scan
///
/// Returns the counts so far and the error that stopped the scan, if any.
pub fn count_records<F, T, L>(reader: &mut Reader<F, T>, label: L) -> (BTreeMap<String, usize>, Option<crate::Error>)
where
    F: Format,
    T: Read + Seek,
    L: Fn(&F::Header) -> String,
{
    let mut counts = BTreeMap::new();
    for handle in reader {
        match handle {
            Ok(handle) => *counts.entry(label(&handle.header)).or_insert(0) += 1,
            Err(e) => return (counts, Some(e)),
        }
    }
    (counts, None)
}

/// Print `count<TAB>type` for every record type in the file at `path`
pub fn count(path: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let (counts, stopped) = match Family::detect(&path)? {
        Family::Sonar => count_records(&mut AllReader::open(&path)?, |h| {
            format!("{} {}", char::from(h.datagram_type), datagram_name(h.datagram_type))
        }),
        Family::Navigation => count_records(&mut PosReader::open(&path)?, |h| {
            format!("{} {}", h.record_id(), group_name(h.record_id()))
        }),
    };

    let mut writer = writer(output.as_deref())?;
    for (key, value) in &counts {
        writeln!(writer, "{}\t{}", value, key)?;
    }
    writer.flush()?;

    match stopped {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
