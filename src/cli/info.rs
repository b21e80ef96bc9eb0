//! Print info about a sonar or navigation file

use super::Family;
use crate::clock::format_unix;
use crate::parser::all::{datagram_name, AllReader, Datagram, Sonar};
use crate::parser::pos::{group_name, Navigation, PosReader};
use crate::reader::{Format, RecordHandle};
use crate::Result;
use std::collections::BTreeMap;

/// What a header scan finds out about a file
#[derive(Debug, Default)]
pub struct Summary {
    /// Number of records
    pub records: usize,
    /// Time of the earliest record
    pub start: Option<f64>,
    /// Time of the latest record
    pub end: Option<f64>,
    /// Record counts by type label
    pub types: BTreeMap<String, usize>,
}

impl Summary {
    /// Account for one record
    pub fn add<H>(&mut self, handle: &RecordHandle<H>, label: String) {
        self.records += 1;
        let t = handle.timestamp;
        self.start = Some(self.start.map_or(t, |s| s.min(t)));
        self.end = Some(self.end.map_or(t, |e| e.max(t)));
        *self.types.entry(label).or_insert(0) += 1;
    }

    fn print(&self) {
        println!("Records: {}", self.records);
        if let (Some(start), Some(end)) = (self.start, self.end) {
            println!("Start date: {}", format_unix(start));
            println!("End date: {}", format_unix(end));
            println!("Duration: {:.1} s", end - start);
        }
        println!("Record types:");
        for (label, n) in &self.types {
            println!("\t{}\t{}", n, label);
        }
    }
}

fn scan<F, I, L>(handles: I, label: L) -> (Summary, Option<crate::Error>)
where
    F: Format,
    I: Iterator<Item = Result<RecordHandle<F::Header>>>,
    L: Fn(&F::Header) -> String,
{
    let mut summary = Summary::default();
    for handle in handles {
        match handle {
            Ok(h) => {
                let l = label(&h.header);
                summary.add(&h, l);
            }
            Err(e) => return (summary, Some(e)),
        }
    }
    (summary, None)
}

/// Print info about the file at `path`
pub fn info<P: AsRef<std::path::Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    println!("File: {}", path.display());

    let stopped = match Family::detect(path)? {
        Family::Sonar => {
            println!("Format: Kongsberg .all");
            let mut reader = AllReader::open(path)?;
            let (summary, stopped) = scan::<Sonar, _, _>(reader.by_ref(), |h| {
                format!("{} {}", char::from(h.datagram_type), datagram_name(h.datagram_type))
            });
            reader.rewind()?;
            let installation = loop {
                match reader.read_next() {
                    Ok(Some(h)) if h.header.datagram_type == b'I' => break reader.decode(&h).ok(),
                    Ok(Some(_)) => {}
                    _ => break None,
                }
            };
            if let Some(Datagram::InstallationStart(i)) = installation {
                println!("Model: EM{}", i.stamp.model);
                println!("Serial number: {}", i.serial);
                println!("Survey line: {}", i.survey_line);
                let params = i.parameters();
                if let Some(version) = params.get("OSV") {
                    println!("Operator station: {}", version);
                }
            }
            summary.print();
            stopped
        }
        Family::Navigation => {
            println!("Format: POS MV");
            let mut reader = PosReader::open(path)?;
            println!("Time origin: {}", reader.origin());
            let (summary, stopped) = scan::<Navigation, _, _>(reader.by_ref(), |h| {
                format!("{} {}", h.record_id(), group_name(h.record_id()))
            });
            summary.print();
            stopped
        }
    };

    match stopped {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
