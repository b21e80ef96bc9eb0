//! Builders for small synthetic `.all` files
#![allow(dead_code)]

use sonarcond::parser::all::{
    checksum, Clock, Datagram, Depth, Installation, RangeAngle, Runtime, Stamp, TxSector,
};
use std::path::{Path, PathBuf};

/// Unix time of the first record of every fixture, 2015-05-28 17:26:00
pub const T0: f64 = 1_432_833_960.0;

pub const MODEL: u16 = 2040;
pub const SERIAL: u16 = 101;

pub fn stamp(t: f64) -> Stamp {
    Stamp::at(MODEL, T0 + t).unwrap()
}

pub fn installation(t: f64) -> Installation {
    Installation {
        stamp: stamp(t),
        survey_line: 1,
        serial: SERIAL,
        secondary_serial: 0,
        text: "WLZ=0.52,SMH=1,OSV=SIS 4.3.2,".to_string(),
    }
}

pub fn start(t: f64) -> Datagram {
    Datagram::InstallationStart(installation(t))
}

pub fn stop(t: f64) -> Datagram {
    Datagram::InstallationStop(installation(t))
}

pub fn runtime(t: f64, mode: u8) -> Datagram {
    Datagram::Runtime(Runtime {
        stamp: stamp(t),
        serial: SERIAL,
        mode,
        ..Default::default()
    })
}

pub fn depth(t: f64) -> Datagram {
    Datagram::Depth(Depth {
        stamp: stamp(t),
        serial: SERIAL,
        ..Default::default()
    })
}

pub fn clock(t: f64) -> Datagram {
    Datagram::Clock(Clock {
        stamp: stamp(t),
        serial: SERIAL,
        ..Default::default()
    })
}

pub fn range(t: f64, frequency: f32) -> Datagram {
    Datagram::RangeAngle(RangeAngle {
        stamp: stamp(t),
        serial: SERIAL,
        sectors: vec![TxSector {
            centre_frequency: frequency,
            ..Default::default()
        }],
        ..Default::default()
    })
}

/// A datagram of a kind without a codec
pub fn unknown(t: f64, tag: u8, body: &[u8]) -> Vec<u8> {
    let clock = clock(t).encode().unwrap();
    let mut bytes = clock[..16].to_vec();
    bytes[5] = tag;
    bytes.extend_from_slice(body);
    let sum = checksum(&bytes[5..]);
    bytes.push(0x03);
    bytes.extend_from_slice(&sum.to_le_bytes());
    let length = (bytes.len() - 4) as u32;
    bytes[..4].copy_from_slice(&length.to_le_bytes());
    bytes
}

pub fn encode_all(datagrams: &[Datagram]) -> Vec<u8> {
    datagrams.iter().flat_map(|d| d.encode().unwrap()).collect()
}

pub fn write(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// Type tags of every datagram in `bytes`
pub fn tags(bytes: &[u8]) -> Vec<u8> {
    walk(bytes).into_iter().map(|d| d[5]).collect()
}

/// Split `bytes` into datagrams by their length fields
pub fn walk(bytes: &[u8]) -> Vec<&[u8]> {
    let mut out = Vec::new();
    let mut at = 0;
    while at + 4 <= bytes.len() {
        let length = u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap()) as usize + 4;
        out.push(&bytes[at..(at + length).min(bytes.len())]);
        at += length;
    }
    out
}

/// Unix time of every datagram in `bytes`
pub fn times(bytes: &[u8]) -> Vec<f64> {
    walk(bytes)
        .into_iter()
        .map(|d| {
            let date = u32::from_le_bytes(d[8..12].try_into().unwrap());
            let time = u32::from_le_bytes(d[12..16].try_into().unwrap());
            sonarcond::clock::datagram_to_unix(date, time).unwrap()
        })
        .collect()
}
