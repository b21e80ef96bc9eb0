mod common;

use common::*;
use proptest::prelude::*;
use sonarcond::parser::all::{
    AllReader, Attitude, AttitudeEntry, Clock, Datagram, Depth, DepthBeam, Heading, HeadingEntry,
    Height, Position, Stamp,
};
use sonarcond::Error;
use std::io::Cursor;

fn reader(bytes: Vec<u8>) -> AllReader<Cursor<Vec<u8>>> {
    AllReader::new(Cursor::new(bytes), Default::default()).unwrap()
}

#[test]
fn handles_locate_every_datagram() {
    let mut bytes = encode_all(&[start(0.0), clock(0.5), depth(1.25)]);
    bytes.extend(unknown(2.0, b'f', &[7; 11]));
    let mut r = reader(bytes.clone());

    let handles: Vec<_> = r.by_ref().collect::<Result<_, _>>().unwrap();
    let spans: Vec<(u64, u64)> = walk(&bytes)
        .iter()
        .scan(0u64, |at, d| {
            let span = (*at, d.len() as u64);
            *at += d.len() as u64;
            Some(span)
        })
        .collect();
    assert_eq!(
        handles.iter().map(|h| (h.offset, h.length)).collect::<Vec<_>>(),
        spans
    );
    assert_eq!(
        handles.iter().map(|h| h.timestamp - T0).collect::<Vec<_>>(),
        vec![0.0, 0.5, 1.25, 2.0]
    );
    assert_eq!(handles[3].header.datagram_type, b'f');

    assert_eq!(r.raw_bytes(&handles[3]).unwrap(), walk(&bytes)[3]);
    match r.decode(&handles[2]).unwrap() {
        Datagram::Depth(d) => assert_eq!(d.stamp, stamp(1.25)),
        d => panic!("expected depth, found {}", d.name()),
    }
    match r.decode(&handles[3]).unwrap() {
        Datagram::Unknown { tag, bytes: raw } => {
            assert_eq!(tag, b'f');
            assert_eq!(raw, walk(&bytes)[3]);
        }
        d => panic!("expected unknown, found {}", d.name()),
    }
    assert!(r.read_next().unwrap().is_none());
}

#[test]
fn record_count_leaves_the_scan_alone() {
    let mut r = reader(encode_all(&[clock(0.0), clock(1.0), clock(2.0)]));
    let first = r.read_next().unwrap().unwrap();
    assert_eq!(r.record_count().unwrap(), 3);
    let second = r.read_next().unwrap().unwrap();
    assert_eq!(second.offset, first.length);

    r.rewind().unwrap();
    assert_eq!(r.read_next().unwrap().unwrap(), first);
}

#[test]
fn undated_datagrams_take_the_last_time() {
    let undated = Datagram::Clock(Clock {
        stamp: Stamp {
            model: MODEL,
            date: 0,
            time: 0,
        },
        ..Default::default()
    });
    let mut r = reader(encode_all(&[clock(3.0), undated, clock(4.0)]));
    let times: Vec<f64> = r.by_ref().map(|h| h.unwrap().timestamp - T0).collect();
    assert_eq!(times, vec![3.0, 3.0, 4.0]);
}

#[test]
fn truncated_final_datagram_stops_the_scan() {
    let mut bytes = encode_all(&[clock(0.0)]);
    let start = bytes.len();
    let whole = encode_all(&[depth(1.0)]);
    bytes.extend(&whole[..whole.len() - 3]);
    let mut r = reader(bytes.clone());

    assert!(r.read_next().unwrap().is_some());
    match r.read_next() {
        Err(Error::TruncatedPayload {
            offset,
            declared,
            available,
        }) => {
            assert_eq!(offset, start as u64);
            assert_eq!(declared, whole.len() as u64);
            assert_eq!(available, whole.len() as u64 - 3);
        }
        other => panic!("expected truncation, got {:?}", other),
    }
    assert!(r.read_next().unwrap().is_none());
    assert_eq!(r.tail().unwrap(), &bytes[start..]);
    assert!(matches!(r.record_count(), Err(Error::TruncatedPayload { .. })));
}

#[test]
fn garbage_is_a_corrupt_header() {
    let mut bytes = encode_all(&[clock(0.0)]);
    let good = bytes.len() as u64;
    bytes.extend([0x10, 0, 0, 0, 0x55, b'C', 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    let mut r = reader(bytes);

    assert!(r.read_next().unwrap().is_some());
    match r.read_next() {
        Err(Error::CorruptHeader { offset, .. }) => assert_eq!(offset, good),
        other => panic!("expected a corrupt header, got {:?}", other),
    }
    assert!(r.tail().unwrap().is_empty());
    assert!(r.next().is_none());
}

fn beam() -> impl Strategy<Value = DepthBeam> {
    (any::<u16>(), any::<i16>(), any::<i16>(), any::<u16>(), any::<u8>(), any::<i8>()).prop_map(
        |(depth, across_track, along_track, range, quality_factor, reflectivity)| DepthBeam {
            depth,
            across_track,
            along_track,
            range,
            quality_factor,
            reflectivity,
            ..Default::default()
        },
    )
}

fn motion(t: f64) -> impl Strategy<Value = Datagram> {
    let entries = prop::collection::vec((0u16..1000, any::<i16>(), any::<u16>()), 0..20);
    let input = prop::collection::vec(any::<u8>(), 0..80);
    prop_oneof![
        entries.clone().prop_map(move |e| Datagram::Attitude(Attitude {
            stamp: stamp(t),
            serial: SERIAL,
            entries: e
                .iter()
                .map(|&(time_offset, roll, heading)| AttitudeEntry {
                    time_offset,
                    roll,
                    heading,
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        })),
        entries.prop_map(move |e| Datagram::Heading(Heading {
            stamp: stamp(t),
            serial: SERIAL,
            entries: e
                .iter()
                .map(|&(time_offset, _, heading)| HeadingEntry { time_offset, heading })
                .collect(),
            heading_indicator: 1,
            ..Default::default()
        })),
        any::<i32>().prop_map(move |height| Datagram::Height(Height {
            stamp: stamp(t),
            serial: SERIAL,
            height,
            ..Default::default()
        })),
        input.prop_map(move |input| Datagram::Position(Position {
            stamp: stamp(t),
            serial: SERIAL,
            latitude: 968_000_000,
            input,
            ..Default::default()
        })),
    ]
}

proptest! {
    #[test]
    fn mixed_streams_read_back(datagrams in prop::collection::vec(motion(7.5), 1..12)) {
        let bytes = encode_all(&datagrams);
        let mut r = reader(bytes.clone());
        let handles: Vec<_> = r.by_ref().collect::<Result<_, _>>().unwrap();

        prop_assert_eq!(handles.len(), datagrams.len());
        prop_assert_eq!(handles.iter().map(|h| h.length).sum::<u64>(), bytes.len() as u64);
        for (handle, datagram) in handles.iter().zip(&datagrams) {
            prop_assert_eq!(handle.header.datagram_type, datagram.tag());
            prop_assert_eq!(&r.decode(handle).unwrap(), datagram);
        }
    }

    #[test]
    fn depth_survives_the_reader(
        beams in prop::collection::vec(beam(), 0..40),
        counter in any::<u16>(),
        heading in 0u16..36000,
        t in 0.0f64..86_400.0,
    ) {
        let depth = Datagram::Depth(Depth {
            stamp: stamp(t),
            counter,
            serial: SERIAL,
            heading,
            max_beams: 254,
            beams,
            ..Default::default()
        });
        let bytes = depth.encode().unwrap();
        let mut r = reader(bytes.clone());
        let handle = r.read_next().unwrap().unwrap();

        prop_assert_eq!(handle.length, bytes.len() as u64);
        prop_assert_eq!(handle.header.datagram_type, b'D');
        prop_assert_eq!(r.decode(&handle).unwrap(), depth);
        prop_assert!(r.read_next().unwrap().is_none());
    }
}
