use criterion::{criterion_group, criterion_main, Criterion};
use sonarcond::parser::all::{AllReader, Attitude, AttitudeEntry, Datagram, Depth, DepthBeam, Stamp};
use std::io::Cursor;

const T0: f64 = 1_432_833_960.0;

fn synthetic_file() -> Vec<u8> {
    let mut bytes = Vec::new();
    for i in 0..2000 {
        let t = T0 + f64::from(i) * 0.1;
        let stamp = Stamp::at(2040, t).unwrap();
        let depth = Datagram::Depth(Depth {
            stamp,
            counter: i as u16,
            serial: 101,
            beams: vec![DepthBeam::default(); 254],
            ..Default::default()
        });
        let attitude = Datagram::Attitude(Attitude {
            stamp,
            counter: i as u16,
            serial: 101,
            entries: (0..10).map(|k| AttitudeEntry::new(k * 10, 1.0, -1.0, 0.2, 90.0)).collect(),
            ..Default::default()
        });
        bytes.extend(depth.encode().unwrap());
        bytes.extend(attitude.encode().unwrap());
    }
    bytes
}

pub fn header_scan(c: &mut Criterion) {
    let bytes = synthetic_file();

    c.bench_function("header_scan", |b| {
        b.iter(|| {
            AllReader::new(Cursor::new(bytes.as_slice()), Default::default())
                .unwrap()
                .count();
        })
    });
}

pub fn full_decode(c: &mut Criterion) {
    let bytes = synthetic_file();

    c.bench_function("full_decode", |b| {
        b.iter(|| {
            let mut reader = AllReader::new(Cursor::new(bytes.as_slice()), Default::default()).unwrap();
            while let Some(handle) = reader.read_next().unwrap() {
                reader.decode(&handle).unwrap();
            }
        })
    });
}

criterion_group!(benches, header_scan, full_decode);
criterion_main!(benches);
