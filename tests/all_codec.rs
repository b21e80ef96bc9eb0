mod common;

use common::*;
use proptest::prelude::*;
use sonarcond::parser::all::{
    verify_checksum, Attitude, AttitudeEntry, Clock, Datagram, Depth, DepthBeam,
    ExtraParameters, Heading, HeadingEntry, Height, Installation, NetworkAttitude,
    NetworkAttitudeEntry, Position, RangeAngle, Runtime, RxBeam, SeabedBeam, SeabedImage,
    SoundSpeedEntry, SoundSpeedProfile, Stamp, TxSector, Xyz, XyzBeam,
};

fn stamps() -> impl Strategy<Value = Stamp> {
    (0.0f64..86_400.0).prop_map(|t| stamp((t * 1000.0).round() / 1000.0))
}

fn real() -> impl Strategy<Value = f32> {
    -1.0e6f32..1.0e6f32
}

fn installation() -> impl Strategy<Value = Installation> {
    (stamps(), any::<u16>(), "[ -~]{0,80}").prop_map(|(stamp, survey_line, text)| Installation {
        stamp,
        survey_line,
        serial: SERIAL,
        secondary_serial: 0,
        text,
    })
}

fn extra() -> impl Strategy<Value = Datagram> {
    (stamps(), any::<u16>(), prop::collection::vec(1u8..=255, 0..60)).prop_map(
        |(stamp, content_identifier, content)| {
            Datagram::ExtraParameters(ExtraParameters {
                stamp,
                serial: SERIAL,
                content_identifier,
                content,
                ..Default::default()
            })
        },
    )
}

fn attitude() -> impl Strategy<Value = Datagram> {
    let entry = (any::<u16>(), any::<u16>(), any::<i16>(), any::<i16>(), any::<i16>(), any::<u16>())
        .prop_map(|(time_offset, status, roll, pitch, heave, heading)| AttitudeEntry {
            time_offset,
            status,
            roll,
            pitch,
            heave,
            heading,
        });
    (stamps(), prop::collection::vec(entry, 0..30), any::<u8>()).prop_map(
        |(stamp, entries, system_descriptor)| {
            Datagram::Attitude(Attitude {
                stamp,
                serial: SERIAL,
                entries,
                system_descriptor,
                ..Default::default()
            })
        },
    )
}

fn network_attitude() -> impl Strategy<Value = Datagram> {
    let entry = (
        any::<u16>(),
        any::<i16>(),
        any::<i16>(),
        any::<i16>(),
        any::<u16>(),
        prop::collection::vec(any::<u8>(), 0..40),
    )
        .prop_map(|(time_offset, roll, pitch, heave, heading, telegram)| NetworkAttitudeEntry {
            time_offset,
            roll,
            pitch,
            heave,
            heading,
            telegram,
        });
    (stamps(), prop::collection::vec(entry, 0..8), any::<i8>()).prop_map(
        |(stamp, entries, system_descriptor)| {
            Datagram::NetworkAttitude(NetworkAttitude {
                stamp,
                serial: SERIAL,
                entries,
                system_descriptor,
                ..Default::default()
            })
        },
    )
}

fn heading_and_height() -> impl Strategy<Value = Datagram> {
    let entries = prop::collection::vec((any::<u16>(), any::<u16>()), 0..30);
    prop_oneof![
        (stamps(), entries, any::<u8>()).prop_map(|(stamp, e, heading_indicator)| {
            Datagram::Heading(Heading {
                stamp,
                serial: SERIAL,
                entries: e
                    .into_iter()
                    .map(|(time_offset, heading)| HeadingEntry { time_offset, heading })
                    .collect(),
                heading_indicator,
                ..Default::default()
            })
        }),
        (stamps(), any::<i32>(), any::<u8>()).prop_map(|(stamp, height, height_type)| {
            Datagram::Height(Height {
                stamp,
                serial: SERIAL,
                height,
                height_type,
                ..Default::default()
            })
        }),
    ]
}

fn position() -> impl Strategy<Value = Datagram> {
    (
        stamps(),
        any::<i32>(),
        any::<i32>(),
        any::<u16>(),
        any::<u8>(),
        prop::collection::vec(any::<u8>(), 0..=255),
    )
        .prop_map(|(stamp, latitude, longitude, heading, descriptor, input)| {
            Datagram::Position(Position {
                stamp,
                serial: SERIAL,
                latitude,
                longitude,
                heading,
                descriptor,
                input,
                ..Default::default()
            })
        })
}

fn clock_and_runtime() -> impl Strategy<Value = Datagram> {
    prop_oneof![
        (stamps(), any::<u32>(), any::<u32>(), 0u8..2).prop_map(
            |(stamp, external_date, external_time, pps)| Datagram::Clock(Clock {
                stamp,
                serial: SERIAL,
                external_date,
                external_time,
                pps,
                ..Default::default()
            })
        ),
        (stamps(), any::<u8>(), any::<u16>(), any::<u16>(), any::<i8>(), any::<i16>()).prop_map(
            |(stamp, mode, minimum_depth, maximum_depth, transmit_power, transmit_along_tilt)| {
                Datagram::Runtime(Runtime {
                    stamp,
                    serial: SERIAL,
                    mode,
                    minimum_depth,
                    maximum_depth,
                    transmit_power,
                    transmit_along_tilt,
                    ..Default::default()
                })
            }
        ),
    ]
}

fn sound_speed() -> impl Strategy<Value = Datagram> {
    let entries = prop::collection::vec((any::<u32>(), any::<u32>()), 0..50);
    (stamps(), any::<u32>(), any::<u32>(), 1u16..100, entries).prop_map(
        |(stamp, profile_date, profile_time, depth_resolution, e)| {
            Datagram::SoundSpeedProfile(SoundSpeedProfile {
                stamp,
                serial: SERIAL,
                profile_date,
                profile_time,
                depth_resolution,
                entries: e
                    .into_iter()
                    .map(|(depth, sound_speed)| SoundSpeedEntry { depth, sound_speed })
                    .collect(),
                ..Default::default()
            })
        },
    )
}

fn depth() -> impl Strategy<Value = Datagram> {
    let beam = (any::<u16>(), any::<i16>(), any::<i16>(), any::<u16>(), any::<u8>(), any::<i8>())
        .prop_map(
            |(depth, across_track, along_track, range, quality_factor, reflectivity)| DepthBeam {
                depth,
                across_track,
                along_track,
                range,
                quality_factor,
                reflectivity,
                ..Default::default()
            },
        );
    (stamps(), any::<u16>(), prop::collection::vec(beam, 0..=255), any::<i8>()).prop_map(
        |(stamp, heading, beams, range_multiplier)| {
            Datagram::Depth(Depth {
                stamp,
                serial: SERIAL,
                heading,
                max_beams: 255,
                beams,
                range_multiplier,
                ..Default::default()
            })
        },
    )
}

fn xyz() -> impl Strategy<Value = Datagram> {
    let beam = (real(), real(), real(), any::<u16>(), any::<u8>(), any::<i16>()).prop_map(
        |(depth, across_track, along_track, detection_window, quality_factor, reflectivity)| {
            XyzBeam {
                depth,
                across_track,
                along_track,
                detection_window,
                quality_factor,
                reflectivity,
                ..Default::default()
            }
        },
    );
    (stamps(), real(), real(), any::<u8>(), prop::collection::vec(beam, 0..60)).prop_map(
        |(stamp, transducer_depth, sampling_frequency, scanning_info, beams)| {
            Datagram::Xyz(Xyz {
                stamp,
                serial: SERIAL,
                transducer_depth,
                valid_detections: beams.len() as u16,
                sampling_frequency,
                scanning_info,
                beams,
                ..Default::default()
            })
        },
    )
}

fn range_angle() -> impl Strategy<Value = Datagram> {
    let sector = (any::<i16>(), real(), real(), real(), any::<u8>(), real()).prop_map(
        |(tilt_angle, signal_length, transmit_delay, centre_frequency, sector_number, bandwidth)| {
            TxSector {
                tilt_angle,
                signal_length,
                transmit_delay,
                centre_frequency,
                sector_number,
                bandwidth,
                ..Default::default()
            }
        },
    );
    let beam = (any::<i16>(), any::<u8>(), any::<u8>(), real(), any::<i16>()).prop_map(
        |(pointing_angle, sector, quality_factor, travel_time, reflectivity)| RxBeam {
            pointing_angle,
            sector,
            quality_factor,
            travel_time,
            reflectivity,
            ..Default::default()
        },
    );
    (
        stamps(),
        real(),
        prop::collection::vec(sector, 0..4),
        prop::collection::vec(beam, 0..60),
    )
        .prop_map(|(stamp, sampling_frequency, sectors, beams)| {
            Datagram::RangeAngle(RangeAngle {
                stamp,
                serial: SERIAL,
                sampling_frequency,
                sectors,
                beams,
                ..Default::default()
            })
        })
}

fn seabed() -> impl Strategy<Value = Datagram> {
    let beam = (any::<i8>(), 0u16..6, any::<u16>()).prop_map(
        |(sorting_direction, sample_count, centre_sample)| SeabedBeam {
            sorting_direction,
            sample_count,
            centre_sample,
            ..Default::default()
        },
    );
    (stamps(), real(), prop::collection::vec(beam, 0..20))
        .prop_flat_map(|(stamp, sampling_frequency, beams)| {
            let n = beams.iter().map(|b| usize::from(b.sample_count)).sum::<usize>();
            (
                Just((stamp, sampling_frequency, beams)),
                prop::collection::vec(any::<i16>(), n),
            )
        })
        .prop_map(|((stamp, sampling_frequency, beams), samples)| {
            Datagram::SeabedImage(SeabedImage {
                stamp,
                serial: SERIAL,
                sampling_frequency,
                beams,
                samples,
                ..Default::default()
            })
        })
}

fn datagram() -> impl Strategy<Value = Datagram> {
    prop_oneof![
        extra(),
        attitude(),
        network_attitude(),
        heading_and_height(),
        position(),
        clock_and_runtime(),
        sound_speed(),
        depth(),
        xyz(),
        range_angle(),
        seabed(),
        installation().prop_map(Datagram::InstallationStart),
        installation().prop_map(Datagram::InstallationStop),
    ]
}

proptest! {
    #[test]
    fn every_kind_round_trips(d in datagram()) {
        let bytes = d.encode().unwrap();
        let length = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);

        prop_assert_eq!(length as usize + 4, bytes.len());
        prop_assert_eq!(bytes[5], d.tag());
        prop_assert_eq!(*bytes.iter().rev().nth(2).unwrap(), 0x03);
        prop_assert!(verify_checksum(&bytes));
        prop_assert_eq!(Datagram::decode(&bytes).unwrap(), d);
    }

    #[test]
    fn every_kind_survives_a_stream(datagrams in prop::collection::vec(datagram(), 1..10)) {
        let bytes = encode_all(&datagrams);
        let decoded: Vec<Datagram> = walk(&bytes)
            .into_iter()
            .map(|raw| Datagram::decode(raw).unwrap())
            .collect();
        prop_assert_eq!(decoded, datagrams);
    }
}
