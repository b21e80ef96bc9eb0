//! Seabed image datagrams
use super::{body, counted, Padding, Stamp};
use binrw::binrw;

/// Seabed image 89 (`Y`)
///
/// Backscatter samples for all beams are stored back to back after the
/// beam table; each beam records how many of them it owns.
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeabedImage {
    #[brw(ignore)]
    pub stamp: Stamp,
    pub counter: u16,
    pub serial: u16,
    pub sampling_frequency: f32,
    pub range_to_normal_incidence: u16,
    pub normal_incidence_bs: i16,
    pub oblique_bs: i16,
    pub tx_beamwidth: u16,
    pub tvg_crossover: u16,
    #[br(temp)]
    #[bw(try_calc = u16::try_from(beams.len()))]
    beam_count: u16,
    #[br(parse_with = counted, args(beam_count as usize))]
    pub beams: Vec<SeabedBeam>,
    #[br(parse_with = counted, args(beams.iter().map(|b| usize::from(b.sample_count)).sum::<usize>()))]
    pub samples: Vec<i16>,
}
body!(SeabedImage, Padding::Always);

/// One beam of a [`SeabedImage`] datagram
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeabedBeam {
    pub sorting_direction: i8,
    pub detection_info: u8,
    pub sample_count: u16,
    pub centre_sample: u16,
}

impl SeabedImage {
    /// The samples of each beam
    ///
    /// Beams whose samples run past the end of the sample array get what
    /// is left.
    pub fn beam_samples(&self) -> Vec<&[i16]> {
        let mut start = 0;
        self.beams
            .iter()
            .map(|b| {
                let from = start.min(self.samples.len());
                let to = (start + usize::from(b.sample_count)).min(self.samples.len());
                start += usize::from(b.sample_count);
                &self.samples[from..to]
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::all::Datagram;
    use crate::Error;

    fn image() -> SeabedImage {
        SeabedImage {
            counter: 9,
            beams: vec![
                SeabedBeam {
                    sample_count: 2,
                    ..Default::default()
                },
                SeabedBeam {
                    sample_count: 3,
                    ..Default::default()
                },
            ],
            samples: vec![-1, -2, -3, -4, -5],
            ..Default::default()
        }
    }

    #[test]
    fn samples_belong_to_beams() {
        let y = image();
        assert_eq!(y.beam_samples(), vec![&[-1i16, -2][..], &[-3, -4, -5][..]]);
        let bytes = Datagram::SeabedImage(y.clone()).encode().unwrap();
        assert_eq!(bytes.len(), 36 + 12 + 10 + 1 + 3);
        assert_eq!(Datagram::decode(&bytes).unwrap(), Datagram::SeabedImage(y));
    }

    #[test]
    fn sample_count_beyond_record_is_truncated() {
        let mut y = image();
        y.beams[1].sample_count = 300;
        let bytes = Datagram::SeabedImage(y).encode().unwrap();
        assert!(matches!(
            Datagram::decode(&bytes),
            Err(Error::TruncatedPayload { declared: 604, .. })
        ));
    }
}
