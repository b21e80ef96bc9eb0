//! Interpolation over independently sampled sensor streams

/// A time-sorted table of samples with linear interpolation
///
/// Used to bring one sensor onto the timeline of another, for example
/// external height onto attitude sample times.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    times: Vec<f64>,
    values: Vec<f64>,
}

impl TimeSeries {
    /// Build a series from `(time, value)` pairs in any order
    ///
    /// Pairs with a non-finite time are dropped. Samples that share a time
    /// keep their input order.
    pub fn new<I: IntoIterator<Item = (f64, f64)>>(samples: I) -> Self {
        let mut samples: Vec<(f64, f64)> = samples.into_iter().filter(|(t, _)| t.is_finite()).collect();
        samples.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (times, values) = samples.into_iter().unzip();
        TimeSeries { times, values }
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Whether the series has no samples
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// The samples in time order
    pub fn samples(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.times.iter().copied().zip(self.values.iter().copied())
    }

    /// First and last sample times
    pub fn span(&self) -> Option<(f64, f64)> {
        Some((*self.times.first()?, *self.times.last()?))
    }

    /// The value at `t`
    ///
    /// Linear between the samples either side of `t`. Before the first or
    /// after the last sample the end value is returned rather than
    /// extrapolated. `None` for an empty series.
    pub fn value_at(&self, t: f64) -> Option<f64> {
        let (first, last) = self.span()?;
        if t <= first {
            return self.values.first().copied();
        }
        if t >= last {
            return self.values.last().copied();
        }

        // times[i - 1] < t <= times[i]
        let i = self.times.partition_point(|&x| x < t);
        let (t0, t1) = (self.times[i - 1], self.times[i]);
        let (v0, v1) = (self.values[i - 1], self.values[i]);
        Some(v0 + (v1 - v0) * (t - t0) / (t1 - t0))
    }
}

impl FromIterator<(f64, f64)> for TimeSeries {
    fn from_iter<I: IntoIterator<Item = (f64, f64)>>(iter: I) -> Self {
        TimeSeries::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn interpolates_between_samples() {
        let ts = TimeSeries::new(vec![(1.0, 100.0), (2.0, 200.0), (5.0, 500.0), (10.0, 1000.0)]);
        assert_eq!(ts.value_at(6.0), Some(600.0));
        assert_eq!(ts.value_at(2.0), Some(200.0));
        assert_eq!(ts.value_at(1.5), Some(150.0));
    }

    #[test]
    fn clamps_outside_range() {
        let ts = TimeSeries::new(vec![(1.0, -1.0), (3.0, 1.0)]);
        assert_eq!(ts.value_at(0.0), Some(-1.0));
        assert_eq!(ts.value_at(100.0), Some(1.0));
    }

    #[test]
    fn sorts_on_construction() {
        let ts: TimeSeries = vec![(3.0, 30.0), (1.0, 10.0), (2.0, 20.0)].into_iter().collect();
        assert_eq!(ts.span(), Some((1.0, 3.0)));
        assert_eq!(ts.samples().map(|s| s.1).collect::<Vec<_>>(), vec![10.0, 20.0, 30.0]);
        assert_eq!(ts.value_at(2.5), Some(25.0));
    }

    #[test]
    fn empty_series_has_no_value() {
        let ts = TimeSeries::default();
        assert!(ts.is_empty());
        assert_eq!(ts.value_at(1.0), None);
        let one = TimeSeries::new(vec![(f64::NAN, 1.0), (4.0, 2.0)]);
        assert_eq!(one.len(), 1);
        assert_eq!(one.value_at(-7.0), Some(2.0));
    }

    proptest! {
        #[test]
        fn value_stays_within_sample_range(
            samples in prop::collection::vec((-1e6f64..1e6, -1e3f64..1e3), 1..50),
            t in -2e6f64..2e6,
        ) {
            let lo = samples.iter().map(|s| s.1).fold(f64::INFINITY, f64::min);
            let hi = samples.iter().map(|s| s.1).fold(f64::NEG_INFINITY, f64::max);
            let v = TimeSeries::new(samples).value_at(t).unwrap();
            prop_assert!(v >= lo - 1e-9 && v <= hi + 1e-9);
        }
    }
}
