use std::{any::Any, sync::Arc};

use crate::collector::Batch;

use super::{counter::AtomicCounter, Counter};

/// Key suffix for the implicit +inf bucket.
const INF_BUCKET: &str = "inf";

#[derive(Debug)]
struct HistogramInner {
    /// Caller supplied upper bounds, ascending, with a trailing +inf.
    bounds: Box<[f64]>,
    /// Pre-rendered key suffix for each bucket, `0_25` for a bound of 0.25.
    suffixes: Box<[String]>,
    buckets: Box<[AtomicCounter]>,
}

/// A fixed bucket histogram. Every bucket only counts the values it matched
/// directly, so counts are *not* cumulative and each bucket is flushed under
/// its own upper bound.
#[derive(Clone, Debug)]
pub struct BucketHistogram {
    inner: Arc<HistogramInner>,
}

impl BucketHistogram {
    /// Build a histogram over `bounds` plus an implicit +inf bucket. `precision`
    /// is the number of fractional digits used when rendering bounds into keys.
    ///
    /// # Panics
    ///
    /// Panics if `bounds` is not finite and strictly ascending.
    pub(crate) fn new(bounds: &[f64], precision: usize) -> Self {
        assert!(
            bounds.iter().all(|b| b.is_finite()),
            "histogram bounds must be finite: {bounds:?}"
        );
        assert!(
            bounds.windows(2).all(|w| w[0] < w[1]),
            "histogram bounds must be strictly ascending: {bounds:?}"
        );
        let suffixes = bounds
            .iter()
            .map(|bound| format!("{bound:.precision$}").replacen('.', "_", 1))
            .chain(std::iter::once(INF_BUCKET.to_owned()))
            .collect();
        let bounds: Box<[f64]> = bounds
            .iter()
            .copied()
            .chain(std::iter::once(f64::INFINITY))
            .collect();
        let buckets = (0..bounds.len()).map(|_| AtomicCounter::default()).collect();
        Self {
            inner: Arc::new(HistogramInner {
                bounds,
                suffixes,
                buckets,
            }),
        }
    }

    /// The upper bound of every bucket, ending with `f64::INFINITY`.
    pub fn bounds(&self) -> &[f64] {
        &self.inner.bounds
    }

    /// Current per-bucket counts since the last flush, in bound order.
    pub fn counts(&self) -> Vec<f64> {
        self.inner.buckets.iter().map(AtomicCounter::get).collect()
    }

    fn bucket_index(&self, value: f64) -> usize {
        let last = self.inner.buckets.len() - 1;
        // A linear scan is fine, bucket lists are short.
        self.inner.bounds[..last]
            .iter()
            .position(|bound| value < *bound)
            .unwrap_or(last)
    }
}

impl super::Histogram for BucketHistogram {
    fn observe(&self, value: f64) {
        self.inner.buckets[self.bucket_index(value)].inc();
    }
}

impl super::Recordable for BucketHistogram {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn write(&self, batch: &mut Batch, key: &str) {
        for (suffix, bucket) in self.inner.suffixes.iter().zip(self.inner.buckets.iter()) {
            let (value, set) = bucket.reset();
            if set {
                batch.line(&format!("{key}.{suffix}"), value);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use super::BucketHistogram;
    use crate::metrics::Histogram;

    const BOUNDS: [f64; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

    #[test]
    fn bound_values_land_in_next_bucket() {
        let hist = BucketHistogram::new(&BOUNDS, 2);
        for value in [-0.1, 0.0, 0.1, 0.3, 0.4, 0.45, 0.5, 0.55, 0.75, 1.0, 1.1] {
            hist.observe(value);
        }
        assert_eq!(hist.counts(), vec![1.0, 2.0, 3.0, 2.0, 1.0, 2.0]);
    }

    #[test]
    fn terminal_bucket_catches_everything_else() {
        let hist = BucketHistogram::new(&[1.0], 2);
        hist.observe(f64::MAX);
        hist.observe(f64::INFINITY);
        hist.observe(f64::NAN);
        hist.observe(0.5);
        assert_eq!(hist.counts(), vec![1.0, 3.0]);
        assert_eq!(hist.bounds(), &[1.0, f64::INFINITY]);
    }

    #[test]
    fn no_bounds_is_a_single_bucket() {
        let hist = BucketHistogram::new(&[], 2);
        hist.observe(-5.0);
        hist.observe(5.0);
        assert_eq!(hist.counts(), vec![2.0]);
    }

    #[test]
    fn bucket_suffixes() {
        let hist = BucketHistogram::new(&[-0.5, 0.25, 10.0], 2);
        assert_eq!(&*hist.inner.suffixes, &["-0_50", "0_25", "10_00", "inf"]);
        let hist = BucketHistogram::new(&[0.005, 3.0], 3);
        assert_eq!(&*hist.inner.suffixes, &["0_005", "3_000", "inf"]);
        let hist = BucketHistogram::new(&[100.0], 0);
        assert_eq!(&*hist.inner.suffixes, &["100", "inf"]);
    }

    #[test]
    fn observe_duration_uses_seconds() {
        let hist = BucketHistogram::new(&[0.1, 1.0], 2);
        hist.observe_duration(Duration::from_millis(50));
        hist.observe_duration(Duration::from_millis(500));
        hist.observe_duration(Duration::from_secs(2));
        assert_eq!(hist.counts(), vec![1.0, 1.0, 1.0]);
    }

    #[test]
    #[should_panic(expected = "strictly ascending")]
    fn unsorted_bounds_panic() {
        BucketHistogram::new(&[1.0, 0.5], 2);
    }

    #[test]
    #[should_panic(expected = "must be finite")]
    fn infinite_bound_panics() {
        BucketHistogram::new(&[1.0, f64::INFINITY], 2);
    }
}
