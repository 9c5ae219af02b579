use std::{any::Any, sync::Arc};

use crate::{atomic::AtomicF64, collector::Batch};

/// A simple delta counter used to record the rate of actions happening. The
/// value of the counter is reset when flushed, thus we always report the delta
/// between flushes.
#[derive(Clone, Debug, Default)]
pub struct AtomicCounter {
    inner: Arc<AtomicF64>,
}

impl AtomicCounter {
    /// The value accumulated since the last reset.
    pub fn get(&self) -> f64 {
        self.inner.get()
    }

    /// Swap the counter back to zero. Returns the previous value and whether it
    /// was non-zero, since idle counters are left out of a flush.
    pub(crate) fn reset(&self) -> (f64, bool) {
        let value = self.inner.swap(0.0);
        (value, value != 0.0)
    }
}

impl super::Counter for AtomicCounter {
    fn add(&self, delta: f64) {
        self.inner.add(delta);
    }
}

impl super::Recordable for AtomicCounter {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn write(&self, batch: &mut Batch, key: &str) {
        let (value, set) = self.reset();
        if set {
            batch.line(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AtomicCounter;
    use crate::metrics::Counter;

    #[test]
    fn reset_returns_accumulated_sum() {
        let counter = AtomicCounter::default();
        for delta in [1.0, 2.5, 0.5, 6.0] {
            counter.add(delta);
        }
        counter.inc();
        assert_eq!(counter.reset(), (11.0, true));
        assert_eq!(counter.get(), 0.0);
        assert_eq!(counter.reset(), (0.0, false));
    }

    #[test]
    fn clones_share_state() {
        let counter = AtomicCounter::default();
        let clone = counter.clone();
        counter.inc();
        clone.inc();
        assert_eq!(counter.get(), 2.0);
    }
}
