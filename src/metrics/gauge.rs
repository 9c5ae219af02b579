use std::{any::Any, sync::Arc};

use crate::{atomic::AtomicF64, collector::Batch};

/// A gauge is never reset by a flush. Every flush reports whatever the gauge
/// currently holds, including zero.
#[derive(Clone, Debug, Default)]
pub struct AtomicGauge {
    inner: Arc<AtomicF64>,
}

impl AtomicGauge {
    pub fn get(&self) -> f64 {
        self.inner.get()
    }

    pub(crate) fn reset(&self) -> (f64, bool) {
        (self.inner.get(), true)
    }
}

impl super::Gauge for AtomicGauge {
    fn set(&self, value: f64) {
        self.inner.set(value);
    }

    fn add(&self, delta: f64) {
        self.inner.add(delta);
    }
}

impl super::Recordable for AtomicGauge {
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
