use std::{any::Any, time::Duration};

use crate::collector::Batch;

pub(crate) mod counter;
pub(crate) mod gauge;
pub(crate) mod histogram;

/// A delta counter. Implementations never block and never fail.
pub trait Counter: Clone + Send + Sync + 'static {
    fn add(&self, delta: f64);

    fn inc(&self) {
        self.add(1.0);
    }
}

/// A point in time value.
pub trait Gauge: Clone + Send + Sync + 'static {
    fn set(&self, value: f64);

    fn add(&self, delta: f64);

    fn inc(&self) {
        self.add(1.0);
    }

    fn dec(&self) {
        self.add(-1.0);
    }

    fn sub(&self, delta: f64) {
        self.add(-delta);
    }
}

/// A distribution of observed values, bucketed by upper bound.
pub trait Histogram: Clone + Send + Sync + 'static {
    fn observe(&self, value: f64);

    /// Observe a duration as fractional seconds.
    fn observe_duration(&self, value: Duration) {
        self.observe(value.as_secs_f64());
    }
}

/// The internal half of a metric, used by the registry to store type-erased
/// metrics and by the collector to drain them on every flush.
pub(crate) trait Recordable: Send + Sync + 'static {
    /// Lets the registry get back from `dyn Recordable` to the concrete handle the
    /// caller asked for.
    fn as_any(&self) -> &dyn Any;

    /// Append this metric's lines to `batch`, resetting whatever state should not
    /// carry over to the next flush.
    fn write(&self, batch: &mut Batch, key: &str);
}
