//! A registry that aggregates nothing. Handy for tests and for running
//! instrumented code where no collector is configured.

use std::sync::Arc;

use crate::{
    labels::Labels,
    metrics::{Counter, Gauge, Histogram},
    registry::{join_prefix, Registry},
};

#[derive(Debug)]
struct DummyMetric {
    name: String,
    labels: Labels,
    log: bool,
}

impl DummyMetric {
    fn record(&self, kind: &'static str, op: &'static str, value: f64) {
        if self.log {
            tracing::info!(
                target: "graphite64::dummy",
                metric = %self.name,
                labels = ?self.labels.map(),
                kind,
                op,
                value
            );
        }
    }
}

macro_rules! dummy_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            inner: Arc<DummyMetric>,
        }

        impl $name {
            /// Full name of the metric, including the registry prefix.
            pub fn name(&self) -> &str {
                &self.inner.name
            }

            pub fn labels(&self) -> &Labels {
                &self.inner.labels
            }
        }
    };
}

dummy_handle!(
    /// Counter handed out by [`DummyRegistry`].
    DummyCounter
);
dummy_handle!(
    /// Gauge handed out by [`DummyRegistry`].
    DummyGauge
);
dummy_handle!(
    /// Histogram handed out by [`DummyRegistry`].
    DummyHistogram
);

impl Counter for DummyCounter {
    fn add(&self, delta: f64) {
        self.inner.record("counter", "add", delta);
    }

    fn inc(&self) {
        self.inner.record("counter", "inc", 1.0);
    }
}

impl Gauge for DummyGauge {
    fn set(&self, value: f64) {
        self.inner.record("gauge", "set", value);
    }

    fn add(&self, delta: f64) {
        self.inner.record("gauge", "add", delta);
    }

    fn inc(&self) {
        self.inner.record("gauge", "inc", 1.0);
    }

    fn dec(&self) {
        self.inner.record("gauge", "dec", 1.0);
    }

    fn sub(&self, delta: f64) {
        self.inner.record("gauge", "sub", delta);
    }
}

impl Histogram for DummyHistogram {
    fn observe(&self, value: f64) {
        self.inner.record("histogram", "observe", value);
    }
}

/// A registry with the same interface as
/// [`GraphiteRegistry`](crate::GraphiteRegistry) that only (optionally) logs
/// each operation.
#[derive(Debug, Clone, Default)]
pub struct DummyRegistry {
    prefix: String,
    log: bool,
}

impl DummyRegistry {
    /// When `log` is set every metric operation is emitted as a tracing event.
    pub fn new(log: bool) -> Self {
        Self {
            prefix: String::new(),
            log,
        }
    }

    fn metric(&self, name: &str, labels: &Labels) -> Arc<DummyMetric> {
        Arc::new(DummyMetric {
            name: join_prefix(&self.prefix, name),
            labels: labels.clone(),
            log: self.log,
        })
    }
}

impl Registry for DummyRegistry {
    type Counter = DummyCounter;
    type Gauge = DummyGauge;
    type Histogram = DummyHistogram;

    fn with_prefix(&self, name: &str) -> Self {
        Self {
            prefix: join_prefix(&self.prefix, name),
            log: self.log,
        }
    }

    fn counter(&self, name: &str, labels: &Labels) -> DummyCounter {
        DummyCounter {
            inner: self.metric(name, labels),
        }
    }

    fn gauge(&self, name: &str, labels: &Labels) -> DummyGauge {
        DummyGauge {
            inner: self.metric(name, labels),
        }
    }

    fn histogram(&self, name: &str, labels: &Labels, _bounds: &[f64]) -> DummyHistogram {
        DummyHistogram {
            inner: self.metric(name, labels),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_follow_prefix() {
        let registry = DummyRegistry::new(false).with_prefix("a").with_prefix("b");
        assert_eq!(registry.counter("c", &Labels::default()).name(), "a.b.c");
        let gauge = registry.gauge("g", &Labels::from(["k", "v"]));
        assert_eq!(gauge.name(), "a.b.g");
        assert_eq!(gauge.labels().keys(), vec!["k"]);
    }

    #[test]
    fn logging_operations_do_not_panic() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let registry = DummyRegistry::new(true).with_prefix("svc");
        let labels = Labels::from(["method", "GET"]);
        let counter = registry.counter("requests", &labels);
        counter.inc();
        counter.add(2.0);
        let gauge = registry.gauge("depth", &labels);
        gauge.set(1.0);
        gauge.inc();
        gauge.dec();
        gauge.add(3.0);
        gauge.sub(1.0);
        registry
            .histogram("latency", &labels, &[0.1, 1.0])
            .observe(0.5);
    }
}
