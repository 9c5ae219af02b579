use parking_lot::{Mutex, RwLock};
use std::{
    collections::{hash_map::Entry, HashMap},
    hash::BuildHasherDefault,
    sync::{
        atomic::{self, AtomicBool},
        Arc,
    },
    time::{Instant, SystemTime},
};
use twox_hash::XxHash64;

use crate::{
    collector::{self, Batch, FlushTask},
    config::GraphiteConfig,
    error::{self, Result},
    labels::Labels,
    metrics::{
        counter::AtomicCounter, gauge::AtomicGauge, histogram::BucketHistogram, Counter, Gauge,
        Histogram, Recordable,
    },
};

/// The set of operations every metrics backend provides. Instrumented code
/// takes an `R: Registry` and never needs to know whether metrics are actually
/// going anywhere.
pub trait Registry: Clone + Send + Sync + 'static {
    type Counter: Counter;
    type Gauge: Gauge;
    type Histogram: Histogram;

    /// A view of this registry with `name` appended to the prefix of every
    /// metric created through it.
    fn with_prefix(&self, name: &str) -> Self;

    fn counter(&self, name: &str, labels: &Labels) -> Self::Counter;

    fn gauge(&self, name: &str, labels: &Labels) -> Self::Gauge;

    /// Get or create a histogram. `bounds` are the finite bucket upper bounds in
    /// ascending order and only matter the first time a key is seen.
    fn histogram(&self, name: &str, labels: &Labels, bounds: &[f64]) -> Self::Histogram;
}

/// Join two dotted path segments, skipping the separator when either side is
/// empty.
pub(crate) fn join_prefix(prefix: &str, name: &str) -> String {
    match (prefix.is_empty(), name.is_empty()) {
        (true, _) => name.to_owned(),
        (false, true) => prefix.to_owned(),
        (false, false) => format!("{prefix}.{name}"),
    }
}

/// Build the Graphite path of a metric: `[prefix.][label values.]name`.
pub(crate) fn metric_key(prefix: &str, name: &str, labels: &Labels) -> String {
    let path = join_prefix(prefix, &labels.path(".", "_"));
    join_prefix(&path, name)
}

type MetricMap = HashMap<String, Box<dyn Recordable>, BuildHasherDefault<XxHash64>>;

/// Every live metric of one registry, keyed by its full Graphite path.
#[derive(Default)]
struct MetricStore {
    metrics: RwLock<MetricMap>,
}

impl MetricStore {
    /// Fetch the metric stored under `key`, creating it with `create` on first
    /// use. The common case only takes the read lock; creation takes the write
    /// lock and checks again in case another thread got there first.
    ///
    /// # Panics
    ///
    /// Panics if `key` already holds a metric of a different kind.
    fn get_or_register<R, F>(&self, key: String, create: F) -> R
    where
        R: Recordable + Clone,
        F: FnOnce() -> R,
    {
        if let Some(metric) = self.metrics.read().get(&key) {
            return downcast(metric.as_ref(), &key);
        }
        let mut metrics = self.metrics.write();
        match metrics.entry(key) {
            Entry::Occupied(entry) => downcast(entry.get().as_ref(), entry.key()),
            Entry::Vacant(entry) => {
                let metric = create();
                entry.insert(Box::new(metric.clone()));
                metric
            }
        }
    }

    /// Write every metric into `batch`. Only holds the read lock, so producers
    /// registering new metrics wait at most for one pass over the map.
    fn collect(&self, batch: &mut Batch) {
        let metrics = self.metrics.read();
        for (key, metric) in metrics.iter() {
            metric.write(batch, key);
        }
    }

    fn len(&self) -> usize {
        self.metrics.read().len()
    }
}

fn downcast<R: Recordable + Clone>(metric: &dyn Recordable, key: &str) -> R {
    match metric.as_any().downcast_ref::<R>() {
        Some(metric) => metric.clone(),
        None => panic!(
            "metric {key:?} is already registered as a different kind than {}",
            std::any::type_name::<R>()
        ),
    }
}

struct Shared {
    config: GraphiteConfig,
    store: MetricStore,
    flush_task: Mutex<Option<FlushTask>>,
    closed: AtomicBool,
}

/// A registry that pushes its metrics to a Graphite collector using the
/// plaintext line protocol.
///
/// Counters and histogram buckets report the delta since the previous flush
/// and are skipped while idle. Gauges report their current value on every
/// flush.
///
/// Registries are cheap to clone and every clone, as well as every
/// [`with_prefix`](Registry::with_prefix) view, shares the same metrics and
/// flush loop. When the flush interval is non-zero the loop keeps the registry
/// alive, so [`close`](GraphiteRegistry::close) must be called to shut it down.
#[derive(Clone)]
pub struct GraphiteRegistry {
    prefix: String,
    shared: Arc<Shared>,
}

impl GraphiteRegistry {
    /// Create a registry flushing to `address` every `interval`. See
    /// [`GraphiteRegistry::with_config`].
    pub fn new(address: impl Into<String>, interval: std::time::Duration) -> Result<Self> {
        Self::with_config(GraphiteConfig::new(address, interval))
    }

    /// Create a registry from `config`. A non-zero interval spawns the flush
    /// loop, which requires being called from within a tokio runtime;
    /// otherwise this returns [`Error::NoRuntime`](crate::Error::NoRuntime).
    pub fn with_config(config: GraphiteConfig) -> Result<Self> {
        error::validate_address(&config.address)?;
        let interval = config.interval;
        let runtime = if interval.is_zero() {
            None
        } else {
            Some(tokio::runtime::Handle::try_current().map_err(|_| error::Error::NoRuntime)?)
        };
        let registry = Self {
            prefix: String::new(),
            shared: Arc::new(Shared {
                config,
                store: MetricStore::default(),
                flush_task: Mutex::new(None),
                closed: AtomicBool::new(false),
            }),
        };
        if let Some(runtime) = runtime {
            let task = FlushTask::spawn(&runtime, registry.clone(), interval);
            *registry.shared.flush_task.lock() = Some(task);
        }
        Ok(registry)
    }

    pub fn address(&self) -> &str {
        &self.shared.config.address
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Number of registered metric keys across all views.
    pub fn len(&self) -> usize {
        self.shared.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drain every metric into one batch stamped with `now` and write it to the
    /// collector. Returns the number of lines sent. Nothing is sent when no
    /// metric has anything to report.
    ///
    /// Counters are reset while the batch is built, so a failed delivery drops
    /// that interval's deltas.
    pub async fn flush_values(&self, now: SystemTime) -> Result<usize> {
        let started = Instant::now();
        let mut batch = Batch::new(now);
        self.shared.store.collect(&mut batch);
        if batch.is_empty() {
            tracing::trace!(message = "nothing to flush");
            return Ok(0);
        }
        let config = &self.shared.config;
        collector::send(&config.address, config.timeout, batch.as_bytes()).await?;
        tracing::debug!(
            message = "flushed metrics",
            lines = batch.lines(),
            bytes = batch.as_bytes().len(),
            duration = ?started.elapsed()
        );
        Ok(batch.lines())
    }

    /// Stop the flush loop and flush one final time, so whatever was recorded
    /// since the last tick is not lost. Only the first call does anything.
    pub async fn close(&self) {
        if self.shared.closed.swap(true, atomic::Ordering::AcqRel) {
            return;
        }
        let task = self.shared.flush_task.lock().take();
        if let Some(task) = task {
            task.stop().await;
        }
        if let Err(e) = self.flush_values(SystemTime::now()).await {
            tracing::error!(message = "failed to flush metrics on close", error = %e);
        }
    }
}

impl Registry for GraphiteRegistry {
    type Counter = AtomicCounter;
    type Gauge = AtomicGauge;
    type Histogram = BucketHistogram;

    fn with_prefix(&self, name: &str) -> Self {
        Self {
            prefix: join_prefix(&self.prefix, name),
            shared: self.shared.clone(),
        }
    }

    fn counter(&self, name: &str, labels: &Labels) -> AtomicCounter {
        let key = metric_key(&self.prefix, name, labels);
        self.shared.store.get_or_register(key, AtomicCounter::default)
    }

    fn gauge(&self, name: &str, labels: &Labels) -> AtomicGauge {
        let key = metric_key(&self.prefix, name, labels);
        self.shared.store.get_or_register(key, AtomicGauge::default)
    }

    fn histogram(&self, name: &str, labels: &Labels, bounds: &[f64]) -> BucketHistogram {
        let key = metric_key(&self.prefix, name, labels);
        let precision = self.shared.config.bucket_precision;
        self.shared
            .store
            .get_or_register(key, || BucketHistogram::new(bounds, precision))
    }
}

impl std::fmt::Debug for GraphiteRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphiteRegistry")
            .field("address", &self.shared.config.address)
            .field("prefix", &self.prefix)
            .field("metrics", &self.len())
            .finish()
    }
}
