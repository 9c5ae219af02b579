//! Simple tokio runtime metrics. Spawn [`export_task`] next to your registry to
//! get a few useful gauges for free.

use std::time::Duration;

use crate::{labels::Labels, metrics::Gauge, registry::Registry};

pub const TOKIO_ALIVE_TASKS: &str = "tokio.tasks";
pub const TOKIO_WORKERS: &str = "tokio.workers";
pub const TOKIO_GLOBAL_QUEUE_DEPTH: &str = "tokio.global_queue_depth";

/// Update the tokio runtime gauges every `period`, forever. Must run inside
/// the runtime being measured.
pub async fn export_task<R: Registry>(registry: R, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    let alive_tasks = registry.gauge(TOKIO_ALIVE_TASKS, &Labels::from(["state", "alive"]));
    let workers = registry.gauge(TOKIO_WORKERS, &Labels::default());
    let queue_depth = registry.gauge(TOKIO_GLOBAL_QUEUE_DEPTH, &Labels::default());
    loop {
        ticker.tick().await;
        let metrics = tokio::runtime::Handle::current().metrics();
        alive_tasks.set(metrics.num_alive_tasks() as f64);
        workers.set(metrics.num_workers() as f64);
        queue_depth.set(metrics.global_queue_depth() as f64);
    }
}
