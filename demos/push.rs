use std::time::Duration;

use graphite64::{Counter, GraphiteRegistry, Histogram, Labels, Registry};

/// Push a counter and a latency histogram to a local Graphite every second.
/// Point `GRAPHITE_ADDR` somewhere else to use a real collector.
#[tokio::main]
pub async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let address = std::env::var("GRAPHITE_ADDR").unwrap_or_else(|_| "127.0.0.1:2003".into());
    let registry = GraphiteRegistry::new(address, Duration::from_secs(1))?.with_prefix("graphite64");
    tokio::spawn(graphite64::runtime::export_task(
        registry.clone(),
        Duration::from_secs(1),
    ));

    let counter = registry.counter("demo.ticks", &Labels::from(["test", "value"]));
    let latency = registry.histogram("demo.latency", &Labels::default(), &[0.1, 0.25, 0.5]);
    let mut ticker = tokio::time::interval(Duration::from_millis(500));
    for _ in 0..20 {
        let started = tokio::time::Instant::now();
        ticker.tick().await;
        counter.inc();
        latency.observe_duration(started.elapsed());
    }
    registry.close().await;
    Ok(())
}
