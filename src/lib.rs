//! Client side metrics that get pushed to Graphite.
//!
//! Metrics are created lazily through a [`Registry`] and are cheap handles that
//! can be cloned and cached by the caller. Recording never blocks and never
//! does I/O. A background task periodically drains the registry into the
//! Graphite plaintext protocol and writes the batch to the collector over TCP.
//!
//! ```no_run
//! use std::time::Duration;
//! use graphite64::{Counter, GraphiteRegistry, Labels, Registry};
//!
//! # async fn run() -> graphite64::Result<()> {
//! let registry = GraphiteRegistry::new("graphite.internal:2003", Duration::from_secs(10))?;
//! let http = registry.with_prefix("myapp").with_prefix("http");
//! // Flushed as `myapp.http.GET.requests <delta> <ts>`
//! http.counter("requests", &Labels::from(["method", "GET"])).inc();
//! registry.close().await;
//! # Ok(())
//! # }
//! ```

mod atomic;
mod collector;
mod config;
pub mod dummy;
mod error;
mod labels;
mod metrics;
mod registry;
pub mod runtime;

pub use atomic::AtomicF64;
pub use collector::StartTs;
pub use config::GraphiteConfig;
pub use dummy::DummyRegistry;
pub use error::{Error, Result};
pub use labels::Labels;
pub use metrics::{
    counter::AtomicCounter, gauge::AtomicGauge, histogram::BucketHistogram, Counter, Gauge,
    Histogram,
};
pub use registry::{GraphiteRegistry, Registry};
