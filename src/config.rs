use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for a [`GraphiteRegistry`](crate::GraphiteRegistry).
///
/// ```yaml
/// address: graphite.internal:2003
/// interval: 30s
/// timeout: 5s
/// bucket_precision: 3
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphiteConfig {
    /// Collector address as `host:port`.
    pub address: String,
    /// Time between flushes. Zero disables the background flush entirely, in
    /// which case the owner calls `flush_values` itself.
    #[serde(with = "humantime_serde", default = "default_interval")]
    pub interval: Duration,
    /// Deadline for connecting to the collector and writing one batch.
    #[serde(with = "humantime_serde", default = "default_timeout")]
    pub timeout: Duration,
    /// Fractional digits used for histogram bucket bounds in metric keys.
    #[serde(default = "default_bucket_precision")]
    pub bucket_precision: usize,
}

fn default_interval() -> Duration {
    Duration::from_secs(10)
}

fn default_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_bucket_precision() -> usize {
    2
}

impl GraphiteConfig {
    pub fn new(address: impl Into<String>, interval: Duration) -> Self {
        Self {
            address: address.into(),
            interval,
            timeout: default_timeout(),
            bucket_precision: default_bucket_precision(),
        }
    }
}
