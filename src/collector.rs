use std::{
    fmt::Write as _,
    time::{Duration, Instant, SystemTime, UNIX_EPOCH},
};

use tokio::{
    io::AsyncWriteExt,
    net::TcpStream,
    runtime::Handle,
    sync::oneshot,
    task::JoinHandle,
    time::MissedTickBehavior,
};

use crate::{
    error::{Error, Result},
    registry::GraphiteRegistry,
};

/// Instead of using a non-monotonic system time call for every flush we use a
/// base timestamp and a monotonic offset. Clock steps after process start
/// therefore can't make timestamps go backwards.
/// NOTE: This doesn't handle the case where our clock is skewed from the start.
#[derive(Copy, Clone, Debug)]
pub struct StartTs {
    instant: Instant,
    unix: Duration,
}

impl StartTs {
    pub fn new() -> Self {
        Self {
            instant: Instant::now(),
            unix: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default(),
        }
    }

    pub fn now(&self) -> SystemTime {
        UNIX_EPOCH + self.unix + self.instant.elapsed()
    }
}

impl Default for StartTs {
    fn default() -> Self {
        Self::new()
    }
}

/// One flush worth of Graphite plaintext lines:
/// `<key> <value> <unix seconds>\n`.
pub(crate) struct Batch {
    buf: String,
    timestamp: u64,
    lines: usize,
}

impl Batch {
    pub(crate) fn new(now: SystemTime) -> Self {
        Self {
            buf: String::new(),
            timestamp: now
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default(),
            lines: 0,
        }
    }

    /// Non-finite values are written as Rust formats them (`inf`, `-inf`,
    /// `NaN`), which carbon's float parser accepts.
    pub(crate) fn line(&mut self, key: &str, value: f64) {
        let _ = writeln!(self.buf, "{key} {value:.9} {}", self.timestamp);
        self.lines += 1;
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.lines == 0
    }

    pub(crate) fn lines(&self) -> usize {
        self.lines
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.buf.as_bytes()
    }
}

/// Open a fresh connection to `address`, write `payload` and close it again.
/// The whole exchange is bounded by `timeout`.
pub(crate) async fn send(address: &str, timeout: Duration, payload: &[u8]) -> Result<()> {
    let deliver = async {
        let mut stream = TcpStream::connect(address)
            .await
            .map_err(|source| Error::Connect {
                address: address.to_owned(),
                source,
            })?;
        let write = async {
            stream.write_all(payload).await?;
            stream.shutdown().await
        };
        write.await.map_err(|source| Error::Write {
            address: address.to_owned(),
            source,
        })
    };
    match tokio::time::timeout(timeout, deliver).await {
        Ok(res) => res,
        Err(_) => Err(Error::Timeout {
            address: address.to_owned(),
            timeout,
        }),
    }
}

/// Handle to the background flush loop of a registry.
pub(crate) struct FlushTask {
    stop: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl FlushTask {
    /// Spawn the flush loop onto `runtime`. The first flush happens one full
    /// `interval` after spawning.
    pub(crate) fn spawn(runtime: &Handle, registry: GraphiteRegistry, interval: Duration) -> Self {
        let (stop, stopped) = oneshot::channel();
        let handle = runtime.spawn(run(registry, interval, stopped));
        Self { stop, handle }
    }

    /// Ask the loop to exit and wait for it. A flush already in progress is
    /// allowed to finish.
    pub(crate) async fn stop(self) {
        // The loop only goes away early if it panicked, which the join reports.
        let _ = self.stop.send(());
        if let Err(e) = self.handle.await {
            tracing::error!(message = "flush task exited abnormally", error = %e);
        }
    }
}

async fn run(registry: GraphiteRegistry, interval: Duration, mut stopped: oneshot::Receiver<()>) {
    let clock = StartTs::new();
    let mut ticker =
        tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tracing::debug!(message = "flush loop started", address = %registry.address(), ?interval);
    loop {
        tokio::select! {
            _ = &mut stopped => break,
            _ = ticker.tick() => {
                if let Err(e) = registry.flush_values(clock.now()).await {
                    tracing::error!(message = "failed to flush metrics", error = %e);
                }
            }
        }
    }
    tracing::debug!(message = "flush loop stopped", address = %registry.address());
}
