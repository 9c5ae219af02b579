use std::{io, time::Duration};

use thiserror::Error;

/// Errors surfaced by registry construction and explicit flushes. Metric
/// operations themselves never fail.
#[derive(Debug, Error)]
pub enum Error {
    /// The collector address could not be understood as `host:port`.
    #[error("invalid collector address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: &'static str },

    #[error("failed to connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to write metrics to {address}: {source}")]
    Write {
        address: String,
        #[source]
        source: io::Error,
    },

    /// A periodic flush was requested outside of a tokio runtime.
    #[error("a non-zero flush interval requires a tokio runtime")]
    NoRuntime,

    /// Connecting and writing the batch took longer than the configured deadline.
    #[error("delivery to {address} timed out after {timeout:?}")]
    Timeout { address: String, timeout: Duration },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Check that `address` looks like `host:port`. Name resolution is deferred to
/// flush time, so this only catches malformed configuration.
pub(crate) fn validate_address(address: &str) -> Result<()> {
    let invalid = |reason| Error::InvalidAddress {
        address: address.to_owned(),
        reason,
    };
    let (host, port) = address.rsplit_once(':').ok_or_else(|| invalid("missing port"))?;
    if host.is_empty() || host == "[]" {
        return Err(invalid("missing host"));
    }
    match port.parse::<u16>() {
        Ok(0) => Err(invalid("port must not be zero")),
        Ok(_) => Ok(()),
        Err(_) => Err(invalid("port is not a number")),
    }
}
