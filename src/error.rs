//! Crate-wide error taxonomy.
//!
//! Each fallible boundary (§4.1 gateway client, config resolution, dedup
//! snapshotting, sink persistence) gets its own `thiserror` enum; `CrawlError`
//! is the top-level error a worker, producer, or the supervisor can surface.

use thiserror::Error;

/// Errors from calls against the content gateway (`ls`, `cat`, `log/tail`).
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The gateway reported the requested CID is a directory, not a file.
    /// Expected signal, not a bug — never logged as an error (§7).
    #[error("{0} is a directory")]
    IsDirectory(String),

    /// The gateway returned a non-200 response with a structured error body
    /// other than the directory sentinel.
    #[error("gateway error: {0}")]
    Gateway(String),

    /// The request exceeded its configured timeout.
    #[error("request timed out")]
    Timeout,

    /// A network-layer failure (connection reset, DNS, TLS, ...).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The gateway's error body, or a stacked-JSON frame, didn't parse.
    #[error("failed to decode gateway response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl GatewayError {
    /// Classify a `reqwest::Error` into the taxonomy's `Timeout`/`Transport` split.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout
        } else {
            GatewayError::Transport(err)
        }
    }
}

/// Errors resolving configuration from environment/file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration '{key}': {hint}")]
    MissingRequired { key: String, hint: String },

    #[error("invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Errors snapshotting/restoring the dedup filter.
#[derive(Debug, Error)]
pub enum DedupError {
    #[error("failed to read snapshot at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to (de)serialize snapshot: {0}")]
    Codec(#[from] Box<bincode::ErrorKind>),
}

/// Errors from the persistence sink.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("sink backend error: {0}")]
    Backend(String),

    #[error("sink I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(feature = "postgres")]
impl From<tokio_postgres::Error> for SinkError {
    fn from(err: tokio_postgres::Error) -> Self {
        SinkError::Backend(err.to_string())
    }
}

#[cfg(feature = "postgres")]
impl From<deadpool_postgres::PoolError> for SinkError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        SinkError::Backend(err.to_string())
    }
}

#[cfg(feature = "postgres")]
impl From<refinery::Error> for SinkError {
    fn from(err: refinery::Error) -> Self {
        SinkError::Backend(err.to_string())
    }
}

/// Top-level error a worker or producer task can return from its run loop.
///
/// Cancellation is deliberately not a variant here: it's observed via
/// `CancellationToken` at suspension points and causes the task to return
/// `Ok(())` early, per §5 ("the cancellation signal is distinguished from
/// application errors and is NOT logged as a failure").
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Dedup(#[from] DedupError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error("worker task panicked or was aborted: {0}")]
    Join(#[from] tokio::task::JoinError),
}
