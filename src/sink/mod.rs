//! Persistence sink (§6): a key-addressed upsert over extracted records.
//!
//! `Sink` is the same "backend-agnostic trait behind `Arc<dyn ..>`" shape as
//! the teacher's `Database` trait (`src/db/mod.rs`); two implementations
//! exist, selected by `SinkConfig::backend`.

#[cfg(feature = "postgres")]
pub mod postgres;

mod logging;

pub use logging::LoggingSink;
#[cfg(feature = "postgres")]
pub use postgres::PostgresSink;

use async_trait::async_trait;

use crate::error::SinkError;
use crate::types::ExtractedRecord;

/// Persists extracted records, keyed by CID. Non-HTML classified objects are
/// never passed to `upsert` — that gate lives in the worker, not here (§8
/// property 3).
#[async_trait]
pub trait Sink: Send + Sync {
    async fn upsert(&self, record: &ExtractedRecord) -> Result<(), SinkError>;

    async fn close(&self) -> Result<(), SinkError>;
}
