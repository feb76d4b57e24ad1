//! A sink that logs records instead of persisting them. Always available
//! (no feature gate), used with `--no-db` and by the engine's own tests —
//! mirroring the teacher CLI's own `--no-db` flag (`src/cli/mod.rs`).

use async_trait::async_trait;

use crate::error::SinkError;
use crate::sink::Sink;
use crate::types::ExtractedRecord;

#[derive(Debug, Default)]
pub struct LoggingSink;

impl LoggingSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Sink for LoggingSink {
    async fn upsert(&self, record: &ExtractedRecord) -> Result<(), SinkError> {
        tracing::info!(
            cid = %record.cid,
            filename = %record.filename,
            mime = %record.mime,
            title = record.title.as_deref().unwrap_or(""),
            "indexed record"
        );
        Ok(())
    }

    async fn close(&self) -> Result<(), SinkError> {
        Ok(())
    }
}
