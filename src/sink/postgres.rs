//! PostgreSQL-backed sink (§6's relational reference implementation).
//!
//! Grounded in the teacher's `connect_from_config`/`run_migrations` shape
//! (`src/db/mod.rs`): a `deadpool-postgres` pool, schema migrations run once
//! at startup via `refinery`, then plain upserts against a single table.

use async_trait::async_trait;
use deadpool_postgres::{Config as PoolConfig, Pool, Runtime};
use secrecy::ExposeSecret;
use tokio_postgres::NoTls;

use crate::config::SinkConfig;
use crate::error::SinkError;
use crate::sink::Sink;
use crate::types::ExtractedRecord;

refinery::embed_migrations!("migrations");

pub struct PostgresSink {
    pool: Pool,
}

impl PostgresSink {
    pub async fn connect(config: &SinkConfig) -> Result<Self, SinkError> {
        let url = config
            .database_url
            .as_ref()
            .ok_or_else(|| SinkError::Backend("DATABASE_URL not configured".to_string()))?;

        let mut pool_config = PoolConfig::new();
        pool_config.url = Some(url.expose_secret().to_string());
        pool_config.pool = Some(deadpool_postgres::PoolConfig::new(config.pool_size));

        let pool = pool_config
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| SinkError::Backend(e.to_string()))?;

        let mut client = pool.get().await?;
        migrations::runner()
            .run_async(&mut *client)
            .await
            .map_err(|e| SinkError::Backend(e.to_string()))?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl Sink for PostgresSink {
    async fn upsert(&self, record: &ExtractedRecord) -> Result<(), SinkError> {
        let client = self.pool.get().await?;
        let title = record.title.as_deref().unwrap_or("");
        let text = record.text.as_deref().unwrap_or("");
        client
            .execute(
                "INSERT INTO html (hash, filename, mime, title, text)
                 VALUES ($1, $2, $3, $4, $5)
                 ON CONFLICT (hash) DO UPDATE SET
                    filename = EXCLUDED.filename,
                    mime = EXCLUDED.mime,
                    title = EXCLUDED.title,
                    text = EXCLUDED.text",
                &[
                    &record.cid,
                    &record.filename,
                    &record.mime,
                    &title,
                    &text,
                ],
            )
            .await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), SinkError> {
        self.pool.close();
        Ok(())
    }
}
