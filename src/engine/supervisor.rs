//! The supervisor (§4.5): starts, joins, and shuts down the crawl engine.
//!
//! Owns the lifetimes of the producer and worker pool, the way the teacher's
//! explicit-dependency-injection style constructs collaborators and hands
//! them to the component that uses them (Design Notes: "the supervisor
//! constructs A-D and hands each collaborator to the crawl engine by
//! reference").

use std::sync::Arc;
use std::time::Duration;

use futures::future::select_all;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::{Config, SinkBackend};
use crate::dedup::BloomSeenSet;
use crate::engine::producer::Producer;
use crate::engine::worker::Worker;
use crate::error::CrawlError;
use crate::gateway::GatewayClient;
use crate::queue::CrawlQueue;
use crate::sink::{LoggingSink, Sink};
use crate::types::QueueItem;

#[cfg(feature = "postgres")]
use crate::sink::PostgresSink;

pub struct Supervisor {
    config: Config,
    dedup: Arc<BloomSeenSet>,
    gateway: Arc<GatewayClient>,
    queue: Arc<CrawlQueue<QueueItem>>,
    sink: Arc<dyn Sink>,
    cancel: CancellationToken,
    handles: Vec<JoinHandle<Result<(), CrawlError>>>,
}

impl Supervisor {
    /// Restores the dedup filter, opens the gateway client and sink.
    pub async fn build(config: Config) -> Result<Self, CrawlError> {
        let dedup = Arc::new(BloomSeenSet::restore(
            &config.dedup.path,
            config.dedup.initial_capacity,
        )?);

        let gateway = Arc::new(GatewayClient::new(
            &config.gateway,
            Duration::from_secs(config.request_timeout_secs),
        )?);

        let queue = Arc::new(CrawlQueue::new(config.queue.capacity));

        let sink: Arc<dyn Sink> = match config.sink.backend {
            #[cfg(feature = "postgres")]
            SinkBackend::Postgres => Arc::new(PostgresSink::connect(&config.sink).await?),
            #[cfg(not(feature = "postgres"))]
            SinkBackend::Postgres => {
                return Err(CrawlError::Sink(crate::error::SinkError::Backend(
                    "postgres sink requested but the 'postgres' feature is disabled".to_string(),
                )));
            }
            SinkBackend::Logging => Arc::new(LoggingSink::new()),
        };

        Ok(Self {
            config,
            dedup,
            gateway,
            queue,
            sink,
            cancel: CancellationToken::new(),
            handles: Vec::new(),
        })
    }

    /// Spawns the producer and the worker pool.
    pub fn spawn(&mut self) {
        let producer = Producer::new(Arc::clone(&self.gateway), Arc::clone(&self.queue));
        let cancel = self.cancel.clone();
        self.handles.push(tokio::spawn(async move {
            producer.run(cancel).await;
            Ok(())
        }));

        for id in 0..self.config.workers {
            let worker = Worker::new(
                id,
                Arc::clone(&self.gateway),
                Arc::clone(&self.queue),
                Arc::clone(&self.dedup),
                Arc::clone(&self.sink),
            );
            let cancel = self.cancel.clone();
            self.handles.push(tokio::spawn(worker.run(cancel)));
        }

        tracing::info!(workers = self.config.workers, "started crawling");
    }

    /// A token callers can use to trigger cancellation without waiting for
    /// `run_until_signal`'s own `SIGINT` handling (e.g. from a test).
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Runs until `SIGINT` or until a spawned task exits unexpectedly
    /// (an exit that isn't itself a response to cancellation), then stops.
    pub async fn run_until_signal(mut self) -> Result<(), CrawlError> {
        let outcome = tokio::select! {
            biased;
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("received interrupt, shutting down");
                Ok(())
            }
            result = Self::join_any(&mut self.handles) => result,
        };

        self.stop().await?;
        outcome
    }

    /// Waits for the first task to exit and reports whether that exit was a
    /// failure. Cancellation never races this method (it only runs before
    /// `cancel` fires), so any completion here is unexpected.
    async fn join_any(handles: &mut Vec<JoinHandle<Result<(), CrawlError>>>) -> Result<(), CrawlError> {
        let owned = std::mem::take(handles);
        let (result, _index, remaining) = select_all(owned).await;
        *handles = remaining;
        match result {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(err),
            Err(join_err) => Err(CrawlError::Join(join_err)),
        }
    }

    /// Cancels producer and workers, joins everything (treating cancellation
    /// as success), closes the gateway/sink, and snapshots the dedup filter.
    pub async fn stop(mut self) -> Result<(), CrawlError> {
        self.cancel.cancel();

        for handle in self.handles.drain(..) {
            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => tracing::error!(error = %err, "task exited with error during shutdown"),
                Err(join_err) => tracing::error!(error = %join_err, "task panicked during shutdown"),
            }
        }

        if let Err(err) = self.sink.close().await {
            tracing::warn!(error = %err, "sink close failed");
        }

        self.dedup.snapshot(&self.config.dedup.path)?;
        tracing::info!("exited");
        Ok(())
    }
}
