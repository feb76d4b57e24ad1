//! A single worker (§4.5): dequeue, classify, extract, persist — or expand
//! a directory's children — with the error policy from §7.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::classify::classify;
use crate::dedup::BloomSeenSet;
use crate::error::{CrawlError, GatewayError};
use crate::extract::extract;
use crate::gateway::GatewayClient;
use crate::queue::CrawlQueue;
use crate::sink::Sink;
use crate::types::{ExtractedRecord, QueueItem};

/// Prefix length fetched to decide a CID's MIME type (§4.5 step 4).
const HEAD_LENGTH: u64 = 128;

pub struct Worker {
    pub id: usize,
    gateway: Arc<GatewayClient>,
    queue: Arc<CrawlQueue<QueueItem>>,
    dedup: Arc<BloomSeenSet>,
    sink: Arc<dyn Sink>,
}

impl Worker {
    pub fn new(
        id: usize,
        gateway: Arc<GatewayClient>,
        queue: Arc<CrawlQueue<QueueItem>>,
        dedup: Arc<BloomSeenSet>,
        sink: Arc<dyn Sink>,
    ) -> Self {
        Self {
            id,
            gateway,
            queue,
            dedup,
            sink,
        }
    }

    /// Runs until cancelled, or until an unexpected error terminates this
    /// worker (§7: "supervisor considers a single worker exit non-fatal").
    pub async fn run(self, cancel: CancellationToken) -> Result<(), CrawlError> {
        loop {
            let item = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!(worker = self.id, "worker cancelled");
                    return Ok(());
                }
                item = self.queue.get() => item,
            };

            // Invariant 1: add(cid) happens before any fetch is issued.
            if self.dedup.check_and_insert(&item.cid) {
                tracing::debug!(worker = self.id, cid = %item.cid, "already seen, skipping");
                continue;
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!(worker = self.id, "worker cancelled mid-item");
                    return Ok(());
                }
                result = self.process(&item) => {
                    if let Err(fatal) = result {
                        tracing::error!(worker = self.id, cid = %item.cid, error = %fatal, "worker exiting on unexpected error");
                        return Err(fatal);
                    }
                }
            }
        }
    }

    /// Processes one item. Returns `Ok(())` for every *expected* outcome
    /// (timeout, gateway error, directory expansion, non-HTML skip) per §7 —
    /// only a genuinely unexpected error propagates and terminates the
    /// worker.
    async fn process(&self, item: &QueueItem) -> Result<(), CrawlError> {
        let head = match self.gateway.cat(&item.cid, 0, Some(HEAD_LENGTH)).await {
            Ok(bytes) => bytes,
            Err(GatewayError::IsDirectory(_)) => {
                self.expand_directory(item).await;
                return Ok(());
            }
            Err(GatewayError::Timeout) => {
                tracing::warn!(cid = %item.cid, "timed out fetching head, dropping");
                return Ok(());
            }
            Err(GatewayError::Gateway(message)) => {
                tracing::warn!(cid = %item.cid, message, "gateway error fetching head, dropping");
                return Ok(());
            }
            Err(err @ GatewayError::Transport(_)) => {
                tracing::warn!(cid = %item.cid, error = %err, "transport error fetching head, dropping");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        let mime = classify(&head);
        if mime != "text/html" {
            tracing::debug!(cid = %item.cid, mime, "non-HTML, not persisted");
            return Ok(());
        }

        let body = match self.gateway.cat(&item.cid, 0, None).await {
            Ok(bytes) => bytes,
            Err(GatewayError::Timeout) => {
                tracing::warn!(cid = %item.cid, "timed out fetching body, dropping");
                return Ok(());
            }
            Err(GatewayError::Gateway(message)) => {
                tracing::warn!(cid = %item.cid, message, "gateway error fetching body, dropping");
                return Ok(());
            }
            Err(GatewayError::IsDirectory(_)) => {
                // Became a directory between head and body fetch is not a
                // real gateway behavior, but stay total rather than panic.
                return Ok(());
            }
            Err(err @ GatewayError::Transport(_)) => {
                tracing::warn!(cid = %item.cid, error = %err, "transport error fetching body, dropping");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        // HTML parsing is synchronous CPU-bound work; offload it so a large
        // page can't stall sibling workers on a non-preemptive scheduler (§5).
        let body_owned = body.to_vec();
        let extracted = tokio::task::spawn_blocking(move || extract(&body_owned))
            .await
            .map_err(CrawlError::Join)?;

        let record = ExtractedRecord {
            cid: item.cid.clone(),
            filename: item.filename.clone(),
            mime,
            title: Some(extracted.title),
            text: Some(extracted.text),
        };

        if let Err(err) = self.sink.upsert(&record).await {
            tracing::warn!(cid = %item.cid, error = %err, "sink upsert failed, dropping");
        }

        Ok(())
    }

    /// Enqueues a directory's direct children non-blockingly (§4.5's
    /// critical policy): using the blocking `put` here can deadlock if the
    /// queue is full and every worker reaches this step at once.
    async fn expand_directory(&self, item: &QueueItem) {
        let links = match self.gateway.ls(&item.cid).await {
            Ok(links) => links,
            Err(GatewayError::Timeout) => {
                tracing::warn!(cid = %item.cid, "timed out listing directory, dropping");
                return;
            }
            Err(GatewayError::Gateway(message)) => {
                tracing::warn!(cid = %item.cid, message, "gateway error listing directory, dropping");
                return;
            }
            Err(err) => {
                tracing::warn!(cid = %item.cid, error = %err, "failed to list directory, dropping");
                return;
            }
        };

        for link in links {
            self.queue
                .offer(QueueItem::child(link.hash, link.name))
                .await;
        }
    }
}
