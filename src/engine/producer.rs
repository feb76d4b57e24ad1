//! The producer task (§4.5): tails the gateway log and enqueues
//! announcements. Never terminates on its own — only on cancellation.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::gateway::{extract_provider_cid, GatewayClient};
use crate::queue::CrawlQueue;
use crate::types::QueueItem;

pub struct Producer {
    gateway: Arc<GatewayClient>,
    queue: Arc<CrawlQueue<QueueItem>>,
}

impl Producer {
    pub fn new(gateway: Arc<GatewayClient>, queue: Arc<CrawlQueue<QueueItem>>) -> Self {
        Self { gateway, queue }
    }

    /// Runs until `cancel` fires. The underlying log stream reconnects
    /// transparently (handled inside `LogTail`); this loop never sees that
    /// as an error.
    pub async fn run(self, cancel: CancellationToken) {
        let mut tail = self.gateway.log_tail();
        loop {
            let event = match tail.next_value(&cancel).await {
                Some(event) => event,
                None => {
                    tracing::debug!("producer cancelled");
                    return;
                }
            };

            let Some(cid) = extract_provider_cid(&event) else {
                tracing::trace!(?event, "ignored log event");
                continue;
            };

            // The queue's blocking `put` is itself a suspension point (§5):
            // if the queue stays full while every worker has already
            // observed cancellation and stopped draining it, `put` would
            // otherwise never return and `stop` would hang.
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!("producer cancelled while enqueuing");
                    return;
                }
                _ = self.queue.put(QueueItem::root(cid)) => {}
            }
        }
    }
}
