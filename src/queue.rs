//! Bounded hand-off queue (§4.5's critical directory-expansion policy).
//!
//! Exposes two distinct enqueue paths on purpose, per the design notes
//! ("a queue abstraction that exposes both a bounded `put`... and a separate
//! `offerUnbounded`... documented in the type"):
//!
//! - [`CrawlQueue::put`] blocks until there is room and is the producer's
//!   only enqueue path — this is where system-wide backpressure (§5) lives.
//! - [`CrawlQueue::offer`] never blocks on capacity and is the *only* path a
//!   worker may use to enqueue a directory's children. Using `put` there can
//!   deadlock: if the queue is full and every worker is blocked in this same
//!   step, no one is left to drain it.
//!
//! Grounded in the same lock-guarded-state-plus-explicit-wait/notify shape
//! the teacher uses for container lifecycle coordination in
//! `src/sidecar/manager.rs`, applied here to a FIFO buffer instead of a
//! state enum.

use std::collections::VecDeque;

use tokio::sync::{Mutex, Notify};

pub struct CrawlQueue<T> {
    capacity: usize,
    inner: Mutex<VecDeque<T>>,
    not_full: Notify,
    not_empty: Notify,
}

impl<T> CrawlQueue<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(VecDeque::new()),
            not_full: Notify::new(),
            not_empty: Notify::new(),
        }
    }

    /// Blocking enqueue: waits until the queue has room (Invariant 2),
    /// providing backpressure against the whole pipeline (§5).
    pub async fn put(&self, item: T) {
        loop {
            {
                let mut guard = self.inner.lock().await;
                if guard.len() < self.capacity {
                    guard.push_back(item);
                    self.not_empty.notify_one();
                    return;
                }
            }
            self.not_full.notified().await;
        }
    }

    /// Non-blocking enqueue that bypasses the capacity bound entirely.
    /// Reserved for enqueuing a directory's children (§4.5) — never call
    /// this from the producer.
    pub async fn offer(&self, item: T) {
        let mut guard = self.inner.lock().await;
        guard.push_back(item);
        self.not_empty.notify_one();
    }

    /// Blocking dequeue: waits until an item is available.
    pub async fn get(&self) -> T {
        loop {
            {
                let mut guard = self.inner.lock().await;
                if let Some(item) = guard.pop_front() {
                    self.not_full.notify_one();
                    return item;
                }
            }
            self.not_empty.notified().await;
        }
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let queue = CrawlQueue::new(2);
        queue.put(1).await;
        queue.put(2).await;
        assert_eq!(queue.get().await, 1);
        assert_eq!(queue.get().await, 2);
    }

    #[tokio::test]
    async fn put_blocks_at_capacity_until_a_get_frees_room() {
        let queue = Arc::new(CrawlQueue::new(1));
        queue.put("a").await;

        let queue2 = Arc::clone(&queue);
        let blocked = tokio::spawn(async move {
            queue2.put("b").await;
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!blocked.is_finished());

        assert_eq!(queue.get().await, "a");
        blocked.await.unwrap();
        assert_eq!(queue.get().await, "b");
    }

    #[tokio::test]
    async fn offer_bypasses_capacity() {
        let queue = CrawlQueue::new(1);
        queue.put(1).await;
        // Queue is already at capacity; offer must not block.
        for n in 2..=5 {
            queue.offer(n).await;
        }
        assert_eq!(queue.len().await, 5);
        for expected in 1..=5 {
            assert_eq!(queue.get().await, expected);
        }
    }
}
