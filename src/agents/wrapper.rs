//! Wraps a synchronous-computation agent with a bounded FIFO inbox and a dedicated
//! worker task (spec §4.6).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::timeout;

use super::{Agent, AgentSnapshot};
use crate::core::constants::WRAPPER_POLL_INTERVAL_MS;
use crate::message::Message;

/// Wraps `inner` with a bounded `(topic_name, message)` tuple channel. Using a tuple
/// channel — rather than a volatile "current topic" field plus a separate queue — is a
/// deliberate fix of an interleaving race (spec §9 Design Notes: "Inbox-race
/// avoidance").
pub struct AsyncAgentWrapper {
    inner: Arc<dyn Agent>,
    sender: mpsc::Sender<(String, Message)>,
    shutdown: Arc<AtomicBool>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl AsyncAgentWrapper {
    pub fn new(inner: Arc<dyn Agent>, capacity: usize) -> Arc<Self> {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let shutdown = Arc::new(AtomicBool::new(false));

        let worker_inner = inner.clone();
        let worker_shutdown = shutdown.clone();
        let handle = tokio::spawn(Self::worker_loop(worker_inner, receiver, worker_shutdown));

        Arc::new(Self {
            inner,
            sender,
            shutdown,
            worker: Mutex::new(Some(handle)),
        })
    }

    /// Pop one tuple with a timeout; if none, check shutdown and loop; if one, invoke
    /// `inner.receive(topic, message)`; loop.
    async fn worker_loop(
        inner: Arc<dyn Agent>,
        mut receiver: mpsc::Receiver<(String, Message)>,
        shutdown: Arc<AtomicBool>,
    ) {
        let poll_interval = Duration::from_millis(WRAPPER_POLL_INTERVAL_MS);
        loop {
            match timeout(poll_interval, receiver.recv()).await {
                Ok(Some((topic, message))) => inner.receive(&topic, message).await,
                Ok(None) => break,
                Err(_elapsed) => {
                    if shutdown.load(Ordering::Relaxed) {
                        break;
                    }
                }
            }
        }
    }
}

#[async_trait]
impl Agent for AsyncAgentWrapper {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn reset(&self) {
        self.inner.reset();
    }

    /// Enqueues `(topic_name, message)`. If the inbox is full, suspends until space is
    /// free (tokio mpsc backpressure) — there is intentionally no drop policy.
    async fn receive(&self, topic_name: &str, message: Message) {
        let _ = self.sender.send((topic_name.to_string(), message)).await;
    }

    /// Sets the shutdown flag, awaits the worker's `JoinHandle` bounded by a couple of
    /// poll intervals, then closes the inner agent.
    async fn close(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
        let handle = self.worker.lock().await.take();
        if let Some(handle) = handle {
            let bound = Duration::from_millis(WRAPPER_POLL_INTERVAL_MS * 3);
            if timeout(bound, handle).await.is_err() {
                tracing::warn!(agent = %self.inner.name(), "wrapper worker did not exit within grace period");
            }
        }
        self.inner.close().await;
    }

    fn snapshot(&self) -> AgentSnapshot {
        self.inner.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::arithmetic::increment;
    use crate::topics::TopicRegistry;

    #[tokio::test]
    async fn wrapper_delegates_receive_to_inner() {
        let registry = TopicRegistry::new();
        let inner = increment(vec!["a".into()], vec!["b".into()], &registry);
        let wrapper = AsyncAgentWrapper::new(inner, 4);
        wrapper.receive("a", Message::from_text("1")).await;
        // give the worker task a chance to drain the inbox
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(wrapper.snapshot().output, Some(2.0));
    }

    #[tokio::test]
    async fn close_stops_the_worker() {
        let registry = TopicRegistry::new();
        let inner = increment(vec!["a".into()], vec!["b".into()], &registry);
        let wrapper = AsyncAgentWrapper::new(inner, 4);
        wrapper.close().await;
    }

    #[tokio::test]
    async fn full_inbox_applies_backpressure() {
        let registry = TopicRegistry::new();
        let inner = increment(vec!["a".into()], vec!["b".into()], &registry);
        let wrapper = AsyncAgentWrapper::new(inner, 1);
        // Two sends in a row should both eventually complete even with capacity 1,
        // because the worker drains concurrently.
        wrapper.receive("a", Message::from_text("1")).await;
        wrapper.receive("a", Message::from_text("2")).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(wrapper.snapshot().output, Some(3.0));
    }
}
