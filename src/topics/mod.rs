//! Named pub/sub channels and the process-wide registry of them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;

use crate::agents::AgentHandle;
use crate::message::Message;

/// A named channel. Subscriber and publisher lists are copy-on-write
/// (`RwLock<Arc<Vec<_>>>`): readers clone the `Arc` under a short-lived read lock and
/// iterate it lock-free; writers clone-modify-swap the whole list (spec §4.2/§5).
pub struct Topic {
    name: String,
    subscribers: RwLock<Arc<Vec<AgentHandle>>>,
    publishers: RwLock<Arc<Vec<AgentHandle>>>,
    last_value_bits: AtomicU64,
    last_value_set: std::sync::atomic::AtomicBool,
}

impl Topic {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            subscribers: RwLock::new(Arc::new(Vec::new())),
            publishers: RwLock::new(Arc::new(Vec::new())),
            last_value_bits: AtomicU64::new(0),
            last_value_set: std::sync::atomic::AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add-if-absent by pointer identity of the wrapper's `Arc`.
    pub fn subscribe(&self, agent: AgentHandle) {
        add_if_absent(&self.subscribers, agent);
    }

    pub fn unsubscribe(&self, agent: &AgentHandle) {
        remove(&self.subscribers, agent);
    }

    pub fn add_publisher(&self, agent: AgentHandle) {
        add_if_absent(&self.publishers, agent);
    }

    pub fn remove_publisher(&self, agent: &AgentHandle) {
        remove(&self.publishers, agent);
    }

    pub fn subscribers(&self) -> Arc<Vec<AgentHandle>> {
        self.subscribers.read().clone()
    }

    pub fn publishers(&self) -> Arc<Vec<AgentHandle>> {
        self.publishers.read().clone()
    }

    /// Deliver `message` to a stable snapshot of the current subscriber list. A
    /// subscribe/unsubscribe triggered transitively by a subscriber's `receive` never
    /// affects this in-flight delivery (spec §4.2).
    pub async fn publish(&self, message: Message) {
        if message.is_numeric() {
            self.last_value_bits
                .store(message.as_number().to_bits(), Ordering::Relaxed);
            self.last_value_set.store(true, Ordering::Relaxed);
        }
        let snapshot = self.subscribers();
        for agent in snapshot.iter() {
            agent.receive(&self.name, message.clone()).await;
        }
    }

    /// Last numeric value seen on this topic, for graph-projection annotation (§4.8).
    pub fn last_value(&self) -> Option<f64> {
        if self.last_value_set.load(Ordering::Relaxed) {
            Some(f64::from_bits(self.last_value_bits.load(Ordering::Relaxed)))
        } else {
            None
        }
    }
}

fn add_if_absent(list: &RwLock<Arc<Vec<AgentHandle>>>, agent: AgentHandle) {
    let mut guard = list.write();
    if guard.iter().any(|a| a.ptr_eq(&agent)) {
        return;
    }
    let mut next = (**guard).clone();
    next.push(agent);
    *guard = Arc::new(next);
}

fn remove(list: &RwLock<Arc<Vec<AgentHandle>>>, agent: &AgentHandle) {
    let mut guard = list.write();
    if !guard.iter().any(|a| a.ptr_eq(agent)) {
        return;
    }
    let next: Vec<AgentHandle> = guard.iter().filter(|a| !a.ptr_eq(agent)).cloned().collect();
    *guard = Arc::new(next);
}

/// Process-wide, get-or-create registry of topics, keyed by name.
#[derive(Default)]
pub struct TopicRegistry {
    topics: DashMap<String, Arc<Topic>>,
    /// Insertion order, so graph projection iterates topics deterministically rather
    /// than in hash order (spec §4.8 "stable result").
    order: RwLock<Vec<String>>,
}

impl TopicRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get-or-create. Atomic under concurrent callers via `DashMap::entry`.
    pub fn get(&self, name: &str) -> Arc<Topic> {
        if let Some(existing) = self.topics.get(name) {
            return existing.clone();
        }
        let topic = self
            .topics
            .entry(name.to_string())
            .or_insert_with(|| {
                self.order.write().push(name.to_string());
                Arc::new(Topic::new(name))
            })
            .clone();
        topic
    }

    /// All topics in insertion order.
    pub fn list(&self) -> Vec<Arc<Topic>> {
        self.order
            .read()
            .iter()
            .filter_map(|name| self.topics.get(name).map(|t| t.clone()))
            .collect()
    }

    /// Drop every mapping. Legal only when no publishers are actively running; callers
    /// (the upload handler) enforce this by serializing behind a mutex (spec §4.3).
    pub fn clear(&self) {
        self.topics.clear();
        self.order.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::arithmetic::Increment;

    fn handle(registry: &TopicRegistry) -> AgentHandle {
        AgentHandle::new_for_test(Increment::new(
            vec!["in".into()],
            vec!["out".into()],
            registry,
        ))
    }

    #[test]
    fn get_is_idempotent_by_name() {
        let registry = TopicRegistry::new();
        let a = registry.get("x");
        let b = registry.get("x");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn subscribe_is_idempotent() {
        let registry = TopicRegistry::new();
        let topic = registry.get("x");
        let h = handle(&registry);
        topic.subscribe(h.clone());
        topic.subscribe(h.clone());
        assert_eq!(topic.subscribers().len(), 1);
    }

    #[test]
    fn unsubscribe_removes_by_identity() {
        let registry = TopicRegistry::new();
        let topic = registry.get("x");
        let h = handle(&registry);
        topic.subscribe(h.clone());
        topic.unsubscribe(&h);
        assert_eq!(topic.subscribers().len(), 0);
    }

    #[test]
    fn list_preserves_insertion_order() {
        let registry = TopicRegistry::new();
        registry.get("b");
        registry.get("a");
        registry.get("c");
        let names: Vec<String> = registry.list().iter().map(|t| t.name().to_string()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn publish_with_no_subscribers_is_a_noop() {
        let registry = TopicRegistry::new();
        let topic = registry.get("x");
        topic.publish(Message::from_text("1")).await;
    }

    #[tokio::test]
    async fn publish_records_last_numeric_value() {
        let registry = TopicRegistry::new();
        let topic = registry.get("x");
        topic.publish(Message::from_text("3.5")).await;
        assert_eq!(topic.last_value(), Some(3.5));
    }
}
