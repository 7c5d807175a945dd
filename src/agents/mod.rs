//! The agent contract: a processor that consumes messages from topics it subscribes to
//! and produces messages on topics it publishes to.

pub mod arithmetic;
pub mod registry;
pub mod wrapper;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::message::Message;

/// Uniform introspection snapshot consumed by [`crate::graph::GraphProjection`]. Every
/// agent implements this once, replacing per-concrete-type reflection (spec §9 Design
/// Notes: "Type dispatch over agent shape").
#[derive(Debug, Clone, Default)]
pub struct AgentSnapshot {
    /// Last value seen per input topic name, `None` if nothing received yet.
    pub inputs: BTreeMap<String, Option<f64>>,
    /// Last published result, `None` if the agent has never produced output.
    pub output: Option<f64>,
}

/// Spec §4.4. Async to honor the bounded-inbox backpressure contract of
/// [`wrapper::AsyncAgentWrapper`], even though the arithmetic itself is synchronous.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Label for rendering in the graph projection.
    fn name(&self) -> &str;

    /// Clear transient operand state to neutral values; does not disturb subscriptions.
    fn reset(&self);

    /// Consume one message from a topic this agent is subscribed to.
    async fn receive(&self, topic_name: &str, message: Message);

    /// Unsubscribe from all input topics, deregister from all output topics, release
    /// any resources.
    async fn close(&self);

    /// Uniform introspection capability for graph rendering.
    fn snapshot(&self) -> AgentSnapshot;
}

/// A shared, identity-comparable reference to an agent, used as the list element in
/// [`crate::topics::Topic`]'s subscriber/publisher lists. Identity is pointer equality
/// on the underlying `Arc` (spec §4.2: "keyed by agent identity").
#[derive(Clone)]
pub struct AgentHandle(Arc<dyn Agent>);

impl AgentHandle {
    pub fn new(agent: Arc<dyn Agent>) -> Self {
        Self(agent)
    }

    pub fn ptr_eq(&self, other: &AgentHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    #[cfg(test)]
    pub fn new_for_test(agent: Arc<dyn Agent>) -> Self {
        Self(agent)
    }
}

impl std::ops::Deref for AgentHandle {
    type Target = dyn Agent;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}
