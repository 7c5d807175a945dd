//! Concrete arithmetic operators (spec §4.5).
//!
//! Operand state lives in `AtomicU64` (bit-cast `f64`) plus an `AtomicBool` "is set"
//! flag rather than behind a `Mutex`: the wrapper's invariant guarantees `receive` runs
//! on exactly one task at a time, so there is never write contention, only the need for
//! `GraphProjection` on another task to read a consistent, never-torn value
//! (`Ordering::Relaxed` — spec §5 "acceptable because a stale-but-not-torn value is all
//! the contract requires").

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use super::{Agent, AgentSnapshot};
use crate::message::Message;
use crate::topics::{Topic, TopicRegistry};

struct AtomicOperand {
    bits: AtomicU64,
    is_set: AtomicBool,
}

impl AtomicOperand {
    fn new() -> Self {
        Self {
            bits: AtomicU64::new(0),
            is_set: AtomicBool::new(false),
        }
    }

    fn set(&self, value: f64) {
        self.bits.store(value.to_bits(), Ordering::Relaxed);
        self.is_set.store(true, Ordering::Relaxed);
    }

    fn get(&self) -> Option<f64> {
        if self.is_set.load(Ordering::Relaxed) {
            Some(f64::from_bits(self.bits.load(Ordering::Relaxed)))
        } else {
            None
        }
    }

    fn reset_to(&self, value: f64) {
        self.set(value);
    }

    fn clear(&self) {
        self.is_set.store(false, Ordering::Relaxed);
        self.bits.store(0, Ordering::Relaxed);
    }
}

/// A unary arithmetic operator: one input, one output.
pub struct UnaryAgent {
    label: String,
    op: fn(f64) -> f64,
    input: String,
    output_topic: Arc<Topic>,
    operand: AtomicOperand,
    result: AtomicOperand,
}

impl UnaryAgent {
    fn build(
        op_name: &str,
        op: fn(f64) -> f64,
        subs: Vec<String>,
        pubs: Vec<String>,
        registry: &TopicRegistry,
    ) -> Arc<dyn Agent> {
        let output_name = pubs[0].clone();
        let output_topic = registry.get(&output_name);
        Arc::new(Self {
            label: format!("{op_name}[{}→{}]", subs[0], output_name),
            op,
            input: subs[0].clone(),
            output_topic,
            operand: AtomicOperand::new(),
            result: AtomicOperand::new(),
        })
    }
}

#[async_trait]
impl Agent for UnaryAgent {
    fn name(&self) -> &str {
        &self.label
    }

    fn reset(&self) {
        self.operand.clear();
        self.result.clear();
    }

    async fn receive(&self, topic_name: &str, message: Message) {
        if topic_name != self.input || !message.is_numeric() {
            return;
        }
        let x = message.as_number();
        self.operand.set(x);
        let y = (self.op)(x);
        self.result.set(y);
        self.output_topic.publish(Message::from_number(y)).await;
    }

    /// No internal resources to release; topic subscribe/unsubscribe bookkeeping is
    /// owned by `ConfigLoader`, which is the party that performed the registration
    /// (see `config_loader` module docs).
    async fn close(&self) {}

    fn snapshot(&self) -> AgentSnapshot {
        let mut inputs = std::collections::BTreeMap::new();
        inputs.insert(self.input.clone(), self.operand.get());
        AgentSnapshot {
            inputs,
            output: self.result.get(),
        }
    }
}

/// A binary arithmetic operator: two inputs, one output. Waits for both slots to be
/// set before publishing (spec §9 Open Questions resolution).
pub struct BinaryAgent {
    label: String,
    op: fn(f64, f64) -> f64,
    input0: String,
    input1: String,
    output_topic: Arc<Topic>,
    slot0: AtomicOperand,
    slot1: AtomicOperand,
    result: AtomicOperand,
}

impl BinaryAgent {
    fn build(
        op_name: &str,
        op: fn(f64, f64) -> f64,
        subs: Vec<String>,
        pubs: Vec<String>,
        registry: &TopicRegistry,
    ) -> Arc<dyn Agent> {
        let output_name = pubs[0].clone();
        let output_topic = registry.get(&output_name);
        Arc::new(Self {
            label: format!("{op_name}[{},{}→{}]", subs[0], subs[1], output_name),
            op,
            input0: subs[0].clone(),
            input1: subs[1].clone(),
            output_topic,
            slot0: AtomicOperand::new(),
            slot1: AtomicOperand::new(),
            result: AtomicOperand::new(),
        })
    }
}

#[async_trait]
impl Agent for BinaryAgent {
    fn name(&self) -> &str {
        &self.label
    }

    /// Sets both slots to `0.0` *and marks them as set*: a reset agent behaves as
    /// though it had already received `0` on both inputs, so a single subsequent input
    /// immediately produces a result (spec §9 Open Questions resolution).
    fn reset(&self) {
        self.slot0.reset_to(0.0);
        self.slot1.reset_to(0.0);
        self.result.clear();
    }

    async fn receive(&self, topic_name: &str, message: Message) {
        if !message.is_numeric() {
            return;
        }
        let x = message.as_number();
        if topic_name == self.input0 {
            self.slot0.set(x);
        } else if topic_name == self.input1 {
            self.slot1.set(x);
        } else {
            return;
        }

        if let (Some(a), Some(b)) = (self.slot0.get(), self.slot1.get()) {
            let y = (self.op)(a, b);
            self.result.set(y);
            self.output_topic.publish(Message::from_number(y)).await;
        }
    }

    async fn close(&self) {}

    fn snapshot(&self) -> AgentSnapshot {
        let mut inputs = std::collections::BTreeMap::new();
        inputs.insert(self.input0.clone(), self.slot0.get());
        inputs.insert(self.input1.clone(), self.slot1.get());
        AgentSnapshot {
            inputs,
            output: self.result.get(),
        }
    }
}

pub fn increment(subs: Vec<String>, pubs: Vec<String>, registry: &TopicRegistry) -> Arc<dyn Agent> {
    UnaryAgent::build("Increment", |x| x + 1.0, subs, pubs, registry)
}
pub fn decrement(subs: Vec<String>, pubs: Vec<String>, registry: &TopicRegistry) -> Arc<dyn Agent> {
    UnaryAgent::build("Decrement", |x| x - 1.0, subs, pubs, registry)
}
pub fn negate(subs: Vec<String>, pubs: Vec<String>, registry: &TopicRegistry) -> Arc<dyn Agent> {
    UnaryAgent::build("Negate", |x| -x, subs, pubs, registry)
}
pub fn absolute(subs: Vec<String>, pubs: Vec<String>, registry: &TopicRegistry) -> Arc<dyn Agent> {
    UnaryAgent::build("Absolute", |x| x.abs(), subs, pubs, registry)
}
pub fn double(subs: Vec<String>, pubs: Vec<String>, registry: &TopicRegistry) -> Arc<dyn Agent> {
    UnaryAgent::build("Double", |x| x * 2.0, subs, pubs, registry)
}

pub fn plus(subs: Vec<String>, pubs: Vec<String>, registry: &TopicRegistry) -> Arc<dyn Agent> {
    BinaryAgent::build("Plus", |a, b| a + b, subs, pubs, registry)
}
pub fn minus(subs: Vec<String>, pubs: Vec<String>, registry: &TopicRegistry) -> Arc<dyn Agent> {
    BinaryAgent::build("Minus", |a, b| a - b, subs, pubs, registry)
}
pub fn multiply(subs: Vec<String>, pubs: Vec<String>, registry: &TopicRegistry) -> Arc<dyn Agent> {
    BinaryAgent::build("Multiply", |a, b| a * b, subs, pubs, registry)
}
pub fn max(subs: Vec<String>, pubs: Vec<String>, registry: &TopicRegistry) -> Arc<dyn Agent> {
    BinaryAgent::build("Max", f64::max, subs, pubs, registry)
}
pub fn min(subs: Vec<String>, pubs: Vec<String>, registry: &TopicRegistry) -> Arc<dyn Agent> {
    BinaryAgent::build("Min", f64::min, subs, pubs, registry)
}
pub fn average(subs: Vec<String>, pubs: Vec<String>, registry: &TopicRegistry) -> Arc<dyn Agent> {
    BinaryAgent::build("Average", |a, b| (a + b) / 2.0, subs, pubs, registry)
}

/// Test-only convenience constructor used by `crate::topics` unit tests.
#[cfg(test)]
pub struct Increment;
#[cfg(test)]
impl Increment {
    pub fn new(subs: Vec<String>, pubs: Vec<String>, registry: &TopicRegistry) -> Arc<dyn Agent> {
        increment(subs, pubs, registry)
    }
}
