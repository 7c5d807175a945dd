//! Parses a topology configuration text blob into a running set of agents wired to
//! topics (spec §4.7).

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;

use crate::agents::registry;
use crate::agents::wrapper::AsyncAgentWrapper;
use crate::agents::{Agent, AgentHandle};
use crate::topics::TopicRegistry;

/// A parsed (not yet built) logical record: one agent-type symbol plus its ordered
/// input and output topic name lists.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Record {
    type_symbol: String,
    subs: Vec<String>,
    pubs: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("total line count ({0}) is not a multiple of 3")]
    LineCountNotMultipleOfThree(usize),
    #[error("record {record}: unknown agent type {type_symbol:?}")]
    UnknownAgentType { record: usize, type_symbol: String },
    #[error("record {record}: topic name {name:?} contains whitespace")]
    TopicNameContainsWhitespace { record: usize, name: String },
    #[error("record {record}: empty topic name in a non-empty list")]
    EmptyTopicName { record: usize },
    #[error("record {record}: leading or trailing whitespace on a record line")]
    UntrimmedLine { record: usize },
    #[error(
        "record {record}: {type_symbol} expects {expected_subs} subscription(s) and \
         {expected_pubs} publication(s), got {actual_subs} and {actual_pubs}"
    )]
    ArityMismatch {
        record: usize,
        type_symbol: String,
        expected_subs: usize,
        expected_pubs: usize,
        actual_subs: usize,
        actual_pubs: usize,
    },
}

/// One built pipeline entry: the wrapper handle plus the topics it was registered
/// against, kept so `close()` can unwind the registration without the inner agent
/// needing a self-referential handle.
struct PipelineEntry {
    handle: AgentHandle,
    subs: Vec<Arc<crate::topics::Topic>>,
    pubs: Vec<Arc<crate::topics::Topic>>,
}

/// Builds and owns the set of agents produced by one configuration text, and knows how
/// to tear them all down (spec §4.7).
pub struct ConfigLoader {
    registry: Arc<TopicRegistry>,
    inbox_capacity: usize,
    entries: Mutex<Vec<PipelineEntry>>,
}

impl ConfigLoader {
    pub fn new(registry: Arc<TopicRegistry>, inbox_capacity: usize) -> Self {
        Self {
            registry,
            inbox_capacity,
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Parse `text` and build every agent it describes, wiring each to the registry.
    /// On any validation error, no partial state from this call is wired in: every
    /// record's type symbol and arity are checked against the factory registry in a
    /// first pass, before a second pass resolves topics and subscribes anything, so a
    /// later record's `UnknownAgentType`/`ArityMismatch` can never leave an earlier
    /// record's agent live in the registry with no tracked entry to close it.
    pub async fn parse_and_build(&self, text: &str) -> Result<(), ConfigError> {
        let records = parse(text)?;

        let mut resolved = Vec::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            let (expected_subs, expected_pubs) = registry::arity(&record.type_symbol)
                .ok_or_else(|| ConfigError::UnknownAgentType {
                    record: index,
                    type_symbol: record.type_symbol.clone(),
                })?;
            if record.subs.len() != expected_subs || record.pubs.len() != expected_pubs {
                return Err(ConfigError::ArityMismatch {
                    record: index,
                    type_symbol: record.type_symbol,
                    expected_subs,
                    expected_pubs,
                    actual_subs: record.subs.len(),
                    actual_pubs: record.pubs.len(),
                });
            }
            let factory = registry::lookup(&record.type_symbol).expect("checked above");
            resolved.push((factory, record));
        }

        let mut built = Vec::with_capacity(resolved.len());
        for (factory, record) in resolved {
            let inner = factory(record.subs.clone(), record.pubs.clone(), &self.registry);
            let wrapper = AsyncAgentWrapper::new(inner, self.inbox_capacity);
            let handle = AgentHandle::new(wrapper as Arc<dyn Agent>);

            let subs: Vec<_> = record.subs.iter().map(|name| self.registry.get(name)).collect();
            let pubs: Vec<_> = record.pubs.iter().map(|name| self.registry.get(name)).collect();
            for topic in &subs {
                topic.subscribe(handle.clone());
            }
            for topic in &pubs {
                topic.add_publisher(handle.clone());
            }

            built.push(PipelineEntry { handle, subs, pubs });
        }

        *self.entries.lock().await = built;
        Ok(())
    }

    /// Close every retained wrapper concurrently (closing one never depends on
    /// another's state), unregister each from the topics it was wired to, then clear
    /// the retained list.
    pub async fn close(&self) {
        let entries = std::mem::take(&mut *self.entries.lock().await);
        let closes = entries.iter().map(|entry| entry.handle.close());
        futures::future::join_all(closes).await;
        for entry in &entries {
            for topic in &entry.subs {
                topic.unsubscribe(&entry.handle);
            }
            for topic in &entry.pubs {
                topic.remove_publisher(&entry.handle);
            }
        }
    }
}

/// Split `text` into logical three-line records, validating structure and lexical
/// rules but not agent-type/arity (those need the factory registry, checked by the
/// caller).
fn parse(text: &str) -> Result<Vec<Record>, ConfigError> {
    let mut lines: Vec<&str> = text.lines().collect();
    while matches!(lines.last(), Some(line) if line.is_empty()) {
        lines.pop();
    }

    if lines.len() % 3 != 0 {
        return Err(ConfigError::LineCountNotMultipleOfThree(lines.len()));
    }

    let mut records = Vec::with_capacity(lines.len() / 3);
    for (record_index, chunk) in lines.chunks(3).enumerate() {
        let [type_line, subs_line, pubs_line] = chunk else {
            unreachable!("chunks(3) on a length divisible by 3 always yields 3 elements")
        };

        check_trimmed(record_index, type_line)?;
        check_trimmed(record_index, subs_line)?;
        check_trimmed(record_index, pubs_line)?;

        let subs = parse_topic_list(record_index, subs_line)?;
        let pubs = parse_topic_list(record_index, pubs_line)?;

        records.push(Record {
            type_symbol: type_line.to_string(),
            subs,
            pubs,
        });
    }

    Ok(records)
}

fn check_trimmed(record_index: usize, line: &str) -> Result<(), ConfigError> {
    if line != line.trim() {
        return Err(ConfigError::UntrimmedLine { record: record_index });
    }
    Ok(())
}

fn parse_topic_list(record_index: usize, line: &str) -> Result<Vec<String>, ConfigError> {
    if line.is_empty() {
        return Ok(Vec::new());
    }
    line.split(',')
        .map(|name| {
            if name.is_empty() {
                return Err(ConfigError::EmptyTopicName { record: record_index });
            }
            if name != name.trim() || name.chars().any(char::is_whitespace) {
                return Err(ConfigError::TopicNameContainsWhitespace {
                    record: record_index,
                    name: name.to_string(),
                });
            }
            Ok(name.to_string())
        })
        .collect()
}
