//! Transient, renderable snapshot of the topic/agent topology (spec §4.8).

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::agents::AgentHandle;
use crate::topics::TopicRegistry;

#[derive(Debug, Clone, Serialize)]
pub struct TopicNode {
    pub id: String,
    pub name: String,
    pub last_value: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentNode {
    pub id: String,
    pub name: String,
    pub last_value: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

/// `TopicNode → AgentNode` for every subscription; `AgentNode → TopicNode` for every
/// publication. Cycle detection runs three-color DFS over the combined node set.
#[derive(Debug, Clone, Serialize)]
pub struct GraphProjection {
    pub topics: Vec<TopicNode>,
    pub agents: Vec<AgentNode>,
    pub edges: Vec<Edge>,
    pub is_cyclic: bool,
}

impl GraphProjection {
    /// Build a projection of `registry`'s current state. Topics are iterated in
    /// registry insertion order (not hash order) so cycle detection and node ordering
    /// are deterministic given the input graph (spec §4.8 "stable result").
    pub fn build(registry: &TopicRegistry) -> Self {
        let topics = registry.list();

        let mut topic_nodes = Vec::with_capacity(topics.len());
        let mut agent_nodes: Vec<AgentNode> = Vec::new();
        let mut edges = Vec::new();
        let mut seen_agent_ids: HashSet<String> = HashSet::new();

        for topic in &topics {
            let topic_id = format!("topic:{}", topic.name());
            topic_nodes.push(TopicNode {
                id: topic_id.clone(),
                name: topic.name().to_string(),
                last_value: topic.last_value(),
            });

            for subscriber in topic.subscribers().iter() {
                let agent_id = register_agent(subscriber, &mut seen_agent_ids, &mut agent_nodes);
                edges.push(Edge {
                    from: topic_id.clone(),
                    to: agent_id,
                });
            }
            for publisher in topic.publishers().iter() {
                let agent_id = register_agent(publisher, &mut seen_agent_ids, &mut agent_nodes);
                edges.push(Edge {
                    from: agent_id,
                    to: topic_id.clone(),
                });
            }
        }

        let is_cyclic = detect_cycle(&topic_nodes, &agent_nodes, &edges);

        Self {
            topics: topic_nodes,
            agents: agent_nodes,
            edges,
            is_cyclic,
        }
    }
}

fn agent_node_id(handle: &AgentHandle) -> String {
    format!("agent:{:p}", &**handle)
}

fn register_agent(
    handle: &AgentHandle,
    seen: &mut HashSet<String>,
    agent_nodes: &mut Vec<AgentNode>,
) -> String {
    let id = agent_node_id(handle);
    if seen.insert(id.clone()) {
        let snapshot = handle.snapshot();
        agent_nodes.push(AgentNode {
            id: id.clone(),
            name: handle.name().to_string(),
            last_value: snapshot.output,
        });
    }
    id
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Three-color DFS: returns true iff any back edge (an edge into a gray node) exists
/// in any component.
fn detect_cycle<'a>(topic_nodes: &'a [TopicNode], agent_nodes: &'a [AgentNode], edges: &'a [Edge]) -> bool {
    let mut adjacency: HashMap<&'a str, Vec<&'a str>> = HashMap::new();
    for edge in edges {
        adjacency.entry(edge.from.as_str()).or_default().push(edge.to.as_str());
    }

    let all_ids: Vec<&'a str> = topic_nodes
        .iter()
        .map(|n| n.id.as_str())
        .chain(agent_nodes.iter().map(|n| n.id.as_str()))
        .collect();

    let mut color: HashMap<&'a str, Color> = all_ids.iter().map(|&id| (id, Color::White)).collect();

    for &id in &all_ids {
        if color[id] == Color::White && visit(id, &adjacency, &mut color) {
            return true;
        }
    }
    false
}

fn visit<'a>(node: &'a str, adjacency: &HashMap<&'a str, Vec<&'a str>>, color: &mut HashMap<&'a str, Color>) -> bool {
    color.insert(node, Color::Gray);
    if let Some(neighbors) = adjacency.get(node) {
        for &next in neighbors {
            match color.get(next).copied().unwrap_or(Color::White) {
                Color::Gray => return true,
                Color::White => {
                    if visit(next, adjacency, color) {
                        return true;
                    }
                }
                Color::Black => {}
            }
        }
    }
    color.insert(node, Color::Black);
    false
}
