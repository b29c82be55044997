// Adjacency graph structures for TraceSift.
// Represents rule-application transitions between proof states.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::event::{NodeId, RuleId, TraceEvent};

/// A transition between two proof states. After distillation an edge may
/// summarize several raw hops; `rule` then names the rule of the last hop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub rule: RuleId,
}

/// Outgoing transitions grouped by source node. Nodes without outgoing
/// rule applications are absent from the map; callers treat absent and
/// empty identically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdjacencyGraph {
    pub edges: HashMap<NodeId, Vec<Edge>>,
}

impl AdjacencyGraph {
    /// Group every rule-application event (ordinary and structural) by its
    /// source node. Insertion order within a node's list matches event order.
    pub fn from_events(events: &[TraceEvent]) -> Self {
        let mut graph = AdjacencyGraph::default();
        for event in events {
            if let TraceEvent::RuleApplication { from, to, rule, .. } = event {
                graph.add_edge(Edge {
                    from: from.clone(),
                    to: to.clone(),
                    rule: rule.clone(),
                });
            }
        }
        graph
    }

    pub fn add_edge(&mut self, edge: Edge) {
        self.edges.entry(edge.from.clone()).or_default().push(edge);
    }

    /// Outgoing edges of a node, if it has any.
    pub fn outgoing(&self, node: &str) -> Option<&[Edge]> {
        self.edges.get(node).map(|v| v.as_slice())
    }

    /// Total number of edges across all nodes.
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(|v| v.len()).sum()
    }
}
