use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::distill::DistillationResult;

#[derive(Debug, Serialize, Deserialize)]
pub struct GraphDto {
    pub init: String,
    pub target: Option<String>,
    pub finished: Vec<String>,
    pub steps: Vec<String>,
    pub reduction_ratio: u64,
    pub nodes: Vec<NodeDto>,
    pub edges: Vec<EdgeDto>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NodeDto {
    pub id: String,
    /// "init", "target", "proved" or "state" - used for visual styling.
    pub role: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EdgeDto {
    pub from: String,
    pub to: String,
    pub rule: String,
}

impl From<&DistillationResult> for GraphDto {
    fn from(result: &DistillationResult) -> Self {
        let mut ids: BTreeSet<&str> = BTreeSet::new();
        ids.insert(result.init.as_str());
        if let Some(target) = &result.target {
            ids.insert(target.as_str());
        }
        for id in &result.finished {
            ids.insert(id.as_str());
        }
        for (from, edges) in &result.pruned.edges {
            ids.insert(from.as_str());
            for edge in edges {
                ids.insert(edge.to.as_str());
            }
        }

        let nodes = ids
            .iter()
            .map(|id| {
                let role = if *id == result.init {
                    "init"
                } else if result.target.as_deref() == Some(*id) {
                    "target"
                } else if result.finished.iter().any(|f| f == id) {
                    "proved"
                } else {
                    "state"
                };
                NodeDto {
                    id: id.to_string(),
                    role: role.to_string(),
                }
            })
            .collect();

        let mut edges = Vec::new();
        let mut froms: Vec<&String> = result.pruned.edges.keys().collect();
        froms.sort();
        for from in froms {
            for edge in &result.pruned.edges[from] {
                edges.push(EdgeDto {
                    from: edge.from.clone(),
                    to: edge.to.clone(),
                    rule: edge.rule.clone(),
                });
            }
        }

        GraphDto {
            init: result.init.clone(),
            target: result.target.clone(),
            finished: result.finished.clone(),
            steps: result.steps.clone(),
            reduction_ratio: result.pruned.reduction_ratio,
            nodes,
            edges,
        }
    }
}
