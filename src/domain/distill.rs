//! Frontier Distiller
//!
//! Collapses maximal runs of non-step transitions into single summarizing
//! edges, preserving step transitions and transitions that land on the
//! target node. The frontier is a work list of in-progress summaries,
//! replaced wholesale each iteration.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::domain::adjacency::{AdjacencyGraph, Edge};
use crate::domain::debug_tree::DebugTree;
use crate::domain::error::DistillError;
use crate::domain::event::{NodeId, RuleId};

/// Default bound on frontier iterations. A cyclic subgraph of non-step
/// edges never reaches a boundary and would otherwise expand forever; the
/// bound sits far above the path depth of any honest trace.
pub const DEFAULT_MAX_ITERATIONS: usize = 1_000_000;

/// An in-progress summarized transition: `from` is pinned at the last
/// relevant boundary (or the init node), `to` is the current position.
#[derive(Debug, Clone)]
struct FrontierEntry {
    from: NodeId,
    to: NodeId,
}

/// The distilled graph plus its diagnostic reduction ratio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrunedGraph {
    /// Kept edges grouped by source node.
    pub edges: HashMap<NodeId, Vec<Edge>>,
    /// Kept edge count as a percentage of the raw edge count.
    pub reduction_ratio: u64,
}

/// Everything a report renderer or graph visualizer needs from one trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistillationResult {
    pub init: NodeId,
    pub target: Option<NodeId>,
    pub finished: Vec<NodeId>,
    pub pruned: PrunedGraph,
    pub steps: Vec<RuleId>,
    pub rule_debug: DebugTree,
}

/// Expand the frontier over the adjacency graph until every path has either
/// ended at a relevant boundary or run out of outgoing edges.
///
/// With `prune` false the raw adjacency graph is returned unchanged.
pub fn distill_graph(
    adjacency: &AdjacencyGraph,
    steps: &[RuleId],
    init: &str,
    target: Option<&str>,
    prune: bool,
    max_iterations: usize,
) -> Result<PrunedGraph, DistillError> {
    let raw_count = adjacency.edge_count();

    if !prune {
        return Ok(PrunedGraph {
            edges: adjacency.edges.clone(),
            reduction_ratio: ratio(raw_count, raw_count),
        });
    }

    let step_set: HashSet<&str> = steps.iter().map(|s| s.as_str()).collect();
    let is_relevant =
        |edge: &Edge| step_set.contains(edge.rule.as_str()) || target == Some(edge.to.as_str());

    let mut kept: Vec<Edge> = Vec::new();
    let mut frontier = vec![FrontierEntry {
        from: init.to_string(),
        to: init.to_string(),
    }];
    let mut iterations = 0usize;

    while !frontier.is_empty() {
        iterations += 1;
        if iterations > max_iterations {
            return Err(DistillError::NonTerminatingFrontier(max_iterations));
        }

        let mut relevant: Vec<Edge> = Vec::new();
        let mut pending: Vec<FrontierEntry> = Vec::new();

        for entry in &frontier {
            // Paths whose tip has no outgoing edges terminate here with
            // nothing further to summarize.
            let Some(outgoing) = adjacency.outgoing(&entry.to) else {
                continue;
            };
            for edge in outgoing {
                let candidate = Edge {
                    from: entry.from.clone(),
                    to: edge.to.clone(),
                    rule: edge.rule.clone(),
                };
                if is_relevant(&candidate) {
                    relevant.push(candidate);
                } else {
                    pending.push(FrontierEntry {
                        from: candidate.from,
                        to: candidate.to,
                    });
                }
            }
        }

        // Each boundary just reached starts a fresh summary; non-relevant
        // candidates keep extending with their original origin.
        let mut next: Vec<FrontierEntry> = relevant
            .iter()
            .map(|edge| FrontierEntry {
                from: edge.to.clone(),
                to: edge.to.clone(),
            })
            .collect();
        next.append(&mut pending);

        kept.extend(relevant);
        frontier = next;
    }

    let mut edges: HashMap<NodeId, Vec<Edge>> = HashMap::new();
    let kept_count = kept.len();
    for edge in kept {
        edges.entry(edge.from.clone()).or_default().push(edge);
    }

    Ok(PrunedGraph {
        edges,
        reduction_ratio: ratio(kept_count, raw_count),
    })
}

fn ratio(kept: usize, raw: usize) -> u64 {
    if raw == 0 {
        return 100;
    }
    (kept as u64 * 100) / raw as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(&str, &str, &str)]) -> AdjacencyGraph {
        let mut g = AdjacencyGraph::default();
        for (from, to, rule) in edges {
            g.add_edge(Edge {
                from: from.to_string(),
                to: to.to_string(),
                rule: rule.to_string(),
            });
        }
        g
    }

    fn steps(ids: &[&str]) -> Vec<RuleId> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_graph_terminates_immediately() {
        let g = AdjacencyGraph::default();
        let pruned = distill_graph(&g, &[], "n0", None, true, 10).unwrap();
        assert!(pruned.edges.is_empty());
    }

    #[test]
    fn test_prune_false_returns_raw_graph() {
        let g = graph(&[("a", "b", "r1"), ("b", "c", "r2")]);
        let pruned = distill_graph(&g, &steps(&["r1"]), "a", None, false, 10).unwrap();
        assert_eq!(pruned.edges, g.edges);
        assert_eq!(pruned.reduction_ratio, 100);
    }

    #[test]
    fn test_all_steps_keeps_every_edge() {
        let g = graph(&[("a", "b", "r1"), ("b", "c", "r2")]);
        let pruned =
            distill_graph(&g, &steps(&["r1", "r2"]), "a", None, true, 10).unwrap();
        assert_eq!(pruned.edges, g.edges);
        assert_eq!(pruned.reduction_ratio, 100);
    }

    #[test]
    fn test_non_step_run_collapses_into_one_edge() {
        // a -r1-> b -r2(step)-> c; the r1 hop is absorbed into a summary
        // edge a -> c carrying the last hop's rule.
        let g = graph(&[("a", "b", "r1"), ("b", "c", "r2")]);
        let pruned = distill_graph(&g, &steps(&["r2"]), "a", None, true, 10).unwrap();

        assert_eq!(pruned.edges.len(), 1);
        let out = &pruned.edges["a"];
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].to, "c");
        assert_eq!(out[0].rule, "r2");
        assert_eq!(pruned.reduction_ratio, 50);
    }

    #[test]
    fn test_trailing_non_step_run_is_dropped() {
        // After the step boundary at c, the r3 hop never becomes relevant
        // and its path ends at d with no outgoing edges.
        let g = graph(&[("a", "b", "r1"), ("b", "c", "r2"), ("c", "d", "r3")]);
        let pruned = distill_graph(&g, &steps(&["r2"]), "a", None, true, 10).unwrap();

        assert_eq!(pruned.edges.len(), 1);
        assert_eq!(pruned.edges["a"][0].to, "c");
        assert!(!pruned.edges.contains_key("c"));
    }

    #[test]
    fn test_edge_into_target_is_relevant_without_being_a_step() {
        let g = graph(&[("a", "b", "r1"), ("b", "t", "r2")]);
        let pruned = distill_graph(&g, &[], "a", Some("t"), true, 10).unwrap();

        assert_eq!(pruned.edges.len(), 1);
        let out = &pruned.edges["a"];
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].to, "t");
    }

    #[test]
    fn test_branching_paths_are_pursued_independently() {
        // a branches to two non-step chains, each hitting its own step edge.
        let g = graph(&[
            ("a", "b1", "r1"),
            ("a", "b2", "r1"),
            ("b1", "c1", "rs"),
            ("b2", "c2", "rs"),
        ]);
        let pruned = distill_graph(&g, &steps(&["rs"]), "a", None, true, 10).unwrap();

        let out = &pruned.edges["a"];
        assert_eq!(out.len(), 2);
        let targets: Vec<&str> = out.iter().map(|e| e.to.as_str()).collect();
        assert!(targets.contains(&"c1"));
        assert!(targets.contains(&"c2"));
    }

    #[test]
    fn test_summary_restarts_after_each_boundary() {
        // Two step edges separated by a non-step run: both boundaries
        // appear, each summary anchored at the previous boundary.
        let g = graph(&[
            ("a", "b", "rs"),
            ("b", "c", "r1"),
            ("c", "d", "rs"),
        ]);
        let pruned = distill_graph(&g, &steps(&["rs"]), "a", None, true, 10).unwrap();

        assert_eq!(pruned.edges["a"][0].to, "b");
        assert_eq!(pruned.edges["b"][0].to, "d");
    }

    #[test]
    fn test_idempotence_of_distillation() {
        let g = graph(&[
            ("a", "b", "r1"),
            ("b", "c", "rs"),
            ("c", "d", "r2"),
            ("d", "e", "rs"),
        ]);
        let step_set = steps(&["rs"]);
        let once = distill_graph(&g, &step_set, "a", None, true, 100).unwrap();

        let redistilled_input = AdjacencyGraph {
            edges: once.edges.clone(),
        };
        let twice =
            distill_graph(&redistilled_input, &step_set, "a", None, true, 100).unwrap();
        assert_eq!(once.edges, twice.edges);
    }

    #[test]
    fn test_non_step_cycle_hits_iteration_cap() {
        let g = graph(&[("a", "b", "r1"), ("b", "a", "r2")]);
        let err = distill_graph(&g, &[], "a", None, true, 50).unwrap_err();
        assert_eq!(err, DistillError::NonTerminatingFrontier(50));
    }

    #[test]
    fn test_cycle_through_step_edge_also_hits_cap() {
        // A cycle through a step edge re-anchors at the boundary every lap
        // and never drains the frontier; the cap guards this shape too.
        let g = graph(&[("a", "b", "rs"), ("b", "a", "r1")]);
        let result = distill_graph(&g, &steps(&["rs"]), "a", None, true, 50);
        assert!(matches!(
            result,
            Err(DistillError::NonTerminatingFrontier(_))
        ));
    }
}
