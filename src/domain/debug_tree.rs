//! Debug-Tree Builder
//!
//! Folds the ordered event stream into a nested record of
//! node -> rule attempt -> constraint -> solver query -> solver result,
//! associating solver traffic with the most recent attempt/constraint.

use std::collections::HashMap;

use crate::domain::event::{NodeId, RuleId, TraceEvent};

/// Solver results keyed by the query text that produced them. A constraint
/// may accumulate several queries (retries with different encodings).
pub type QueryResults = HashMap<String, String>;

/// Queries keyed by the constraint (or implication right-hand side) text.
pub type ConstraintQueries = HashMap<String, QueryResults>;

/// Per-node record of every rule attempted there.
pub type RuleAttempts = HashMap<RuleId, ConstraintQueries>;

/// The full debug tree: node -> rule -> constraint -> query -> result.
pub type DebugTree = HashMap<NodeId, RuleAttempts>;

/// Running fold state. Events arriving before any rule attempt are dropped
/// rather than mis-attributed; a new attempt resets the constraint/query
/// context, a new constraint resets the query context.
#[derive(Debug, Default)]
pub struct DebugTreeBuilder {
    node: Option<NodeId>,
    rule: Option<RuleId>,
    constraint: Option<String>,
    query: Option<String>,
    tree: DebugTree,
}

impl DebugTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the fold by one event. Only attempt, constraint, implication,
    /// query and result events participate; everything else is skipped.
    pub fn observe(&mut self, event: &TraceEvent) {
        // Until an attempt opens the context, nothing else can be attributed.
        if self.node.is_none() || self.rule.is_none() {
            if !matches!(event, TraceEvent::RuleAttempt { .. }) {
                return;
            }
        }

        match event {
            TraceEvent::RuleAttempt { node, rule, .. } => {
                self.node = Some(node.clone());
                self.rule = Some(rule.clone());
                self.constraint = None;
                self.query = None;
                self.tree
                    .entry(node.clone())
                    .or_default()
                    .entry(rule.clone())
                    .or_default();
            }
            TraceEvent::ConstraintCheck { constraint } => {
                self.open_constraint(constraint.clone());
            }
            TraceEvent::ImplicationCheck { rhs } => {
                self.open_constraint(rhs.clone());
            }
            TraceEvent::SolverQuery { query } => {
                if self.constraint.is_some() {
                    self.query = Some(query.clone());
                }
            }
            TraceEvent::SolverResult { result } => {
                let (Some(node), Some(rule), Some(constraint)) =
                    (&self.node, &self.rule, &self.constraint)
                else {
                    return;
                };
                // A result without a preceding query lands under the empty
                // key, keeping the verdict rather than dropping it.
                let query = self.query.clone().unwrap_or_default();
                self.tree
                    .entry(node.clone())
                    .or_default()
                    .entry(rule.clone())
                    .or_default()
                    .entry(constraint.clone())
                    .or_default()
                    .insert(query, result.clone());
            }
            _ => {}
        }
    }

    fn open_constraint(&mut self, key: String) {
        let (Some(node), Some(rule)) = (&self.node, &self.rule) else {
            return;
        };
        self.tree
            .entry(node.clone())
            .or_default()
            .entry(rule.clone())
            .or_default()
            .entry(key.clone())
            .or_default();
        self.constraint = Some(key);
        self.query = None;
    }

    pub fn finish(self) -> DebugTree {
        self.tree
    }
}

/// Fold a full event stream into a debug tree.
pub fn build_debug_tree(events: &[TraceEvent]) -> DebugTree {
    let mut builder = DebugTreeBuilder::new();
    for event in events {
        builder.observe(event);
    }
    builder.finish()
}
