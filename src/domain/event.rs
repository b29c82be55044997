// Trace event data structures for TraceSift.
// These types represent parsed proof-log records in a form suitable for distillation.

use serde::{Deserialize, Serialize};

/// Identifier of a proof state reached during symbolic execution.
pub type NodeId = String;

/// Identifier of a rewrite rule, truncated to its base id (the part before
/// the first `_` in the raw log token).
pub type RuleId = String;

/// Whether a rule application or attempt came from an ordinary rewrite rule
/// or a structural one. Both participate identically in graph construction;
/// only ordinary rules are submitted to the rule store for step lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleKind {
    Ordinary,
    Structural,
}

/// One typed record parsed from a proof-log line.
///
/// The order of events in the stream is significant: it encodes the temporal
/// association between rule attempts, constraint checks and solver traffic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TraceEvent {
    /// Execution started at this node.
    InitMarker { node: NodeId },
    /// This node is the designated target (e.g. the contradiction state).
    TargetMarker { node: NodeId },
    /// This node was proved/finished.
    ProvedMarker { node: NodeId },
    /// A rule rewrote `from` into `to`.
    RuleApplication {
        from: NodeId,
        to: NodeId,
        rule: RuleId,
        kind: RuleKind,
    },
    /// The engine started trying a rule at a node.
    RuleAttempt {
        node: NodeId,
        rule: RuleId,
        kind: RuleKind,
    },
    /// A side condition is being checked for the current attempt.
    ConstraintCheck { constraint: String },
    /// An implication check; only the right-hand side is kept for indexing.
    ImplicationCheck { rhs: String },
    /// Query text sent to the SMT solver.
    SolverQuery { query: String },
    /// Solver verdict for the pending query (sat/unsat/unknown/...).
    SolverResult { result: String },
}
