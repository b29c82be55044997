use crate::domain::steps::RuleDefinition;

pub mod graph_exporter;

/// Source of raw trace lines for one proof attempt. A missing trace is a
/// fatal input error.
pub trait TraceSource {
    fn load_trace(&self, proof_id: &str) -> anyhow::Result<Vec<String>>;
}

/// Storage of structured rule-definition blobs. Loads may fail per rule id;
/// callers recover by treating that rule as not-a-step.
pub trait RuleStore: Sync {
    fn load_rule(&self, proof_id: &str, rule_id: &str) -> anyhow::Result<RuleDefinition>;
}
