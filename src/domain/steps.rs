//! Step Rule Classification
//!
//! Decides which observed rule ids mark proof-relevant boundaries, by
//! loading each rule's definition blob and inspecting its attribute string
//! for a `label(...)` whose qualifier is `step` or `halt`.

use std::collections::HashSet;

use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::event::{RuleId, RuleKind, TraceEvent};

/// Structured rule definition blob. Extra fields in the JSON are ignored;
/// only the attribute string matters for step classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub term: RuleTerm,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleTerm {
    /// Free-text attribute blob, e.g. `label(SPEC.step) owise()`.
    pub att: String,
}

/// Distinct rule ids observed in *ordinary* rule applications, in first-seen
/// order. Structural rules never reach the rule store.
pub fn observed_ordinary_rules(events: &[TraceEvent]) -> Vec<RuleId> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for event in events {
        if let TraceEvent::RuleApplication { rule, kind, .. } = event {
            if *kind == RuleKind::Ordinary && seen.insert(rule.clone()) {
                out.push(rule.clone());
            }
        }
    }
    out
}

/// Extract the label qualifier from an attribute blob: the substring after
/// the first `.` inside the first `label(...)` occurrence.
/// `label(SPEC.step)` yields `step`; a label without a `.` yields nothing.
fn label_qualifier(re: &Regex, att: &str) -> Option<String> {
    let captures = re.captures(att)?;
    let inner = captures.get(1)?.as_str();
    inner.splitn(2, '.').nth(1).map(|s| s.to_string())
}

/// Classify the given rule ids into the step set.
///
/// The loader is called once per rule id; load failures are logged and the
/// rule id is excluded (never a step). Loads run in parallel, results keep
/// the input order.
pub fn classify_steps<F>(rule_ids: &[RuleId], load: F, verbose: bool) -> Vec<RuleId>
where
    F: Fn(&str) -> anyhow::Result<RuleDefinition> + Sync,
{
    let label_re = Regex::new(r"label\(([^)]*)\)").expect("label pattern is valid");

    rule_ids
        .par_iter()
        .filter_map(|rule_id| {
            let definition = match load(rule_id) {
                Ok(d) => d,
                Err(e) => {
                    if verbose {
                        eprintln!("[Steps] Skipping rule {}: {}", rule_id, e);
                    }
                    return None;
                }
            };
            match label_qualifier(&label_re, &definition.term.att).as_deref() {
                Some("step") | Some("halt") => Some(rule_id.clone()),
                _ => None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::RuleKind;

    fn def(att: &str) -> RuleDefinition {
        RuleDefinition {
            term: RuleTerm { att: att.to_string() },
        }
    }

    #[test]
    fn test_step_and_halt_labels_classify() {
        let rules = vec!["r1".to_string(), "r2".to_string(), "r3".to_string()];
        let steps = classify_steps(
            &rules,
            |id| match id {
                "r1" => Ok(def("label(SPEC.step)")),
                "r2" => Ok(def("label(SPEC.halt) owise()")),
                _ => Ok(def("label(SPEC.internal)")),
            },
            false,
        );
        assert_eq!(steps, vec!["r1".to_string(), "r2".to_string()]);
    }

    #[test]
    fn test_load_failure_excludes_rule_without_aborting() {
        let rules = vec!["good".to_string(), "bad".to_string()];
        let steps = classify_steps(
            &rules,
            |id| {
                if id == "bad" {
                    anyhow::bail!("no such blob")
                }
                Ok(def("label(SPEC.step)"))
            },
            false,
        );
        assert_eq!(steps, vec!["good".to_string()]);
    }

    #[test]
    fn test_label_without_qualifier_is_not_a_step() {
        let rules = vec!["r1".to_string()];
        let steps = classify_steps(&rules, |_| Ok(def("label(step)")), false);
        assert!(steps.is_empty());
    }

    #[test]
    fn test_missing_label_attribute_is_not_a_step() {
        let rules = vec!["r1".to_string()];
        let steps = classify_steps(&rules, |_| Ok(def("owise() cool()")), false);
        assert!(steps.is_empty());
    }

    #[test]
    fn test_first_label_occurrence_wins() {
        let rules = vec!["r1".to_string()];
        let steps = classify_steps(
            &rules,
            |_| Ok(def("label(SPEC.other) label(SPEC.step)")),
            false,
        );
        assert!(steps.is_empty());
    }

    #[test]
    fn test_observed_rules_dedup_and_exclude_structural() {
        let events = vec![
            TraceEvent::RuleApplication {
                from: "a".into(),
                to: "b".into(),
                rule: "r1".into(),
                kind: RuleKind::Ordinary,
            },
            TraceEvent::RuleApplication {
                from: "b".into(),
                to: "c".into(),
                rule: "r1".into(),
                kind: RuleKind::Ordinary,
            },
            TraceEvent::RuleApplication {
                from: "c".into(),
                to: "d".into(),
                rule: "s1".into(),
                kind: RuleKind::Structural,
            },
            TraceEvent::RuleApplication {
                from: "d".into(),
                to: "e".into(),
                rule: "r2".into(),
                kind: RuleKind::Ordinary,
            },
        ];
        assert_eq!(
            observed_ordinary_rules(&events),
            vec!["r1".to_string(), "r2".to_string()]
        );
    }
}
