//! Proof-Log Line Parser
//!
//! Pure conversion of one raw log line into a typed trace event. Lines are
//! whitespace-separated: an opaque sequence token, a tag, then tag-specific
//! fields. Unknown tags and short lines are excluded rather than surfaced.

use crate::domain::event::{RuleKind, TraceEvent};

/// Rule tokens carry extra qualifiers after an underscore; the base id
/// before the first `_` is what names the rule everywhere downstream.
fn base_rule_id(token: &str) -> String {
    token.split('_').next().unwrap_or(token).to_string()
}

/// Parse one raw line into a trace event, or `None` for lines that do not
/// form a complete record.
pub fn parse_line(line: &str) -> Option<TraceEvent> {
    let line = line.trim();
    let (_seq, rest) = line.split_once(char::is_whitespace)?;
    let rest = rest.trim_start();
    let (tag, payload) = match rest.split_once(char::is_whitespace) {
        Some((tag, payload)) => (tag, payload.trim_start()),
        None => (rest, ""),
    };

    match tag {
        "EXECINIT" | "REACHINIT" => {
            let node = first_field(payload)?;
            Some(TraceEvent::InitMarker { node })
        }
        "REACHTARGET" => {
            let node = first_field(payload)?;
            Some(TraceEvent::TargetMarker { node })
        }
        "REACHPROVED" => {
            let node = first_field(payload)?;
            Some(TraceEvent::ProvedMarker { node })
        }
        "RULE" | "SRULE" => {
            let mut fields = payload.split_whitespace();
            let from = fields.next()?.to_string();
            let to = fields.next()?.to_string();
            let rule = base_rule_id(fields.next()?);
            let kind = if tag == "SRULE" {
                RuleKind::Structural
            } else {
                RuleKind::Ordinary
            };
            Some(TraceEvent::RuleApplication { from, to, rule, kind })
        }
        "RULEATTEMPT" | "SRULEATTEMPT" => {
            let mut fields = payload.split_whitespace();
            let node = fields.next()?.to_string();
            let rule = base_rule_id(fields.next()?);
            let kind = if tag == "SRULEATTEMPT" {
                RuleKind::Structural
            } else {
                RuleKind::Ordinary
            };
            Some(TraceEvent::RuleAttempt { node, rule, kind })
        }
        "CHECKINGCONSTRAINT" => {
            if payload.is_empty() {
                return None;
            }
            Some(TraceEvent::ConstraintCheck { constraint: payload.to_string() })
        }
        "IMPLICATION" => {
            if payload.is_empty() {
                return None;
            }
            Some(TraceEvent::ImplicationCheck { rhs: payload.to_string() })
        }
        "Z3QUERY" => {
            if payload.is_empty() {
                return None;
            }
            Some(TraceEvent::SolverQuery { query: payload.to_string() })
        }
        "Z3RESULT" => {
            let result = first_field(payload)?;
            Some(TraceEvent::SolverResult { result })
        }
        _ => None,
    }
}

fn first_field(payload: &str) -> Option<String> {
    payload.split_whitespace().next().map(|s| s.to_string())
}

/// Parse a whole trace, excluding malformed lines.
pub fn parse_lines(lines: &[String]) -> Vec<TraceEvent> {
    lines.iter().filter_map(|l| parse_line(l)).collect()
}
