//! Event Classification Module
//!
//! Locates the init node, the optional target node and the proved nodes
//! in a parsed trace.

use crate::domain::error::DistillError;
use crate::domain::event::{NodeId, TraceEvent};

/// Init/target/finished markers extracted from one trace.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceSummary {
    /// Node the execution started from (first init marker).
    pub init: NodeId,
    /// First target marker, if the proof has one.
    pub target: Option<NodeId>,
    /// All proved nodes, in encounter order, duplicates preserved.
    pub finished: Vec<NodeId>,
}

/// Scan the event stream once and collect the trace markers.
///
/// A well-formed trace carries exactly one init marker; its absence is fatal.
pub fn classify_events(events: &[TraceEvent]) -> Result<TraceSummary, DistillError> {
    let mut init = None;
    let mut target = None;
    let mut finished = Vec::new();

    for event in events {
        match event {
            TraceEvent::InitMarker { node } => {
                if init.is_none() {
                    init = Some(node.clone());
                }
            }
            TraceEvent::TargetMarker { node } => {
                if target.is_none() {
                    target = Some(node.clone());
                }
            }
            TraceEvent::ProvedMarker { node } => finished.push(node.clone()),
            _ => {}
        }
    }

    Ok(TraceSummary {
        init: init.ok_or(DistillError::MissingInit)?,
        target,
        finished,
    })
}
