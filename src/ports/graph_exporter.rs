//! Graph DOT Exporter
//!
//! Exports a distilled proof graph as Graphviz DOT with role-based styling.

use std::collections::BTreeSet;
use std::io::Result;

use crate::domain::distill::DistillationResult;

/// Visual role of a node in the rendered graph.
#[derive(Debug, Clone, Copy, PartialEq)]
enum NodeRole {
    Init,
    Target,
    Proved,
    State,
}

pub struct GraphExporter;

impl GraphExporter {
    /// Export a distillation result to DOT format.
    pub fn export(result: &DistillationResult, path: &str) -> Result<()> {
        let content = Self::to_dot(result);
        std::fs::write(path, content)
    }

    /// Convert a distillation result to a DOT string.
    pub fn to_dot(result: &DistillationResult) -> String {
        let mut lines = Vec::new();

        lines.push("digraph ProofGraph {".to_string());
        lines.push("    rankdir=TB;".to_string());
        lines.push("    nodesep=0.6;".to_string());
        lines.push("    ranksep=0.9;".to_string());
        lines.push("    node [fontname=\"Helvetica\", fontsize=12];".to_string());
        lines.push("    edge [fontname=\"Helvetica\", fontsize=10];".to_string());
        lines.push("".to_string());

        // Collect every node reachable through the pruned edges plus the
        // markers, sorted for stable output.
        let mut nodes: BTreeSet<&str> = BTreeSet::new();
        nodes.insert(result.init.as_str());
        if let Some(target) = &result.target {
            nodes.insert(target.as_str());
        }
        for id in &result.finished {
            nodes.insert(id.as_str());
        }
        for (from, edges) in &result.pruned.edges {
            nodes.insert(from.as_str());
            for edge in edges {
                nodes.insert(edge.to.as_str());
            }
        }

        for id in &nodes {
            let (shape, color, style) = Self::node_style(Self::role_of(result, id));
            lines.push(format!(
                "    \"{}\" [label=\"{}\", shape={}, style=\"{}\", fillcolor=\"{}\"];",
                id,
                Self::escape_label(id),
                shape,
                style,
                color,
            ));
        }

        lines.push("".to_string());

        let mut froms: Vec<&String> = result.pruned.edges.keys().collect();
        froms.sort();
        for from in froms {
            for edge in &result.pruned.edges[from] {
                let styled = if result.steps.contains(&edge.rule) {
                    " [penwidth=2]"
                } else {
                    ""
                };
                lines.push(format!(
                    "    \"{}\" -> \"{}\" [label=\"{}\"]{};",
                    edge.from,
                    edge.to,
                    Self::escape_label(&edge.rule),
                    styled,
                ));
            }
        }

        lines.push("}".to_string());
        lines.join("\n")
    }

    fn role_of(result: &DistillationResult, id: &str) -> NodeRole {
        if id == result.init {
            NodeRole::Init
        } else if result.target.as_deref() == Some(id) {
            NodeRole::Target
        } else if result.finished.iter().any(|f| f == id) {
            NodeRole::Proved
        } else {
            NodeRole::State
        }
    }

    fn node_style(role: NodeRole) -> (&'static str, &'static str, &'static str) {
        match role {
            NodeRole::Init => ("box", "#a6e3a1", "filled,rounded"),   // Green
            NodeRole::Target => ("box", "#f38ba8", "filled,rounded"), // Red
            NodeRole::Proved => ("box", "#89b4fa", "filled"),         // Blue
            NodeRole::State => ("box", "#cdd6f4", "filled"),          // Gray
        }
    }

    fn escape_label(label: &str) -> String {
        label
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\n', "\\n")
    }
}
