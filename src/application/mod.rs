// Use-case layer for TraceSift: wires the trace passes and the frontier
// distiller behind the port traits.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::domain::adjacency::AdjacencyGraph;
use crate::domain::classify::classify_events;
use crate::domain::debug_tree::build_debug_tree;
use crate::domain::distill::{distill_graph, DistillationResult, DEFAULT_MAX_ITERATIONS};
use crate::domain::steps::{classify_steps, observed_ordinary_rules};
use crate::infrastructure::log_parser::parse_lines;
use crate::ports::{RuleStore, TraceSource};

/// Explicit configuration for a distillation run. Passed in by the caller;
/// the core never consults the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding trace logs and rule blob directories.
    pub data_dir: PathBuf,
    /// Frontier iteration bound.
    pub max_iterations: usize,
}

impl Config {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Per-run switches. `verbose` only controls narration, never the result.
#[derive(Debug, Clone, Copy)]
pub struct DistillOptions {
    pub prune: bool,
    pub verbose: bool,
}

impl Default for DistillOptions {
    fn default() -> Self {
        Self {
            prune: true,
            verbose: false,
        }
    }
}

pub struct DistillUsecase<'a> {
    pub trace_source: &'a dyn TraceSource,
    pub rule_store: &'a dyn RuleStore,
    pub max_iterations: usize,
}

impl<'a> DistillUsecase<'a> {
    /// Distill one proof trace into its reviewable graph.
    pub fn run(&self, proof_id: &str, options: DistillOptions) -> Result<DistillationResult> {
        let verbose = options.verbose;

        if verbose {
            println!("[Distill] Reading trace for {}...", proof_id);
        }
        let lines = self
            .trace_source
            .load_trace(proof_id)
            .with_context(|| format!("Cannot load trace for proof {}", proof_id))?;
        let events = parse_lines(&lines);
        if verbose {
            println!(
                "[Distill] Parsed {} events from {} lines",
                events.len(),
                lines.len()
            );
        }

        // The four stream passes are read-only over the same events and
        // write disjoint outputs, so they run in parallel.
        let ((summary, adjacency), (rule_debug, rule_ids)) = rayon::join(
            || {
                rayon::join(
                    || classify_events(&events),
                    || AdjacencyGraph::from_events(&events),
                )
            },
            || {
                rayon::join(
                    || build_debug_tree(&events),
                    || observed_ordinary_rules(&events),
                )
            },
        );
        let summary = summary?;

        if verbose {
            println!(
                "[Distill] init={} target={:?} finished={} raw edges={}",
                summary.init,
                summary.target,
                summary.finished.len(),
                adjacency.edge_count()
            );
        }

        let rule_store = self.rule_store;
        let steps = classify_steps(
            &rule_ids,
            |rule_id| rule_store.load_rule(proof_id, rule_id),
            verbose,
        );
        if verbose {
            println!(
                "[Distill] {} of {} observed rules are step/halt boundaries",
                steps.len(),
                rule_ids.len()
            );
        }

        let pruned = distill_graph(
            &adjacency,
            &steps,
            &summary.init,
            summary.target.as_deref(),
            options.prune,
            self.max_iterations,
        )?;
        if verbose {
            println!(
                "[Distill] Reduced edges to {}%",
                pruned.reduction_ratio
            );
        }

        Ok(DistillationResult {
            init: summary.init,
            target: summary.target,
            finished: summary.finished,
            pruned,
            steps,
            rule_debug,
        })
    }
}
