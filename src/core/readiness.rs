//! Readiness tracker - in-degree counters and the run/skip decision
//!
//! A node is released once every incoming edge's source is terminal
//! (executed or skipped). Counting replaces polling, so a node on a cycle
//! simply never becomes ready instead of spinning the queue.

use super::graph::Graph;
use super::state::RunState;
use serde_json::Value;
use std::collections::HashMap;

/// Remaining non-terminal predecessor edges per node
#[derive(Debug, Clone)]
pub struct Readiness<'w> {
    remaining: HashMap<&'w str, usize>,
}

impl<'w> Readiness<'w> {
    pub fn new(graph: &Graph<'w>) -> Self {
        let remaining = graph
            .nodes()
            .iter()
            .map(|node| (node.id.as_str(), graph.in_edges(&node.id).len()))
            .collect();
        Self { remaining }
    }

    /// Count down one incoming edge; `true` when the node just became ready
    pub fn settle(&mut self, id: &str) -> bool {
        match self.remaining.get_mut(id) {
            Some(count) if *count > 0 => {
                *count -= 1;
                *count == 0
            }
            _ => false,
        }
    }

    pub fn is_ready(&self, id: &str) -> bool {
        self.remaining.get(id).copied().unwrap_or(0) == 0
    }
}

/// What to do with a dequeued node
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Already executed or skipped
    Done,
    /// Some predecessor is still pending
    Wait,
    /// Every predecessor was skipped
    Skip,
    Dispatch {
        /// Single resolved input
        input: Value,
        /// Outputs of all executed predecessors, in edge order
        predecessors: Vec<(String, Value)>,
    },
}

/// Decide whether `id` runs now.
///
/// The resolved input is the carried input when present, otherwise the
/// output of the first executed predecessor in edge order. Multiple live
/// inputs are not merged into it; they are only exposed via `predecessors`.
pub fn assess<'w>(graph: &Graph<'w>, state: &RunState<'w>, id: &str, carried: Value) -> Verdict {
    if state.is_terminal(id) {
        return Verdict::Done;
    }
    if !state.readiness.is_ready(id) {
        return Verdict::Wait;
    }

    let incoming = graph.in_edges(id);
    if incoming.is_empty() {
        return Verdict::Dispatch {
            input: carried,
            predecessors: Vec::new(),
        };
    }

    let mut live_sources: Vec<&str> = Vec::new();
    for edge in incoming {
        let source = edge.source.as_str();
        if state.executed.contains(source) && !live_sources.contains(&source) {
            live_sources.push(source);
        }
    }

    if live_sources.is_empty() {
        return Verdict::Skip;
    }

    let predecessors: Vec<(String, Value)> = live_sources
        .iter()
        .filter_map(|source| {
            state
                .outputs
                .get(source)
                .map(|output| (source.to_string(), output.clone()))
        })
        .collect();

    let input = if carried.is_null() {
        state
            .outputs
            .get(live_sources[0])
            .cloned()
            .unwrap_or(Value::Null)
    } else {
        carried
    };

    Verdict::Dispatch {
        input,
        predecessors,
    }
}
