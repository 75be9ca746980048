//! Run state - everything one run mutates, owned by the run loop

use super::graph::Graph;
use super::readiness::Readiness;
use super::record::NodeExecutionRecord;
use serde_json::Value;
use std::collections::{HashMap, HashSet, VecDeque};

/// Mutable state of a single run
#[derive(Debug)]
pub struct RunState<'w> {
    pub executed: HashSet<&'w str>,
    pub skipped: HashSet<&'w str>,
    /// Skipped ids in the order they were marked
    pub skip_order: Vec<&'w str>,
    /// Outputs of nodes whose handler succeeded
    pub outputs: HashMap<&'w str, Value>,
    /// Ready nodes with the first non-null input carried to them
    pub pending: VecDeque<(&'w str, Value)>,
    /// First non-null input carried to each node not yet released
    carried: HashMap<&'w str, Value>,
    pub readiness: Readiness<'w>,
    pub executions: Vec<NodeExecutionRecord>,
}

impl<'w> RunState<'w> {
    /// Seed the queue with every start node
    pub fn new(graph: &Graph<'w>) -> Self {
        let pending = graph
            .start_nodes()
            .into_iter()
            .map(|id| (id, Value::Null))
            .collect();

        Self {
            executed: HashSet::new(),
            skipped: HashSet::new(),
            skip_order: Vec::new(),
            outputs: HashMap::new(),
            pending,
            carried: HashMap::new(),
            readiness: Readiness::new(graph),
            executions: Vec::new(),
        }
    }

    pub fn is_terminal(&self, id: &str) -> bool {
        self.executed.contains(id) || self.skipped.contains(id)
    }

    /// Mark a node skipped; executed nodes are never re-marked
    pub fn mark_skipped(&mut self, id: &'w str) -> bool {
        if self.executed.contains(id) {
            log::warn!("Not skipping '{}': already executed", id);
            return false;
        }
        if self.skipped.insert(id) {
            self.skip_order.push(id);
        }
        true
    }

    /// One predecessor of `target` became terminal; enqueue it once all have.
    ///
    /// The input queued with `target` is the first non-null value carried to
    /// it, i.e. from the earliest predecessor to complete, not the last.
    pub fn release(&mut self, target: &'w str, carried: Value) {
        if !carried.is_null() {
            self.carried.entry(target).or_insert(carried);
        }
        if self.readiness.settle(target) {
            let input = self.carried.remove(target).unwrap_or(Value::Null);
            if !self.is_terminal(target) {
                self.pending.push_back((target, input));
            }
        }
    }

    /// Release every successor of `id` with the same carried input
    pub fn release_successors(&mut self, graph: &Graph<'w>, id: &str, carried: &Value) {
        for edge in graph.out_edges(id) {
            self.release(edge.target.as_str(), carried.clone());
        }
    }

    /// Nodes that ended neither executed nor skipped
    pub fn unreached(&self, graph: &Graph<'w>) -> Vec<String> {
        graph
            .nodes()
            .iter()
            .filter(|node| !self.is_terminal(&node.id))
            .map(|node| node.id.clone())
            .collect()
    }
}
