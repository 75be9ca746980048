//! Branch pruner - routes a conditional node's output and skips dead branches

use super::graph::Graph;
use super::state::RunState;
use serde_json::Value;
use std::collections::{HashSet, VecDeque};

/// Follow the edges whose handle equals `branch`; prune the rest.
///
/// Targets of non-matching edges, and everything reachable from them, are
/// marked skipped before any of them can be dequeued. A node reachable from
/// an un-taken branch is skipped even if a live path also leads to it.
pub fn route<'w>(
    graph: &Graph<'w>,
    state: &mut RunState<'w>,
    node_id: &str,
    branch: &str,
    output: &Value,
) {
    for edge in graph.out_edges(node_id) {
        if edge.handle() == branch {
            state.release(edge.target.as_str(), output.clone());
        } else {
            log::debug!(
                "Branch '{}' of '{}' not taken, pruning from '{}'",
                edge.handle(),
                node_id,
                edge.target
            );
            skip_downstream(graph, state, edge.target.as_str());
            // keep the counter consistent even though the target is dead
            state.readiness.settle(edge.target.as_str());
        }
    }
}

/// Mark `start` and its whole downstream closure as skipped
pub fn skip_downstream<'w>(graph: &Graph<'w>, state: &mut RunState<'w>, start: &'w str) {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<&'w str> = VecDeque::from([start]);

    while let Some(id) = queue.pop_front() {
        if !visited.insert(id) {
            continue;
        }
        state.mark_skipped(id);
        for edge in graph.out_edges(id) {
            if !visited.contains(edge.target.as_str()) {
                queue.push_back(edge.target.as_str());
            }
        }
    }
}
