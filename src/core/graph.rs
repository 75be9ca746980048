//! Graph model - adjacency view over a workflow, rebuilt for every run

use super::workflow::{Workflow, WorkflowEdge, WorkflowNode};
use std::collections::{HashMap, VecDeque};

/// Read-only view of a workflow with O(1) edge lookups
#[derive(Debug)]
pub struct Graph<'w> {
    nodes: Vec<&'w WorkflowNode>,
    index: HashMap<&'w str, usize>,
    out_edges: HashMap<&'w str, Vec<&'w WorkflowEdge>>,
    in_edges: HashMap<&'w str, Vec<&'w WorkflowEdge>>,
    dangling: usize,
}

impl<'w> Graph<'w> {
    /// Build adjacency maps; edges naming unknown nodes are dropped
    pub fn build(workflow: &'w Workflow) -> Self {
        let mut nodes = Vec::with_capacity(workflow.nodes.len());
        let mut index = HashMap::with_capacity(workflow.nodes.len());

        for node in &workflow.nodes {
            if index.contains_key(node.id.as_str()) {
                log::warn!("Duplicate node id '{}', keeping the first", node.id);
                continue;
            }
            index.insert(node.id.as_str(), nodes.len());
            nodes.push(node);
        }

        let mut out_edges: HashMap<&str, Vec<&WorkflowEdge>> = HashMap::new();
        let mut in_edges: HashMap<&str, Vec<&WorkflowEdge>> = HashMap::new();
        let mut dangling = 0;

        for edge in &workflow.edges {
            if !index.contains_key(edge.source.as_str()) || !index.contains_key(edge.target.as_str())
            {
                log::debug!("Ignoring dangling edge {} -> {}", edge.source, edge.target);
                dangling += 1;
                continue;
            }
            out_edges.entry(edge.source.as_str()).or_default().push(edge);
            in_edges.entry(edge.target.as_str()).or_default().push(edge);
        }

        Self {
            nodes,
            index,
            out_edges,
            in_edges,
            dangling,
        }
    }

    /// Nodes in document order
    pub fn nodes(&self) -> &[&'w WorkflowNode] {
        &self.nodes
    }

    pub fn node(&self, id: &str) -> Option<&'w WorkflowNode> {
        self.index.get(id).map(|&i| self.nodes[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn out_edges(&self, id: &str) -> &[&'w WorkflowEdge] {
        self.out_edges.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn in_edges(&self, id: &str) -> &[&'w WorkflowEdge] {
        self.in_edges.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn declared_outputs(&self, id: &str) -> Option<u32> {
        self.node(id).map(WorkflowNode::declared_outputs)
    }

    /// Number of edges dropped because an endpoint does not exist
    pub fn dangling_edges(&self) -> usize {
        self.dangling
    }

    /// Nodes without incoming edges, in document order
    pub fn start_nodes(&self) -> Vec<&'w str> {
        self.nodes
            .iter()
            .filter(|node| self.in_edges(&node.id).is_empty())
            .map(|node| node.id.as_str())
            .collect()
    }

    /// Nodes that can never become ready because they sit on or behind a cycle
    pub fn blocked_by_cycle(&self) -> Vec<&'w str> {
        let mut remaining: HashMap<&str, usize> = self
            .nodes
            .iter()
            .map(|node| (node.id.as_str(), self.in_edges(&node.id).len()))
            .collect();

        let mut queue: VecDeque<&str> = self.start_nodes().into_iter().collect();
        while let Some(id) = queue.pop_front() {
            for edge in self.out_edges(id) {
                if let Some(count) = remaining.get_mut(edge.target.as_str()) {
                    *count -= 1;
                    if *count == 0 {
                        queue.push_back(edge.target.as_str());
                    }
                }
            }
        }

        self.nodes
            .iter()
            .map(|node| node.id.as_str())
            .filter(|id| remaining.get(id).copied().unwrap_or(0) > 0)
            .collect()
    }
}
