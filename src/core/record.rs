//! Execution records - what a run reports back per node and overall

use super::workflow::WorkflowNode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Lifecycle of an executed node; skipped nodes never get a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Running,
    Success,
    Error,
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// One node execution, created at dispatch and finalized once
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeExecutionRecord {
    pub node_id: String,
    pub node_label: String,
    pub node_type: String,
    pub node_icon: String,
    pub node_color: String,
    pub status: ExecutionStatus,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub input: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NodeExecutionRecord {
    /// Fresh `running` record for a node about to be dispatched
    pub fn start(node: &WorkflowNode, input: Value) -> Self {
        Self {
            node_id: node.id.clone(),
            node_label: node.label.clone(),
            node_type: node.node_type.clone(),
            node_icon: node.icon.clone(),
            node_color: node.color.clone(),
            status: ExecutionStatus::Running,
            start_time: Utc::now(),
            end_time: None,
            duration_ms: None,
            input,
            output: None,
            error: None,
        }
    }

    pub fn succeed(mut self, output: Value) -> Self {
        self.status = ExecutionStatus::Success;
        self.output = Some(output);
        self.finish()
    }

    pub fn fail(mut self, error: impl Into<String>) -> Self {
        self.status = ExecutionStatus::Error;
        self.error = Some(error.into());
        self.finish()
    }

    fn finish(mut self) -> Self {
        let end = Utc::now();
        let elapsed = (end - self.start_time).num_milliseconds().max(0);
        self.end_time = Some(end);
        self.duration_ms = Some(elapsed as u64);
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Success
    }
}

/// Outcome of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub success: bool,
    /// Records in completion order
    pub executions: Vec<NodeExecutionRecord>,
    pub final_output: String,
    pub total_duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Nodes pruned or skipped, in the order they were marked
    #[serde(default)]
    pub skipped: Vec<String>,
    /// Nodes neither executed nor skipped: behind a cycle, or left over after a halt
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unreached: Vec<String>,
}

impl RunResult {
    pub fn total_duration(&self) -> Duration {
        Duration::from_millis(self.total_duration_ms)
    }

    /// Record for a node, if it was executed
    pub fn execution(&self, node_id: &str) -> Option<&NodeExecutionRecord> {
        self.executions.iter().find(|rec| rec.node_id == node_id)
    }

    pub fn was_executed(&self, node_id: &str) -> bool {
        self.execution(node_id).is_some()
    }

    pub fn was_skipped(&self, node_id: &str) -> bool {
        self.skipped.iter().any(|id| id == node_id)
    }

    /// Executed node ids in completion order
    pub fn executed_ids(&self) -> Vec<&str> {
        self.executions.iter().map(|rec| rec.node_id.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_lifecycle() {
        let node = WorkflowNode::new("t", "chatTrigger");
        let rec = NodeExecutionRecord::start(&node, Value::Null);
        assert_eq!(rec.status, ExecutionStatus::Running);
        assert_eq!(rec.node_label, "Chat Trigger");
        assert!(rec.end_time.is_none());

        let done = rec.clone().succeed(json!({"message": "hi"}));
        assert!(done.is_success());
        assert!(done.end_time.unwrap() >= done.start_time);
        assert!(done.duration_ms.is_some());

        let failed = rec.fail("boom");
        assert_eq!(failed.status, ExecutionStatus::Error);
        assert_eq!(failed.error.as_deref(), Some("boom"));
        assert!(failed.output.is_none());
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let node = WorkflowNode::new("t", "chatTrigger");
        let rec = NodeExecutionRecord::start(&node, Value::Null).succeed(json!(1));
        let json = serde_json::to_string(&rec).unwrap();
        assert!(json.contains("\"nodeId\":\"t\""));
        assert!(json.contains("\"status\":\"success\""));
        assert!(!json.contains("\"error\""));
    }
}
