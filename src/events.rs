//! Execution events - per-node progress for observers
//!
//! JSON-serializable so any consumer (chat UI, trace view, CLI) can follow
//! a run as it happens.

use crate::core::NodeExecutionRecord;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Emitted by the run loop; skipped nodes produce no events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "record", rename_all = "snake_case")]
pub enum ExecutionEvent {
    /// Node dispatched, record status is `running`
    NodeStarted(NodeExecutionRecord),
    /// Node finished with `success` or `error`
    NodeCompleted(NodeExecutionRecord),
}

impl ExecutionEvent {
    pub fn record(&self) -> &NodeExecutionRecord {
        match self {
            Self::NodeStarted(record) | Self::NodeCompleted(record) => record,
        }
    }

    /// Serialize to JSON line
    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Sending half handed to a run
pub type EventSender = mpsc::UnboundedSender<ExecutionEvent>;

/// Create an event channel for a run
pub fn channel() -> (EventSender, mpsc::UnboundedReceiver<ExecutionEvent>) {
    mpsc::unbounded_channel()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::WorkflowNode;
    use serde_json::Value;

    #[test]
    fn test_event_serialization() {
        let node = WorkflowNode::new("build", "codeExecutor");
        let event = ExecutionEvent::NodeStarted(NodeExecutionRecord::start(&node, Value::Null));
        let json = event.to_json_line();
        assert!(json.contains("node_started"));
        assert!(json.contains("\"nodeId\":\"build\""));
        assert!(json.contains("\"status\":\"running\""));

        let parsed: ExecutionEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.record().node_id, "build");
    }
}
