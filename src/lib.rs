//! NodeFlow - node-graph workflow engine
//!
//! Runs a directed graph of typed nodes (triggers, agents, tools,
//! conditionals, actions) against a single input message, reporting
//! per-node progress and a final textual result.

pub mod catalog;
pub mod config;
pub mod core;
pub mod error;
pub mod events;
pub mod handlers;

// Re-exports
pub use config::EngineConfig;
pub use self::core::{
    ExecutionStatus, Graph, NodeExecutionRecord, RunOptions, RunResult, Scheduler, Workflow,
    WorkflowEdge, WorkflowNode,
};
pub use error::NodeError;
pub use events::ExecutionEvent;
pub use handlers::{HandlerRegistry, NodeContext, NodeHandler, NodeOutcome};

/// Result type alias
pub type Result<T> = anyhow::Result<T>;
