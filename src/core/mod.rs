//! Core engine - graph model, readiness, branch pruning and the run loop

mod aggregate;
mod executor;
mod graph;
mod pruner;
mod readiness;
mod record;
mod scheduler;
mod state;
mod workflow;

pub use aggregate::{extract_text, final_output};
pub use graph::Graph;
pub use record::{ExecutionStatus, NodeExecutionRecord, RunResult};
pub use scheduler::{RunOptions, Scheduler, EMPTY_WORKFLOW_MESSAGE};
pub use workflow::{NodeConfig, Workflow, WorkflowEdge, WorkflowNode};
