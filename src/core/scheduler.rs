//! Scheduler - the run loop driving a workflow from its start nodes to completion
//!
//! One handler is in flight at a time. Independent start nodes run strictly
//! in queue order; nothing is parallelized.

use super::graph::Graph;
use super::readiness::{self, Verdict};
use super::record::{NodeExecutionRecord, RunResult};
use super::state::RunState;
use super::workflow::{Workflow, WorkflowNode};
use super::{aggregate, executor, pruner};
use crate::config::EngineConfig;
use crate::error::NodeError;
use crate::events::{EventSender, ExecutionEvent};
use crate::handlers::{HandlerRegistry, NodeContext, NodeHandler};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Final output reported for a workflow without nodes
pub const EMPTY_WORKFLOW_MESSAGE: &str = "No nodes in the workflow. Please add nodes first.";

const CANCELLED_MESSAGE: &str = "Run cancelled";

/// Per-run hooks: where to send events and how to stop early
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub events: Option<EventSender>,
    pub cancel: CancellationToken,
}

impl RunOptions {
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    fn emit(&self, event: ExecutionEvent) {
        if let Some(tx) = &self.events {
            // a dropped receiver must not affect the run
            let _ = tx.send(event);
        }
    }
}

/// Workflow scheduler with dependency resolution and branch pruning
#[derive(Debug, Clone)]
pub struct Scheduler {
    registry: Arc<HandlerRegistry>,
    config: EngineConfig,
}

impl Scheduler {
    /// Create a new scheduler
    pub fn new(registry: HandlerRegistry, config: EngineConfig) -> Self {
        Self {
            registry: Arc::new(registry),
            config,
        }
    }

    /// Scheduler with the built-in handlers and default config
    pub fn with_builtins() -> Self {
        Self::new(HandlerRegistry::with_builtins(), EngineConfig::default())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Run a workflow against a trigger message without observers
    pub async fn run(&self, workflow: &Workflow, message: &str) -> RunResult {
        self.run_with(workflow, message, RunOptions::default()).await
    }

    /// Run a workflow, streaming events and honoring cancellation
    pub async fn run_with(
        &self,
        workflow: &Workflow,
        message: &str,
        options: RunOptions,
    ) -> RunResult {
        if workflow.is_empty() {
            log::warn!("Refusing to run an empty workflow");
            return RunResult {
                success: false,
                executions: Vec::new(),
                final_output: EMPTY_WORKFLOW_MESSAGE.to_string(),
                total_duration_ms: 0,
                error: Some("Empty workflow".to_string()),
                skipped: Vec::new(),
                unreached: Vec::new(),
            };
        }

        let started = Instant::now();
        let graph = Graph::build(workflow);
        let handlers = self.resolve_handlers(&graph);
        let mut state = RunState::new(&graph);

        log::info!(
            "Running workflow{}: {} nodes, {} start nodes",
            workflow
                .name
                .as_deref()
                .map(|name| format!(" '{}'", name))
                .unwrap_or_default(),
            graph.len(),
            state.pending.len()
        );

        let mut halted: Option<String> = None;

        while let Some((id, carried)) = state.pending.pop_front() {
            if options.cancel.is_cancelled() {
                halted = Some(CANCELLED_MESSAGE.to_string());
                break;
            }

            match readiness::assess(&graph, &state, id, carried) {
                Verdict::Done => continue,
                Verdict::Wait => {
                    // release only queues a node once its counter hits zero
                    log::warn!(
                        "Node '{}' was queued with predecessors still pending; dropping it",
                        id
                    );
                    debug_assert!(false, "node '{}' queued before it was ready", id);
                }
                Verdict::Skip => {
                    log::debug!("Skipping '{}': all predecessors skipped", id);
                    state.mark_skipped(id);
                    state.release_successors(&graph, id, &Value::Null);
                }
                Verdict::Dispatch {
                    input,
                    predecessors,
                } => {
                    let Some(node) = graph.node(id) else {
                        continue;
                    };
                    let handler = handlers.get(id).and_then(Option::as_ref);

                    let failure = self
                        .dispatch(
                            &graph,
                            &mut state,
                            node,
                            handler,
                            input,
                            &predecessors,
                            message,
                            &options,
                        )
                        .await;

                    match failure {
                        Some(NodeError::Cancelled) => {
                            halted = Some(CANCELLED_MESSAGE.to_string());
                            break;
                        }
                        Some(err) if self.config.halt_on_error => {
                            halted = Some(format!("Halted after node '{}' failed: {}", id, err));
                            break;
                        }
                        _ => {}
                    }
                }
            }
        }

        let unreached = state.unreached(&graph);
        if halted.is_none() && !unreached.is_empty() {
            log::warn!(
                "{} node(s) never became ready, likely a cycle: {}",
                unreached.len(),
                unreached.join(", ")
            );
        }

        let final_output = aggregate::final_output(&state.executions);
        let total_duration_ms = started.elapsed().as_millis() as u64;

        log::info!(
            "Workflow finished in {}ms: {} executed, {} skipped",
            total_duration_ms,
            state.executions.len(),
            state.skip_order.len()
        );

        RunResult {
            success: halted.is_none(),
            final_output,
            total_duration_ms,
            error: halted,
            skipped: state.skip_order.iter().map(|id| id.to_string()).collect(),
            unreached,
            executions: state.executions,
        }
    }

    /// Resolve every node's handler once, before the loop starts
    fn resolve_handlers<'w>(&self, graph: &Graph<'w>) -> HashMap<&'w str, Option<Arc<dyn NodeHandler>>> {
        graph
            .nodes()
            .iter()
            .map(|node| {
                let handler = self.registry.resolve(&node.node_type);
                if handler.is_none() {
                    log::warn!(
                        "No handler for node '{}' of type '{}'",
                        node.id,
                        node.node_type
                    );
                }
                (node.id.as_str(), handler)
            })
            .collect()
    }

    /// Execute one node, record it and release its successors.
    /// Returns the failure, if any.
    #[allow(clippy::too_many_arguments)]
    async fn dispatch<'w>(
        &self,
        graph: &Graph<'w>,
        state: &mut RunState<'w>,
        node: &'w WorkflowNode,
        handler: Option<&Arc<dyn NodeHandler>>,
        input: Value,
        predecessors: &[(String, Value)],
        message: &str,
        options: &RunOptions,
    ) -> Option<NodeError> {
        let id = node.id.as_str();
        let record = NodeExecutionRecord::start(node, input.clone());
        options.emit(ExecutionEvent::NodeStarted(record.clone()));
        log::debug!("Starting node '{}' ({})", id, node.node_type);

        let result = match handler {
            Some(handler) => {
                let ctx = NodeContext {
                    node_id: id,
                    node_type: &node.node_type,
                    input: &input,
                    predecessors,
                    trigger: message,
                    config: &node.config,
                    cancel: &options.cancel,
                };
                executor::invoke(handler.as_ref(), ctx, self.config.node_timeout()).await
            }
            None => Err(NodeError::NoHandler(node.node_type.clone())),
        };

        state.executed.insert(id);

        let (record, carried, branch, failure) = match result {
            Ok(outcome) => {
                state.outputs.insert(id, outcome.output.clone());
                let record = record.succeed(outcome.output.clone());
                (record, outcome.output, outcome.branch, None)
            }
            Err(err) => {
                log::warn!("Node '{}' failed: {}", id, err);
                let record = record.fail(err.to_string());
                (record, Value::Null, None, Some(err))
            }
        };

        log::debug!(
            "Node '{}' finished: {} in {}ms",
            id,
            record.status,
            record.duration_ms.unwrap_or(0)
        );
        options.emit(ExecutionEvent::NodeCompleted(record.clone()));
        state.executions.push(record);

        if failure == Some(NodeError::Cancelled) {
            return failure;
        }

        let conditional = handler.map(|h| h.is_conditional()).unwrap_or(false);
        if conditional {
            pruner::route(graph, state, id, branch.as_deref().unwrap_or(""), &carried);
        } else {
            state.release_successors(graph, id, &carried);
        }

        failure
    }
}
