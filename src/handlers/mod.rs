//! Node handlers - the pluggable work each node type performs
//!
//! The engine only knows the [`NodeHandler`] contract: given the resolved
//! input, the trigger message and the node config, produce a structured
//! output and, for conditional nodes, the label of the branch to follow.

mod builtin;
mod condition;

pub use builtin::canned_reply;
pub use condition::{evaluate_condition, IfConditionHandler};

use crate::core::NodeConfig;
use anyhow::Result;
use futures::future::{self, BoxFuture};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Everything a handler gets to see for one invocation
#[derive(Debug, Clone, Copy)]
pub struct NodeContext<'a> {
    pub node_id: &'a str,
    pub node_type: &'a str,
    /// Single resolved input; `Null` for start nodes and after an upstream error
    pub input: &'a Value,
    /// Outputs of every executed predecessor, in edge order
    pub predecessors: &'a [(String, Value)],
    /// The message that triggered the run
    pub trigger: &'a str,
    pub config: &'a NodeConfig,
    pub cancel: &'a CancellationToken,
}

impl NodeContext<'_> {
    /// String config value, `None` when missing, not a string or empty
    pub fn config_str(&self, key: &str) -> Option<&str> {
        self.config
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Config value, `None` when missing or null
    pub fn config_value(&self, key: &str) -> Option<&Value> {
        self.config.get(key).filter(|v| !v.is_null())
    }
}

/// Result of a successful handler call
#[derive(Debug, Clone, PartialEq)]
pub struct NodeOutcome {
    pub output: Value,
    /// Chosen output port for conditional nodes
    pub branch: Option<String>,
}

impl NodeOutcome {
    pub fn new(output: Value) -> Self {
        Self {
            output,
            branch: None,
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }
}

/// Work performed by one node type
pub trait NodeHandler: Send + Sync {
    /// Run the node. Must accept a `Null` input.
    fn run<'a>(&'a self, ctx: NodeContext<'a>) -> BoxFuture<'a, Result<NodeOutcome>>;

    /// Conditional handlers pick one outgoing port; the others are pruned
    fn is_conditional(&self) -> bool {
        false
    }
}

/// Adapter turning a synchronous closure into a handler
pub struct FnHandler<F> {
    f: F,
    conditional: bool,
}

impl<F> NodeHandler for FnHandler<F>
where
    F: Fn(&NodeContext<'_>) -> Result<NodeOutcome> + Send + Sync,
{
    fn run<'a>(&'a self, ctx: NodeContext<'a>) -> BoxFuture<'a, Result<NodeOutcome>> {
        Box::pin(future::ready((self.f)(&ctx)))
    }

    fn is_conditional(&self) -> bool {
        self.conditional
    }
}

/// Wrap a synchronous function as a plain handler
pub fn from_fn<F>(f: F) -> Arc<dyn NodeHandler>
where
    F: Fn(&NodeContext<'_>) -> Result<NodeOutcome> + Send + Sync + 'static,
{
    Arc::new(FnHandler {
        f,
        conditional: false,
    })
}

/// Wrap a synchronous function as a conditional handler
pub fn conditional_fn<F>(f: F) -> Arc<dyn NodeHandler>
where
    F: Fn(&NodeContext<'_>) -> Result<NodeOutcome> + Send + Sync + 'static,
{
    Arc::new(FnHandler {
        f,
        conditional: true,
    })
}

/// Maps node `type` to its handler
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn NodeHandler>>,
    fallback: Option<Arc<dyn NodeHandler>>,
}

impl HandlerRegistry {
    /// Empty registry without a fallback
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in node type and a pass-through fallback
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtin::register_all(&mut registry);
        registry.register("ifCondition", Arc::new(IfConditionHandler));
        registry.set_fallback(from_fn(builtin::passthrough));
        registry
    }

    /// Register (or replace) the handler for a node type
    pub fn register(&mut self, node_type: impl Into<String>, handler: Arc<dyn NodeHandler>) {
        self.handlers.insert(node_type.into(), handler);
    }

    /// Handler used for types without a registration
    pub fn set_fallback(&mut self, handler: Arc<dyn NodeHandler>) {
        self.fallback = Some(handler);
    }

    pub fn resolve(&self, node_type: &str) -> Option<Arc<dyn NodeHandler>> {
        self.handlers
            .get(node_type)
            .or(self.fallback.as_ref())
            .cloned()
    }

    pub fn contains(&self, node_type: &str) -> bool {
        self.handlers.contains_key(node_type)
    }

    /// Registered types, sorted
    pub fn types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("types", &self.types())
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}
