//! Engine-side failure reasons recorded on node executions

use std::time::Duration;
use thiserror::Error;

/// Why a node ended in `error` status
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NodeError {
    #[error("{0}")]
    Failed(String),

    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("cancelled")]
    Cancelled,

    #[error("no handler registered for node type '{0}'")]
    NoHandler(String),
}

impl From<anyhow::Error> for NodeError {
    fn from(err: anyhow::Error) -> Self {
        // alternate format keeps the context chain on one line
        Self::Failed(format!("{:#}", err))
    }
}
