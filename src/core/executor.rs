//! Node executor - invokes one handler under timeout and cancellation

use crate::error::NodeError;
use crate::handlers::{NodeContext, NodeHandler, NodeOutcome};
use std::time::Duration;

/// Run a handler to completion, racing it against the run's cancellation
/// token and the optional per-node timeout.
pub async fn invoke(
    handler: &dyn NodeHandler,
    ctx: NodeContext<'_>,
    timeout: Option<Duration>,
) -> Result<NodeOutcome, NodeError> {
    let cancel = ctx.cancel.clone();
    let call = async {
        match timeout {
            Some(limit) => match tokio::time::timeout(limit, handler.run(ctx)).await {
                Ok(result) => result.map_err(NodeError::from),
                Err(_) => Err(NodeError::Timeout(limit)),
            },
            None => handler.run(ctx).await.map_err(NodeError::from),
        }
    };

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(NodeError::Cancelled),
        result = call => result,
    }
}
