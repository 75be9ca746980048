use anyhow::Result;
use futures::future::BoxFuture;
use nodeflow::handlers::{conditional_fn, from_fn};
use nodeflow::{
    EngineConfig, ExecutionStatus, HandlerRegistry, NodeContext, NodeHandler, NodeOutcome,
    RunOptions, Scheduler, Workflow, WorkflowEdge, WorkflowNode,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn greeter(message_a: &str, message_b: &str) -> Workflow {
    Workflow::new(
        vec![
            WorkflowNode::new("trigger", "chatTrigger"),
            WorkflowNode::new("cond", "ifCondition")
                .with_config("field", "message")
                .with_config("operator", "contains")
                .with_config("value", "hello"),
            WorkflowNode::new("a", "sendMessage").with_config("message", message_a),
            WorkflowNode::new("b", "sendMessage").with_config("message", message_b),
        ],
        vec![
            WorkflowEdge::new("trigger", "cond"),
            WorkflowEdge::from_handle("cond", "true", "a"),
            WorkflowEdge::from_handle("cond", "false", "b"),
        ],
    )
}

#[tokio::test]
async fn test_condition_true_branch() {
    let wf = greeter("Welcome aboard", "Who are you?");
    let result = Scheduler::with_builtins().run(&wf, "hello there").await;

    assert!(result.success);
    assert_eq!(result.executed_ids(), vec!["trigger", "cond", "a"]);
    assert!(result.was_skipped("b"));
    assert!(!result.was_executed("b"));
    assert_eq!(result.final_output, "Welcome aboard");

    let cond = result.execution("cond").unwrap();
    assert_eq!(cond.output.as_ref().unwrap()["branch"], "true");
    // taken branch carries the conditional's output
    assert_eq!(result.execution("a").unwrap().input["branch"], "true");
}

#[tokio::test]
async fn test_condition_false_branch() {
    let wf = greeter("Welcome aboard", "Who are you?");
    let result = Scheduler::with_builtins().run(&wf, "good morning").await;

    assert_eq!(result.executed_ids(), vec!["trigger", "cond", "b"]);
    assert_eq!(result.skipped, vec!["a".to_string()]);
    assert_eq!(result.final_output, "Who are you?");
}

#[tokio::test]
async fn test_nested_conditional_in_pruned_branch_never_fires() {
    // trigger -> outer --true--> reply
    //                  --false-> inner --true--> side_effect
    //                                  --false-> other
    let fired = Arc::new(Mutex::new(Vec::<String>::new()));
    let mut registry = HandlerRegistry::with_builtins();
    let log = fired.clone();
    registry.register(
        "sideEffect",
        from_fn(move |ctx| {
            log.lock().unwrap().push(ctx.node_id.to_string());
            Ok(NodeOutcome::new(json!({"message": "side effect"})))
        }),
    );

    let wf = Workflow::new(
        vec![
            WorkflowNode::new("trigger", "chatTrigger"),
            WorkflowNode::new("outer", "ifCondition")
                .with_config("operator", "is_not_empty"),
            WorkflowNode::new("reply", "sendMessage").with_config("message", "done"),
            WorkflowNode::new("inner", "ifCondition").with_config("operator", "is_empty"),
            WorkflowNode::new("side_effect", "sideEffect"),
            WorkflowNode::new("other", "sideEffect"),
        ],
        vec![
            WorkflowEdge::new("trigger", "outer"),
            WorkflowEdge::from_handle("outer", "true", "reply"),
            WorkflowEdge::from_handle("outer", "false", "inner"),
            WorkflowEdge::from_handle("inner", "true", "side_effect"),
            WorkflowEdge::from_handle("inner", "false", "other"),
        ],
    );

    let result = Scheduler::new(registry, EngineConfig::default())
        .run(&wf, "anything")
        .await;

    assert_eq!(result.executed_ids(), vec!["trigger", "outer", "reply"]);
    for id in ["inner", "side_effect", "other"] {
        assert!(result.was_skipped(id), "{} should be skipped", id);
    }
    assert!(fired.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_pruned_reachability_beats_live_path() {
    // join is reachable from both branches; the untaken one wins
    let wf = Workflow::new(
        vec![
            WorkflowNode::new("trigger", "chatTrigger"),
            WorkflowNode::new("cond", "ifCondition").with_config("operator", "is_not_empty"),
            WorkflowNode::new("yes", "setVariable"),
            WorkflowNode::new("no", "setVariable"),
            WorkflowNode::new("join", "mergeNode"),
            WorkflowNode::new("after", "sendMessage"),
        ],
        vec![
            WorkflowEdge::new("trigger", "cond"),
            WorkflowEdge::from_handle("cond", "true", "yes"),
            WorkflowEdge::from_handle("cond", "false", "no"),
            WorkflowEdge::new("yes", "join"),
            WorkflowEdge::new("no", "join"),
            WorkflowEdge::new("join", "after"),
        ],
    );

    let result = Scheduler::with_builtins().run(&wf, "hi").await;
    assert_eq!(result.executed_ids(), vec!["trigger", "cond", "yes"]);
    assert!(result.was_skipped("join"));
    assert!(result.was_skipped("after"));
    assert!(result.unreached.is_empty());
}

#[tokio::test]
async fn test_pruning_is_transitive() {
    let wf = Workflow::new(
        vec![
            WorkflowNode::new("t", "chatTrigger"),
            WorkflowNode::new("cond", "ifCondition").with_config("operator", "is_empty"),
            WorkflowNode::new("x", "setVariable"),
            WorkflowNode::new("y", "setVariable"),
        ],
        vec![
            WorkflowEdge::new("t", "cond"),
            WorkflowEdge::from_handle("cond", "true", "x"),
            WorkflowEdge::new("x", "y"),
        ],
    );

    let result = Scheduler::with_builtins().run(&wf, "not empty").await;
    assert_eq!(result.executed_ids(), vec!["t", "cond"]);
    assert_eq!(result.skipped, vec!["x".to_string(), "y".to_string()]);
    // last success is the conditional itself; its "result" is a bool so the dump is used
    assert!(result.final_output.contains("\"branch\": \"false\""));
}

#[tokio::test]
async fn test_merge_reads_single_predecessor() {
    let wf = Workflow::new(
        vec![
            WorkflowNode::new("left", "setVariable")
                .with_config("name", "left")
                .with_config("value", "L"),
            WorkflowNode::new("right", "setVariable")
                .with_config("name", "right")
                .with_config("value", "R"),
            WorkflowNode::new("merge", "mergeNode"),
        ],
        vec![
            WorkflowEdge::new("left", "merge"),
            WorkflowEdge::new("right", "merge"),
        ],
    );

    let result = Scheduler::with_builtins().run(&wf, "x").await;
    assert_eq!(result.executed_ids(), vec!["left", "right", "merge"]);

    let left = result.execution("left").unwrap().output.clone().unwrap();
    let right = result.execution("right").unwrap().output.clone().unwrap();
    let merge = result.execution("merge").unwrap();
    // left completes first, so its output is the one merge reads
    assert_eq!(merge.input, left);
    assert_ne!(merge.input, right);

    // the merge handler itself still sees both live predecessors
    let output = merge.output.as_ref().unwrap();
    assert_eq!(output["mergedItems"], 2);
}

#[tokio::test]
async fn test_failed_predecessor_feeds_null() {
    let mut registry = HandlerRegistry::with_builtins();
    registry.register("flaky", from_fn(|_| Err(anyhow::anyhow!("upstream down"))));

    let wf = Workflow::new(
        vec![
            WorkflowNode::new("t", "chatTrigger"),
            WorkflowNode::new("call", "flaky"),
            WorkflowNode::new("reply", "sendMessage").with_config("message", "sorry"),
        ],
        vec![WorkflowEdge::new("t", "call"), WorkflowEdge::new("call", "reply")],
    );

    let result = Scheduler::new(registry, EngineConfig::default())
        .run(&wf, "hi")
        .await;

    assert!(result.success);
    let call = result.execution("call").unwrap();
    assert_eq!(call.status, ExecutionStatus::Error);
    assert_eq!(call.error.as_deref(), Some("upstream down"));

    let reply = result.execution("reply").unwrap();
    assert_eq!(reply.status, ExecutionStatus::Success);
    assert_eq!(reply.input, Value::Null);
    assert_eq!(result.final_output, "sorry");
}

#[tokio::test]
async fn test_no_success_still_reports_success() {
    let mut registry = HandlerRegistry::new();
    registry.register("bad", from_fn(|_| Err(anyhow::anyhow!("nope"))));
    let wf = Workflow::new(vec![WorkflowNode::new("only", "bad")], vec![]);

    let result = Scheduler::new(registry, EngineConfig::default())
        .run(&wf, "hi")
        .await;
    assert!(result.success);
    assert_eq!(result.final_output, "");
    assert!(result.error.is_none());
}

#[tokio::test]
async fn test_dangling_edges_are_ignored() {
    let mut wf = greeter("yes", "no");
    wf.edges.push(WorkflowEdge::new("ghost", "a"));
    wf.edges.push(WorkflowEdge::new("a", "nowhere"));

    let result = Scheduler::with_builtins().run(&wf, "hello").await;
    assert!(result.success);
    assert_eq!(result.executed_ids(), vec!["trigger", "cond", "a"]);
}

struct Slow;

impl NodeHandler for Slow {
    fn run<'a>(&'a self, ctx: NodeContext<'a>) -> BoxFuture<'a, Result<NodeOutcome>> {
        Box::pin(async move {
            tokio::select! {
                _ = ctx.cancel.cancelled() => Err(anyhow::anyhow!("stopped")),
                _ = tokio::time::sleep(Duration::from_secs(30)) => Ok(NodeOutcome::new(Value::Null)),
            }
        })
    }
}

#[tokio::test]
async fn test_timeout_is_an_error_and_traversal_continues() {
    let mut registry = HandlerRegistry::with_builtins();
    registry.register("slow", Arc::new(Slow));
    let config = EngineConfig::default().with_node_timeout(Duration::from_millis(50));

    let wf = Workflow::new(
        vec![
            WorkflowNode::new("t", "chatTrigger"),
            WorkflowNode::new("slow", "slow"),
            WorkflowNode::new("after", "sendMessage").with_config("message", "late"),
        ],
        vec![WorkflowEdge::new("t", "slow"), WorkflowEdge::new("slow", "after")],
    );

    let result = Scheduler::new(registry, config).run(&wf, "hi").await;
    let slow = result.execution("slow").unwrap();
    assert_eq!(slow.status, ExecutionStatus::Error);
    assert_eq!(slow.error.as_deref(), Some("timed out after 50ms"));
    assert!(result.was_executed("after"));
}

#[tokio::test]
async fn test_cancel_mid_run() {
    let mut registry = HandlerRegistry::with_builtins();
    registry.register("slow", Arc::new(Slow));

    let wf = Workflow::new(
        vec![
            WorkflowNode::new("t", "chatTrigger"),
            WorkflowNode::new("slow", "slow"),
            WorkflowNode::new("after", "sendMessage"),
        ],
        vec![WorkflowEdge::new("t", "slow"), WorkflowEdge::new("slow", "after")],
    );

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        trigger.cancel();
    });

    let scheduler = Scheduler::new(registry, EngineConfig::default());
    let result = scheduler
        .run_with(&wf, "hi", RunOptions::default().with_cancel(cancel))
        .await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Run cancelled"));
    assert_eq!(result.execution("slow").unwrap().error.as_deref(), Some("cancelled"));
    assert!(!result.was_executed("after"));
    assert_eq!(result.unreached, vec!["after".to_string()]);
}

#[tokio::test]
async fn test_random_dags_partition_every_node() {
    let mut registry = HandlerRegistry::new();
    registry.register("work", from_fn(|ctx| Ok(NodeOutcome::new(json!({"result": ctx.node_id})))));
    registry.register(
        "branch",
        conditional_fn(|ctx| {
            let label = if ctx.node_id.len() % 2 == 0 { "true" } else { "false" };
            Ok(NodeOutcome::new(json!({"branch": label})).with_branch(label))
        }),
    );
    registry.register("fail", from_fn(|_| Err(anyhow::anyhow!("fail"))));
    let scheduler = Scheduler::new(registry, EngineConfig::default());

    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..60 {
        let size = rng.gen_range(3..13);
        let nodes: Vec<WorkflowNode> = (0..size)
            .map(|i| {
                let kind = match rng.gen_range(0..6) {
                    0 => "branch",
                    1 => "fail",
                    _ => "work",
                };
                WorkflowNode::new(format!("n{}", i), kind)
            })
            .collect();

        let mut edges = Vec::new();
        for i in 0..size {
            for j in (i + 1)..size {
                if rng.gen_bool(0.3) {
                    let handle = if nodes[i].node_type == "branch" {
                        Some(if rng.gen_bool(0.5) { "true" } else { "false" }.to_string())
                    } else {
                        None
                    };
                    edges.push(WorkflowEdge {
                        id: None,
                        source: nodes[i].id.clone(),
                        target: nodes[j].id.clone(),
                        source_handle: handle,
                    });
                }
            }
        }

        let wf = Workflow::new(nodes, edges);
        let result = scheduler.run(&wf, "msg").await;

        let executed: HashSet<&str> = result.executed_ids().into_iter().collect();
        let skipped: HashSet<&str> = result.skipped.iter().map(String::as_str).collect();

        assert_eq!(executed.len(), result.executions.len(), "node executed twice");
        assert!(executed.is_disjoint(&skipped));
        assert!(result.unreached.is_empty());
        assert_eq!(executed.len() + skipped.len(), wf.nodes.len());
    }
}
