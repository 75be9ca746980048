//! NodeFlow CLI entry point

use anyhow::Result;
use clap::{Parser, Subcommand};
use nodeflow::core::Graph;
use nodeflow::events::{self, ExecutionEvent};
use nodeflow::{catalog, EngineConfig, ExecutionStatus, HandlerRegistry, RunOptions, Scheduler, Workflow};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "nodeflow", version, about = "Run node-graph workflows against a message")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a workflow file against a trigger message
    Run {
        /// Workflow file (.json, otherwise YAML)
        workflow: PathBuf,
        /// Trigger message
        #[arg(short, long, default_value = "")]
        message: String,
        /// Engine config file (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Per-node timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
        /// Stop at the first failing node
        #[arg(long)]
        halt_on_error: bool,
        /// Emit JSON lines instead of text
        #[arg(long)]
        json: bool,
    },
    /// Check a workflow for dangling edges, unknown types and cycles
    Validate {
        workflow: PathBuf,
    },
    /// List built-in node types
    Catalog,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run {
            workflow,
            message,
            config,
            timeout_ms,
            halt_on_error,
            json,
        } => {
            let mut engine_config = match config {
                Some(path) => EngineConfig::from_file(&path)?,
                None => EngineConfig::default(),
            };
            if timeout_ms.is_some() {
                engine_config.node_timeout_ms = timeout_ms;
            }
            if halt_on_error {
                engine_config.halt_on_error = true;
            }
            run(workflow, &message, engine_config, json).await
        }
        Command::Validate { workflow } => validate(workflow),
        Command::Catalog => {
            for def in catalog::all() {
                println!(
                    "{:<16} {:<9} in:{} out:{}  {}",
                    def.node_type, def.category, def.inputs, def.outputs, def.description
                );
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run(path: PathBuf, message: &str, config: EngineConfig, json: bool) -> Result<ExitCode> {
    log::info!("🚀 NodeFlow v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Loading workflow from: {}", path.display());
    let workflow = Workflow::from_file(&path)?;

    let scheduler = Scheduler::new(HandlerRegistry::with_builtins(), config);
    let (tx, mut rx) = events::channel();

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, cancelling run");
            ctrl_c.cancel();
        }
    });

    // Spawn event printer
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if json {
                println!("{}", event.to_json_line());
                continue;
            }
            match &event {
                ExecutionEvent::NodeStarted(rec) => {
                    println!("  ⚙  {} started", rec.node_label);
                }
                ExecutionEvent::NodeCompleted(rec) => match rec.status {
                    ExecutionStatus::Error => println!(
                        "  ✗  {} failed: {}",
                        rec.node_label,
                        rec.error.as_deref().unwrap_or("unknown error")
                    ),
                    _ => println!(
                        "  ✓  {} completed ({}ms)",
                        rec.node_label,
                        rec.duration_ms.unwrap_or(0)
                    ),
                },
            }
        }
    });

    let options = RunOptions::default().with_events(tx).with_cancel(cancel);
    let result = scheduler.run_with(&workflow, message, options).await;
    printer.await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        if !result.skipped.is_empty() {
            println!("  ⏭  skipped: {}", result.skipped.join(", "));
        }
        if let Some(err) = &result.error {
            println!("\n❌ {}", err);
        }
        println!("\n{}", result.final_output);
        println!("\n⏱  {}ms", result.total_duration_ms);
    }

    Ok(if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn validate(path: PathBuf) -> Result<ExitCode> {
    let workflow = Workflow::from_file(&path)?;
    let graph = Graph::build(&workflow);
    let registry = HandlerRegistry::with_builtins();
    let mut problems = 0;

    println!(
        "{} nodes, {} edges, {} start nodes",
        graph.len(),
        workflow.edges.len(),
        graph.start_nodes().len()
    );

    if graph.dangling_edges() > 0 {
        println!("⚠  {} dangling edge(s) will be ignored", graph.dangling_edges());
    }

    for node in graph.nodes() {
        if !registry.contains(&node.node_type) {
            println!("⚠  node '{}' has unknown type '{}'", node.id, node.node_type);
        }
    }

    let blocked = graph.blocked_by_cycle();
    if !blocked.is_empty() {
        println!("✗  never runnable (cycle): {}", blocked.join(", "));
        problems += 1;
    }

    if graph.is_empty() {
        println!("✗  workflow has no nodes");
        problems += 1;
    }

    Ok(if problems == 0 {
        println!("✓  ok");
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
