//! Built-in mock handlers for the catalog node types
//!
//! Outputs are deterministic stand-ins for the real integrations (models,
//! search, HTTP, email). They never sleep and never fail.

use super::{from_fn, HandlerRegistry, NodeContext, NodeOutcome};
use anyhow::Result;
use chrono::Utc;
use serde_json::{json, Value};

pub(super) fn register_all(registry: &mut HandlerRegistry) {
    for trigger_type in ["chatTrigger", "webhookTrigger", "scheduleTrigger"] {
        registry.register(trigger_type, from_fn(trigger));
    }
    registry.register("aiAgent", from_fn(ai_agent));
    registry.register("openaiModel", from_fn(openai_model));
    registry.register("anthropicModel", from_fn(anthropic_model));
    registry.register("windowMemory", from_fn(window_memory));
    registry.register("serpApi", from_fn(serp_api));
    registry.register("httpRequest", from_fn(http_request));
    registry.register("codeExecutor", from_fn(code_executor));
    registry.register("callWorkflow", from_fn(call_workflow));
    registry.register("switchNode", from_fn(switch_node));
    registry.register("mergeNode", from_fn(merge_node));
    registry.register("sendMessage", from_fn(send_message));
    registry.register("emailAction", from_fn(email_action));
    registry.register("setVariable", from_fn(set_variable));
    registry.register("jsonParse", from_fn(json_parse));
}

fn preview(message: &str, max_chars: usize) -> String {
    message.chars().take(max_chars).collect()
}

/// Keyword-driven canned assistant reply
pub fn canned_reply(message: &str) -> String {
    let msg = message.to_lowercase();

    if msg.contains("hello") || msg.contains("hi") || msg.contains("hey") {
        return "Hello! 👋 I'm your intelligent assistant. How can I help you?".to_string();
    }
    if msg.contains("help") {
        return "Sure! I can help you with:\n• Answering questions\n• Searching for information\n• Processing data\n• Running automated tasks\n\nWhat would you like me to do?".to_string();
    }
    if msg.contains("workflow") {
        return "Your workflow has been executed successfully! ✅ All nodes were processed correctly and the final output is ready.".to_string();
    }
    if msg.contains("search") {
        return "Search completed! 🔍 Relevant results found. Information has been gathered and processed from reliable sources.".to_string();
    }
    if msg.contains("code") {
        return "```javascript\nconst result = await processData(input);\nconsole.log('Processed:', result);\n```\nCode executed successfully! ✅".to_string();
    }
    if msg.contains("test") {
        return "Workflow test completed successfully! ✅\n\n📊 Results:\n• All nodes: Passed\n• Execution time: Fast\n• Errors: None\n• Status: Ready for production".to_string();
    }

    format!(
        "Your message received: \"{}\"\n\nProcessing completed successfully. Do you have any other questions?",
        message
    )
}

fn trigger(ctx: &NodeContext<'_>) -> Result<NodeOutcome> {
    Ok(NodeOutcome::new(json!({
        "message": ctx.trigger,
        "timestamp": Utc::now().to_rfc3339(),
    })))
}

fn ai_agent(ctx: &NodeContext<'_>) -> Result<NodeOutcome> {
    let response = canned_reply(ctx.trigger);
    Ok(NodeOutcome::new(json!({
        "response": response,
        "tokensUsed": 100 + response.len(),
        "model": ctx.config_str("agentType").unwrap_or("tools"),
    })))
}

fn openai_model(ctx: &NodeContext<'_>) -> Result<NodeOutcome> {
    let model = ctx.config_str("model").unwrap_or("gpt-4o");
    let prompt = preview(ctx.trigger, 50);
    Ok(NodeOutcome::new(json!({
        "model": model,
        "response": format!("[{}] Processing: \"{}...\"", model, prompt),
        "tokens": { "prompt": 50 + prompt.len(), "completion": 100 },
    })))
}

fn anthropic_model(ctx: &NodeContext<'_>) -> Result<NodeOutcome> {
    let prompt = preview(ctx.trigger, 50);
    Ok(NodeOutcome::new(json!({
        "model": ctx.config_str("model").unwrap_or("claude-sonnet-4-20250514"),
        "response": format!("[Claude] Analyzing: \"{}...\"", prompt),
        "tokens": { "input": 50 + prompt.len(), "output": 100 },
    })))
}

fn window_memory(ctx: &NodeContext<'_>) -> Result<NodeOutcome> {
    let window_size = ctx.config_value("windowSize").cloned().unwrap_or(json!(5));
    Ok(NodeOutcome::new(json!({
        "memoryStored": true,
        "windowSize": window_size,
        "messagesInBuffer": 1,
    })))
}

fn serp_api(ctx: &NodeContext<'_>) -> Result<NodeOutcome> {
    Ok(NodeOutcome::new(json!({
        "results": [
            {
                "title": format!("Search result for: {}", preview(ctx.trigger, 30)),
                "url": "https://example.com/1",
                "snippet": "Relevant information found...",
            },
            {
                "title": "Related article",
                "url": "https://example.com/2",
                "snippet": "Additional context...",
            },
        ],
        "totalResults": 2,
    })))
}

fn http_request(ctx: &NodeContext<'_>) -> Result<NodeOutcome> {
    Ok(NodeOutcome::new(json!({
        "status": 200,
        "method": ctx.config_str("method").unwrap_or("GET"),
        "url": ctx.config_str("url"),
        "data": { "success": true, "message": "Request completed" },
        "headers": { "content-type": "application/json" },
    })))
}

fn code_executor(ctx: &NodeContext<'_>) -> Result<NodeOutcome> {
    Ok(NodeOutcome::new(json!({
        "result": "Code executed successfully",
        "language": ctx.config_str("language").unwrap_or("javascript"),
        "executionTime": "0ms",
    })))
}

fn call_workflow(ctx: &NodeContext<'_>) -> Result<NodeOutcome> {
    Ok(NodeOutcome::new(json!({
        "workflowId": ctx.config_str("workflowId").unwrap_or("sub-workflow-1"),
        "status": "completed",
        "result": { "processed": true },
    })))
}

fn switch_node(ctx: &NodeContext<'_>) -> Result<NodeOutcome> {
    Ok(NodeOutcome::new(json!({
        "matchedRoute": 0,
        "field": ctx.config_str("field").unwrap_or("status"),
        "value": "active",
    })))
}

fn merge_node(ctx: &NodeContext<'_>) -> Result<NodeOutcome> {
    let items: Vec<&Value> = ctx.predecessors.iter().map(|(_, output)| output).collect();
    Ok(NodeOutcome::new(json!({
        "mergedItems": items.len(),
        "mode": ctx.config_str("mode").unwrap_or("append"),
        "items": items,
    })))
}

fn send_message(ctx: &NodeContext<'_>) -> Result<NodeOutcome> {
    let message = ctx
        .config_str("message")
        .map(str::to_string)
        .unwrap_or_else(|| canned_reply(ctx.trigger));
    Ok(NodeOutcome::new(json!({
        "sent": true,
        "type": ctx.config_str("messageType").unwrap_or("success"),
        "message": message,
    })))
}

fn email_action(ctx: &NodeContext<'_>) -> Result<NodeOutcome> {
    Ok(NodeOutcome::new(json!({
        "sent": true,
        "to": ctx.config_str("to").unwrap_or("user@example.com"),
        "subject": ctx.config_str("subject").unwrap_or("Notification"),
    })))
}

fn set_variable(ctx: &NodeContext<'_>) -> Result<NodeOutcome> {
    Ok(NodeOutcome::new(json!({
        "variable": ctx.config_str("name").unwrap_or("var1"),
        "value": ctx.config_str("value").unwrap_or(ctx.trigger),
        "set": true,
    })))
}

fn json_parse(ctx: &NodeContext<'_>) -> Result<NodeOutcome> {
    Ok(NodeOutcome::new(json!({
        "parsed": true,
        "field": ctx.config_str("field").unwrap_or("data"),
        "result": { "key": "value" },
    })))
}

pub(super) fn passthrough(_ctx: &NodeContext<'_>) -> Result<NodeOutcome> {
    Ok(NodeOutcome::new(json!({ "processed": true })))
}
