//! Node catalog - static definitions of the built-in node types
//!
//! Supplies display metadata, arity and default configuration. The engine
//! itself only reads the type, config and output count of each node.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Palette category of a node type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeCategory {
    Triggers,
    Ai,
    Tools,
    Flow,
    Actions,
    Data,
}

impl fmt::Display for NodeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Triggers => "triggers",
            Self::Ai => "ai",
            Self::Tools => "tools",
            Self::Flow => "flow",
            Self::Actions => "actions",
            Self::Data => "data",
        };
        f.pad(name)
    }
}

/// Default value of a config field
#[derive(Debug, Clone, Copy)]
pub enum DefaultValue {
    Str(&'static str),
    Int(i64),
    Float(f64),
}

impl From<DefaultValue> for Value {
    fn from(value: DefaultValue) -> Self {
        match value {
            DefaultValue::Str(s) => Value::from(s),
            DefaultValue::Int(i) => Value::from(i),
            DefaultValue::Float(f) => Value::from(f),
        }
    }
}

/// Static definition of one node type
#[derive(Debug, Clone, Copy)]
pub struct NodeDefinition {
    pub node_type: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub category: NodeCategory,
    pub icon: &'static str,
    pub color: &'static str,
    pub inputs: u32,
    pub outputs: u32,
    pub defaults: &'static [(&'static str, DefaultValue)],
}

impl NodeDefinition {
    /// Default config entries as JSON values
    pub fn default_config(&self) -> Vec<(String, Value)> {
        self.defaults
            .iter()
            .map(|(key, value)| (key.to_string(), Value::from(*value)))
            .collect()
    }
}

const TRIGGER_COLOR: &str = "#7c3aed";
const AI_COLOR: &str = "#ea580c";
const TOOLS_COLOR: &str = "#0284c7";
const FLOW_COLOR: &str = "#16a34a";
const ACTIONS_COLOR: &str = "#dc2626";
const DATA_COLOR: &str = "#ca8a04";

static DEFINITIONS: &[NodeDefinition] = &[
    // Triggers
    NodeDefinition {
        node_type: "chatTrigger",
        label: "Chat Trigger",
        description: "When chat message received",
        category: NodeCategory::Triggers,
        icon: "MessageCircle",
        color: TRIGGER_COLOR,
        inputs: 0,
        outputs: 1,
        defaults: &[],
    },
    NodeDefinition {
        node_type: "webhookTrigger",
        label: "Webhook Trigger",
        description: "When webhook is called",
        category: NodeCategory::Triggers,
        icon: "Webhook",
        color: TRIGGER_COLOR,
        inputs: 0,
        outputs: 1,
        defaults: &[("method", DefaultValue::Str("POST"))],
    },
    NodeDefinition {
        node_type: "scheduleTrigger",
        label: "Schedule Trigger",
        description: "Runs on a schedule",
        category: NodeCategory::Triggers,
        icon: "Clock",
        color: TRIGGER_COLOR,
        inputs: 0,
        outputs: 1,
        defaults: &[],
    },
    // AI
    NodeDefinition {
        node_type: "aiAgent",
        label: "AI Agent",
        description: "Tools Agent",
        category: NodeCategory::Ai,
        icon: "Bot",
        color: AI_COLOR,
        inputs: 1,
        outputs: 1,
        defaults: &[
            ("agentType", DefaultValue::Str("tools")),
            ("maxIterations", DefaultValue::Int(10)),
        ],
    },
    NodeDefinition {
        node_type: "openaiModel",
        label: "OpenAI Chat Model",
        description: "GPT-4, GPT-3.5, etc.",
        category: NodeCategory::Ai,
        icon: "Brain",
        color: AI_COLOR,
        inputs: 0,
        outputs: 1,
        defaults: &[
            ("model", DefaultValue::Str("gpt-4o")),
            ("temperature", DefaultValue::Float(0.7)),
        ],
    },
    NodeDefinition {
        node_type: "anthropicModel",
        label: "Anthropic Model",
        description: "Claude 3.5, Claude 3, etc.",
        category: NodeCategory::Ai,
        icon: "Sparkles",
        color: AI_COLOR,
        inputs: 0,
        outputs: 1,
        defaults: &[
            ("model", DefaultValue::Str("claude-sonnet-4-20250514")),
            ("temperature", DefaultValue::Float(0.7)),
        ],
    },
    NodeDefinition {
        node_type: "windowMemory",
        label: "Window Buffer Memory",
        description: "Stores recent conversation",
        category: NodeCategory::Ai,
        icon: "Database",
        color: AI_COLOR,
        inputs: 0,
        outputs: 1,
        defaults: &[("windowSize", DefaultValue::Int(5))],
    },
    // Tools
    NodeDefinition {
        node_type: "serpApi",
        label: "SerpAPI",
        description: "Google Search tool",
        category: NodeCategory::Tools,
        icon: "Search",
        color: TOOLS_COLOR,
        inputs: 0,
        outputs: 1,
        defaults: &[],
    },
    NodeDefinition {
        node_type: "httpRequest",
        label: "HTTP Request",
        description: "Make HTTP requests",
        category: NodeCategory::Tools,
        icon: "Globe",
        color: TOOLS_COLOR,
        inputs: 1,
        outputs: 1,
        defaults: &[("method", DefaultValue::Str("GET"))],
    },
    NodeDefinition {
        node_type: "codeExecutor",
        label: "Code Executor",
        description: "Run custom code",
        category: NodeCategory::Tools,
        icon: "Code",
        color: TOOLS_COLOR,
        inputs: 1,
        outputs: 1,
        defaults: &[("language", DefaultValue::Str("javascript"))],
    },
    NodeDefinition {
        node_type: "callWorkflow",
        label: "Call Workflow",
        description: "Call another workflow",
        category: NodeCategory::Tools,
        icon: "Workflow",
        color: TOOLS_COLOR,
        inputs: 1,
        outputs: 1,
        defaults: &[],
    },
    // Flow control
    NodeDefinition {
        node_type: "ifCondition",
        label: "If Condition",
        description: "Branch based on condition",
        category: NodeCategory::Flow,
        icon: "GitBranch",
        color: FLOW_COLOR,
        inputs: 1,
        outputs: 2,
        defaults: &[
            ("field", DefaultValue::Str("message")),
            ("operator", DefaultValue::Str("equals")),
        ],
    },
    NodeDefinition {
        node_type: "switchNode",
        label: "Switch",
        description: "Route to multiple outputs",
        category: NodeCategory::Flow,
        icon: "Route",
        color: FLOW_COLOR,
        inputs: 1,
        outputs: 3,
        defaults: &[],
    },
    NodeDefinition {
        node_type: "mergeNode",
        label: "Merge",
        description: "Merge multiple inputs",
        category: NodeCategory::Flow,
        icon: "Merge",
        color: FLOW_COLOR,
        inputs: 2,
        outputs: 1,
        defaults: &[("mode", DefaultValue::Str("append"))],
    },
    // Actions
    NodeDefinition {
        node_type: "sendMessage",
        label: "Send Message",
        description: "Send a response message",
        category: NodeCategory::Actions,
        icon: "Send",
        color: ACTIONS_COLOR,
        inputs: 1,
        outputs: 0,
        defaults: &[("messageType", DefaultValue::Str("success"))],
    },
    NodeDefinition {
        node_type: "emailAction",
        label: "Send Email",
        description: "Send an email",
        category: NodeCategory::Actions,
        icon: "Mail",
        color: ACTIONS_COLOR,
        inputs: 1,
        outputs: 1,
        defaults: &[],
    },
    // Data
    NodeDefinition {
        node_type: "setVariable",
        label: "Set Variable",
        description: "Set a workflow variable",
        category: NodeCategory::Data,
        icon: "Variable",
        color: DATA_COLOR,
        inputs: 1,
        outputs: 1,
        defaults: &[],
    },
    NodeDefinition {
        node_type: "jsonParse",
        label: "JSON Parse",
        description: "Parse JSON data",
        category: NodeCategory::Data,
        icon: "FileJson",
        color: DATA_COLOR,
        inputs: 1,
        outputs: 1,
        defaults: &[],
    },
];

/// Look up the definition of a node type
pub fn definition(node_type: &str) -> Option<&'static NodeDefinition> {
    DEFINITIONS.iter().find(|def| def.node_type == node_type)
}

/// All built-in definitions, in palette order
pub fn all() -> &'static [NodeDefinition] {
    DEFINITIONS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let def = definition("ifCondition").unwrap();
        assert_eq!(def.outputs, 2);
        assert_eq!(def.category, NodeCategory::Flow);
        assert!(definition("nope").is_none());
    }

    #[test]
    fn test_types_are_unique() {
        let mut types: Vec<_> = all().iter().map(|d| d.node_type).collect();
        types.sort();
        types.dedup();
        assert_eq!(types.len(), all().len());
    }

    #[test]
    fn test_default_config_values() {
        let config = definition("openaiModel").unwrap().default_config();
        assert!(config.contains(&("model".to_string(), Value::from("gpt-4o"))));
        assert!(config.contains(&("temperature".to_string(), Value::from(0.7))));
    }
}
