//! Workflow document - the node/edge graph as authored and saved by the editor

use crate::catalog;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Node configuration bag, passed verbatim to the node's handler
pub type NodeConfig = Map<String, Value>;

/// A complete workflow: nodes plus directed edges
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub nodes: Vec<WorkflowNode>,
    #[serde(default)]
    pub edges: Vec<WorkflowEdge>,
}

/// A node as stored in the document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
    /// Declared output count (0, 1, 2 or N)
    #[serde(default)]
    pub outputs: Option<u32>,
    #[serde(default)]
    pub config: NodeConfig,
}

/// A directed connection, optionally leaving from a named output port
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowEdge {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
}

impl WorkflowNode {
    /// Create a node of the given type, filled from the catalog
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        let mut node = Self {
            id: id.into(),
            node_type: node_type.into(),
            label: String::new(),
            icon: String::new(),
            color: String::new(),
            outputs: None,
            config: NodeConfig::new(),
        };
        node.apply_catalog_defaults();
        node
    }

    /// Set a config entry (builder style)
    pub fn with_config(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.config.insert(key.to_string(), value.into());
        self
    }

    /// Set the display label (builder style)
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Declared output count, falling back to a single output
    pub fn declared_outputs(&self) -> u32 {
        self.outputs.unwrap_or(1)
    }

    /// Fill empty display metadata, output count and missing config keys
    pub fn apply_catalog_defaults(&mut self) {
        let Some(def) = catalog::definition(&self.node_type) else {
            if self.label.is_empty() {
                self.label = self.node_type.clone();
            }
            return;
        };

        if self.label.is_empty() {
            self.label = def.label.to_string();
        }
        if self.icon.is_empty() {
            self.icon = def.icon.to_string();
        }
        if self.color.is_empty() {
            self.color = def.color.to_string();
        }
        if self.outputs.is_none() {
            self.outputs = Some(def.outputs);
        }
        for (key, value) in def.default_config() {
            self.config.entry(key).or_insert(value);
        }
    }
}

impl WorkflowEdge {
    /// Plain edge from the default output
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: None,
            source: source.into(),
            target: target.into(),
            source_handle: None,
        }
    }

    /// Edge leaving from a named output port
    pub fn from_handle(
        source: impl Into<String>,
        handle: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            source: source.into(),
            target: target.into(),
            source_handle: Some(handle.into()),
        }
    }

    /// Port label, absent handles compare as the empty string
    pub fn handle(&self) -> &str {
        self.source_handle.as_deref().unwrap_or("")
    }
}

impl Workflow {
    pub fn new(nodes: Vec<WorkflowNode>, edges: Vec<WorkflowEdge>) -> Self {
        Self {
            id: None,
            name: None,
            nodes,
            edges,
        }
    }

    /// Load a workflow file; `.json` is parsed as JSON, anything else as YAML
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading workflow {}", path.display()))?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let mut workflow: Workflow = serde_json::from_str(content)?;
        workflow.apply_catalog_defaults();
        Ok(workflow)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let mut workflow: Workflow = serde_yaml::from_str(content)?;
        workflow.apply_catalog_defaults();
        Ok(workflow)
    }

    pub fn apply_catalog_defaults(&mut self) {
        for node in &mut self.nodes {
            node.apply_catalog_defaults();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
