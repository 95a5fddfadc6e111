//! Tool registry - manages and dispatches tool calls
//!
//! Central hub for registering tools and routing tool calls to them.
//! Lookup is case-insensitive exact-name match; duplicate names
//! overwrite silently (last registered wins), so callers must register
//! unique names.

use std::collections::HashMap;
use std::sync::Arc;

use crate::core::ToolCall;
use crate::tools::tool::Tool;

/// Registry of available tools
#[derive(Clone, Default)]
pub struct ToolRegistry {
    /// Tools indexed by lowercased name
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Create a registry from a list of tools
    pub fn with_tools(tools: Vec<Arc<dyn Tool>>) -> Self {
        let mut registry = Self::new();
        for tool in tools {
            registry.add(tool);
        }
        registry
    }

    /// Register a tool, overwriting any tool with the same name
    pub fn add(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_lowercase(), tool);
    }

    /// Look up a tool by name (case-insensitive exact match)
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(&name.to_lowercase())
    }

    /// Whether a tool with this name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(&name.to_lowercase())
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Registered tool names, sorted for stable display
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.values().map(|t| t.name().to_string()).collect();
        names.sort();
        names
    }

    /// Schema metadata for every registered tool
    pub fn schemas(&self) -> HashMap<String, serde_json::Value> {
        self.tools
            .values()
            .map(|tool| {
                (
                    tool.name().to_string(),
                    serde_json::json!({
                        "name": tool.name(),
                        "description": tool.description(),
                        "parameters": tool.parameters(),
                    }),
                )
            })
            .collect()
    }

    /// Execute a tool call, converting every failure into a textual result
    ///
    /// An unregistered name yields an error string containing "not found";
    /// an invocation error is rendered as text. Neither raises, so the
    /// calling agent's loop can always continue.
    pub async fn dispatch(&self, call: &ToolCall) -> String {
        let tool = match self.get(&call.name) {
            Some(tool) => tool,
            None => return format!("Error: tool '{}' not found", call.name),
        };

        match tool.invoke(&call.args).await {
            Ok(output) => output,
            Err(e) => format!("Error executing tool '{}': {}", call.name, e),
        }
    }
}
