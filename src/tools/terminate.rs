//! Terminate tool
//!
//! Ends a run early. The run loop treats any act result starting with
//! TERMINATE_MARKER as a successful exit, not a failure.

use async_trait::async_trait;

use crate::core::Result;
use crate::tools::tool::Tool;

/// Reserved prefix signalling early, successful loop exit
pub const TERMINATE_MARKER: &str = "Agent execution terminated";

/// Tool for terminating the agent's execution
#[derive(Debug, Clone, Default)]
pub struct TerminateTool;

impl TerminateTool {
    /// Create a new terminate tool
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for TerminateTool {
    fn name(&self) -> &str {
        "terminate"
    }

    fn description(&self) -> &str {
        "Terminate the agent's execution when the goal is reached"
    }

    fn parameters(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "reason": {
                    "type": "string",
                    "description": "The reason for termination"
                }
            }
        })
    }

    async fn invoke(&self, args: &serde_json::Value) -> Result<String> {
        let reason = args
            .get("reason")
            .and_then(|v| v.as_str())
            .unwrap_or("Task completed");
        Ok(format!("{}: {}", TERMINATE_MARKER, reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_terminate_marker_prefix() {
        let tool = TerminateTool::new();
        let out = tool
            .invoke(&serde_json::json!({"reason": "goal reached"}))
            .await
            .unwrap();
        assert!(out.starts_with(TERMINATE_MARKER));
        assert!(out.contains("goal reached"));
    }

    #[tokio::test]
    async fn test_terminate_default_reason() {
        let tool = TerminateTool::new();
        let out = tool.invoke(&serde_json::json!({})).await.unwrap();
        assert_eq!(out, "Agent execution terminated: Task completed");
    }
}
