//! Echo tool
//!
//! Returns its input verbatim. Useful as a smoke-test capability and as
//! the canonical dispatch fixture.

use async_trait::async_trait;

use crate::core::Result;
use crate::tools::tool::Tool;

/// Tool that echoes its input argument
#[derive(Debug, Clone, Default)]
pub struct EchoTool;

impl EchoTool {
    /// Create a new echo tool
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Echo the provided input back verbatim"
    }

    fn parameters(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "input": {
                    "type": "string",
                    "description": "Text to echo back"
                }
            },
            "required": ["input"]
        })
    }

    async fn invoke(&self, args: &serde_json::Value) -> Result<String> {
        let input = args.get("input").and_then(|v| v.as_str()).unwrap_or("");
        Ok(input.to_string())
    }
}
