//! Tool trait - the capability boundary the engine dispatches across

use async_trait::async_trait;

use crate::core::Result;

/// A named, schema-described unit of capability
///
/// No invocation is guaranteed idempotent; tools that mutate external
/// state are treated as at-most-once per ToolCall by their caller.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name used for registry lookup
    fn name(&self) -> &str;

    /// Description of what the tool does and how to use it
    fn description(&self) -> &str;

    /// Parameter schema: mapping of parameter name to {type, description, required}
    fn parameters(&self) -> serde_json::Value;

    /// Invoke the tool with JSON arguments
    ///
    /// Errors never propagate past the registry dispatch boundary; the
    /// caller converts them into textual error results.
    async fn invoke(&self, args: &serde_json::Value) -> Result<String>;
}
