//! Action extraction from collaborator output
//!
//! Free-text replies sometimes name a tool to run. Extraction is a
//! pluggable seam so marker-phrase matching can be swapped for
//! structured output without touching the execution loop.

use crate::core::ToolCall;

/// A typed request to invoke a tool, recovered from model text
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocationRequest {
    /// Name of the requested tool
    pub name: String,
    /// Arguments for the invocation
    pub args: serde_json::Value,
}

impl ToolInvocationRequest {
    /// Convert into a dispatchable tool call
    pub fn into_call(self) -> ToolCall {
        ToolCall::new(self.name, self.args)
    }
}

/// Strategy for recovering a tool request from reply text
pub trait ActionExtractor: Send + Sync {
    /// Return the tool request named by the text, if any
    fn extract(&self, text: &str) -> Option<ToolInvocationRequest>;
}

/// Default extractor matching `use tool:` / `tool to use:` marker lines
///
/// The first matching line wins. Everything after the tool name is
/// parsed as a JSON object, or wrapped as `{"input": …}` when it is not
/// valid JSON.
#[derive(Debug, Clone, Default)]
pub struct MarkerExtractor;

const MARKERS: [&str; 2] = ["use tool:", "tool to use:"];

impl MarkerExtractor {
    /// Create a new marker extractor
    pub fn new() -> Self {
        Self
    }
}

impl ActionExtractor for MarkerExtractor {
    fn extract(&self, text: &str) -> Option<ToolInvocationRequest> {
        for line in text.lines() {
            let lower = line.to_lowercase();
            let marker = MARKERS.iter().find_map(|m| lower.find(m).map(|i| (i, m.len())));
            let Some((start, marker_len)) = marker else {
                continue;
            };

            // Offsets come from the lowercased copy; only slice the
            // original where the byte position still lines up.
            let Some(rest) = line.get(start + marker_len..).map(str::trim) else {
                continue;
            };
            if rest.is_empty() {
                continue;
            }

            let (name, arg_text) = match rest.split_once(' ') {
                Some((name, args)) => (name, args.trim()),
                None => (rest, ""),
            };

            let args = if arg_text.is_empty() {
                serde_json::json!({})
            } else {
                serde_json::from_str(arg_text)
                    .unwrap_or_else(|_| serde_json::json!({ "input": arg_text }))
            };

            return Some(ToolInvocationRequest {
                name: name.to_string(),
                args,
            });
        }

        None
    }
}
