//! Plan state for the Working Backwards engine
//!
//! Tracks the backward chain, the reversed forward plan, and the
//! execution cursor across think/act iterations.

use serde::{Deserialize, Serialize};

/// Substring that signals the backward chain has reached the initial state
///
/// Matched case-insensitively against the raw collaborator reply. The
/// match is deliberately loose so that phrasing variations still stop
/// the chain.
pub const INITIAL_STATE_MARKER: &str = "initial state";

/// A step discovered during backward chaining
///
/// Steps are produced back-to-front: each one answers "what must happen
/// immediately before the current frontier state?".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackwardStep {
    /// What this step does
    pub description: String,
    /// States or artifacts that must exist before this step
    pub prerequisites: Vec<String>,
    /// Names of tools this step wants to use
    pub tools_needed: Vec<String>,
    /// Declared arguments for the tool invocation
    #[serde(default)]
    pub tool_args: serde_json::Value,
    /// Raw result recorded when the step is executed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

impl BackwardStep {
    /// Create a step with just a description
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            prerequisites: Vec::new(),
            tools_needed: Vec::new(),
            tool_args: serde_json::Value::Null,
            result: None,
        }
    }

    /// Parse a collaborator reply into a step
    ///
    /// Recognized marker lines: `STEP:`, `REQUIRES:`, `TOOLS:`, `ARGS:`.
    /// Without a `STEP:` line the first non-empty line is the description.
    pub fn parse(reply: &str) -> Self {
        let mut step = Self::new("");

        for line in reply.lines() {
            let line = line.trim();
            if let Some(rest) = strip_marker(line, "STEP:") {
                step.description = rest.to_string();
            } else if let Some(rest) = strip_marker(line, "REQUIRES:") {
                step.prerequisites = split_list(rest);
            } else if let Some(rest) = strip_marker(line, "TOOLS:") {
                step.tools_needed = split_list(rest);
            } else if let Some(rest) = strip_marker(line, "ARGS:") {
                step.tool_args = serde_json::from_str(rest)
                    .unwrap_or_else(|_| serde_json::json!({ "input": rest }));
            }
        }

        if step.description.is_empty() {
            step.description = reply
                .lines()
                .map(str::trim)
                .find(|l| !l.is_empty())
                .unwrap_or("")
                .to_string();
        }

        step
    }

    /// Whether a collaborator reply signals that the initial state is reached
    pub fn signals_initial_state(reply: &str) -> bool {
        reply.to_lowercase().contains(INITIAL_STATE_MARKER)
    }
}

/// Case-insensitive marker prefix match
fn strip_marker<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    // Checked slice: the prefix boundary may fall inside a multi-byte char.
    let head = line.get(..marker.len())?;
    if head.eq_ignore_ascii_case(marker) {
        Some(line[marker.len()..].trim())
    } else {
        None
    }
}

/// Split a comma-separated marker value
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Position within the forward plan
///
/// `current_step_index` is non-decreasing and never exceeds the plan
/// length; it advances only once a step is fully resolved.
#[derive(Debug, Clone, Default)]
pub struct ExecutionCursor {
    /// Index of the step currently being executed
    pub current_step_index: usize,
    /// Steps that have been fully resolved, with results attached
    pub completed_steps: Vec<BackwardStep>,
    /// Whether the backward chain has been reversed into a forward plan
    pub plan_ready: bool,
}

impl ExecutionCursor {
    /// Create a fresh cursor
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a resolved step and advance
    pub fn resolve(&mut self, mut step: BackwardStep, result: String) {
        step.result = Some(result);
        self.completed_steps.push(step);
        self.current_step_index += 1;
    }

    /// Reset to the planning phase
    pub fn reset(&mut self) {
        self.current_step_index = 0;
        self.completed_steps.clear();
        self.plan_ready = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_marker_lines() {
        let reply = "STEP: write the report\nREQUIRES: data collected, outline ready\nTOOLS: echo\nARGS: {\"input\": \"report\"}";
        let step = BackwardStep::parse(reply);
        assert_eq!(step.description, "write the report");
        assert_eq!(step.prerequisites, vec!["data collected", "outline ready"]);
        assert_eq!(step.tools_needed, vec!["echo"]);
        assert_eq!(step.tool_args["input"], "report");
    }

    #[test]
    fn test_parse_freeform_reply() {
        let step = BackwardStep::parse("\n  gather the source data\nsome elaboration");
        assert_eq!(step.description, "gather the source data");
        assert!(step.tools_needed.is_empty());
    }

    #[test]
    fn test_parse_non_ascii_reply() {
        let step = BackwardStep::parse("ステップ: データを集める");
        assert_eq!(step.description, "ステップ: データを集める");

        let step = BackwardStep::parse("STEP: récupérer les données");
        assert_eq!(step.description, "récupérer les données");
    }

    #[test]
    fn test_parse_non_json_args() {
        let step = BackwardStep::parse("STEP: run it\nARGS: just some text");
        assert_eq!(step.tool_args["input"], "just some text");
    }

    #[test]
    fn test_initial_state_marker_is_substring_and_case_insensitive() {
        assert!(BackwardStep::signals_initial_state(
            "We are already at Initial State."
        ));
        assert!(BackwardStep::signals_initial_state("INITIAL STATE reached"));
        assert!(!BackwardStep::signals_initial_state("keep going"));
    }

    #[test]
    fn test_cursor_resolve_advances() {
        let mut cursor = ExecutionCursor::new();
        cursor.plan_ready = true;
        cursor.resolve(BackwardStep::new("a"), "ok".to_string());
        assert_eq!(cursor.current_step_index, 1);
        assert_eq!(cursor.completed_steps.len(), 1);
        assert_eq!(cursor.completed_steps[0].result.as_deref(), Some("ok"));
    }
}
