//! Shared types used across workback modules
//!
//! Contains message structures, tool call records, and agent status.

use serde::{Deserialize, Serialize};

/// A message in a conversation
///
/// Immutable once created; an ordered sequence of messages forms an
/// agent's memory. Insertion order is the only ordering guarantee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender (user, assistant, system)
    pub role: String,
    /// Content of the message
    pub content: String,
    /// Optional name of the sender (used in multi-agent conversations)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Message {
    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
            name: None,
        }
    }

    /// Create a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
            name: None,
        }
    }

    /// Create a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
            name: None,
        }
    }

    /// Attach a sender name to this message
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A tool call decided by the think phase
///
/// Created during thinking, consumed exactly once by the act phase,
/// which attaches the textual result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the tool to invoke
    pub name: String,
    /// JSON arguments for the tool
    pub args: serde_json::Value,
    /// Result of the invocation, attached by the act phase
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new(name: impl Into<String>, args: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            args,
            result: None,
        }
    }

    /// Get a string argument by key
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.args
            .get(key)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }

    /// Get a boolean argument by key
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.args.get(key).and_then(|v| v.as_bool())
    }
}

/// Status of an agent run
///
/// `Completed`, `Failed`, and `Exhausted` are terminal. `Exhausted`
/// (step cap hit without termination) is reported distinctly and is
/// never folded into success or failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    /// No run started yet
    Idle,
    /// Deciding the next action
    Thinking,
    /// Executing the decided action
    Acting,
    /// Run finished successfully
    Completed,
    /// Run stopped after an unrecovered step failure
    Failed,
    /// Step cap reached without termination
    Exhausted,
}

impl AgentStatus {
    /// Whether this status ends the run loop
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Exhausted)
    }
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentStatus::Idle => write!(f, "idle"),
            AgentStatus::Thinking => write!(f, "thinking"),
            AgentStatus::Acting => write!(f, "acting"),
            AgentStatus::Completed => write!(f, "completed"),
            AgentStatus::Failed => write!(f, "failed"),
            AgentStatus::Exhausted => write!(f, "exhausted"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        let msg = Message::system("You are an agent");
        assert_eq!(msg.role, "system");
        assert!(msg.name.is_none());

        let named = Message::assistant("hello").with_name("Planner");
        assert_eq!(named.name.as_deref(), Some("Planner"));
    }

    #[test]
    fn test_tool_call_args() {
        let call = ToolCall::new("echo", serde_json::json!({"input": "hi", "loud": true}));
        assert_eq!(call.get_string("input").as_deref(), Some("hi"));
        assert_eq!(call.get_bool("loud"), Some(true));
        assert!(call.get_string("missing").is_none());
        assert!(call.result.is_none());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(AgentStatus::Completed.is_terminal());
        assert!(AgentStatus::Failed.is_terminal());
        assert!(AgentStatus::Exhausted.is_terminal());
        assert!(!AgentStatus::Thinking.is_terminal());
    }
}
