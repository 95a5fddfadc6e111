//! Shared conversation state
//!
//! One ConversationState is created per conversation and shared by
//! reference with every participant. All participants must observe the
//! same growing history, so the handle clones share one lock-guarded
//! inner value. Mutation is append-only (history, thinking) or a
//! single-field overwrite (current speaker).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::core::Message;

#[derive(Debug, Default)]
struct ConversationInner {
    history: Vec<Message>,
    current_speaker: String,
    thinking_process: HashMap<String, Vec<String>>,
}

/// Cloneable handle to a shared conversation
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    inner: Arc<Mutex<ConversationInner>>,
}

impl ConversationState {
    /// Create a fresh conversation
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether two handles refer to the same conversation
    pub fn same_conversation(&self, other: &ConversationState) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ConversationInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Append a message to the shared history
    pub fn add_message(&self, message: Message) {
        self.lock().history.push(message);
    }

    /// Record a private thought for an agent
    pub fn add_thinking(&self, agent_name: &str, thought: impl Into<String>) {
        self.lock()
            .thinking_process
            .entry(agent_name.to_string())
            .or_default()
            .push(thought.into());
    }

    /// Overwrite the current speaker
    pub fn set_current_speaker(&self, name: &str) {
        self.lock().current_speaker = name.to_string();
    }

    /// The name of the last speaker
    pub fn current_speaker(&self) -> String {
        self.lock().current_speaker.clone()
    }

    /// Snapshot of the full history
    pub fn history(&self) -> Vec<Message> {
        self.lock().history.clone()
    }

    /// Number of messages in the history
    pub fn len(&self) -> usize {
        self.lock().history.len()
    }

    /// Check if the history is empty
    pub fn is_empty(&self) -> bool {
        self.lock().history.is_empty()
    }

    /// The last message, if any
    pub fn last_message(&self) -> Option<Message> {
        self.lock().history.last().cloned()
    }

    /// Format the history for inclusion in a prompt
    pub fn formatted_history(&self, include_system: bool) -> String {
        let inner = self.lock();
        inner
            .history
            .iter()
            .filter(|m| include_system || m.role != "system")
            .map(|m| {
                let speaker = m.name.as_deref().unwrap_or(&m.role);
                format!("{}: {}", speaker, m.content)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Private thoughts recorded for an agent
    pub fn thinking_of(&self, agent_name: &str) -> Vec<String> {
        self.lock()
            .thinking_process
            .get(agent_name)
            .cloned()
            .unwrap_or_default()
    }

    /// Format an agent's thinking transcript
    pub fn formatted_thinking(&self, agent_name: &str) -> String {
        let thoughts = self.thinking_of(agent_name);
        if thoughts.is_empty() {
            return "No thoughts recorded yet.".to_string();
        }
        thoughts
            .iter()
            .enumerate()
            .map(|(i, t)| format!("Thought {}: {}", i + 1, t))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_handles_observe_same_history() {
        let state = ConversationState::new();
        let other = state.clone();

        state.add_message(Message::user("hello").with_name("human"));
        assert_eq!(other.len(), 1);
        assert!(state.same_conversation(&other));
    }

    #[test]
    fn test_thinking_is_per_agent() {
        let state = ConversationState::new();
        state.add_thinking("Planner", "first thought");
        state.add_thinking("Critic", "other thought");

        assert_eq!(state.thinking_of("Planner"), vec!["first thought"]);
        assert_eq!(state.thinking_of("Critic").len(), 1);
        assert!(state.thinking_of("Developer").is_empty());
        assert_eq!(
            state.formatted_thinking("Developer"),
            "No thoughts recorded yet."
        );
    }

    #[test]
    fn test_formatted_history_skips_system() {
        let state = ConversationState::new();
        state.add_message(Message::system("setup"));
        state.add_message(Message::assistant("hi").with_name("Planner"));

        let formatted = state.formatted_history(false);
        assert!(!formatted.contains("setup"));
        assert!(formatted.contains("Planner: hi"));
    }

    #[test]
    fn test_current_speaker_overwrite() {
        let state = ConversationState::new();
        state.set_current_speaker("A");
        state.set_current_speaker("B");
        assert_eq!(state.current_speaker(), "B");
    }
}
