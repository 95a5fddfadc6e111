//! Conversational participant agent
//!
//! A profile-driven agent that takes turns in a multi-agent
//! conversation: it thinks privately, then responds into the shared
//! history.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::agent::conversation::ConversationState;
use crate::agent::Agent;
use crate::core::{Message, Result};
use crate::llm::LlmProvider;

/// Immutable configuration for one conversation participant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Name of the agent
    pub name: String,
    /// Role of the agent in the conversation
    pub role: String,
    /// Areas of expertise
    pub expertise: Vec<String>,
    /// System prompt that defines the agent's behavior
    pub system_prompt: String,
}

impl AgentProfile {
    /// Create a profile
    pub fn new(
        name: impl Into<String>,
        role: impl Into<String>,
        expertise: Vec<String>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            expertise,
            system_prompt: system_prompt.into(),
        }
    }

    /// The profile's system message
    pub fn system_message(&self) -> Message {
        Message::system(&self.system_prompt)
    }
}

/// An agent that participates in multi-agent conversations
pub struct ConversationalAgent {
    profile: AgentProfile,
    provider: Arc<dyn LlmProvider>,
    conversation: ConversationState,
}

impl ConversationalAgent {
    /// Create a participant with its own conversation
    pub fn new(profile: AgentProfile, provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            profile,
            provider,
            conversation: ConversationState::new(),
        }
    }

    /// Get the profile
    pub fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    /// Get the agent name
    pub fn name(&self) -> &str {
        &self.profile.name
    }

    /// Attach a shared conversation, replacing the private one
    pub fn attach(&mut self, conversation: ConversationState) {
        self.conversation = conversation;
    }

    /// The conversation this agent participates in
    pub fn conversation(&self) -> &ConversationState {
        &self.conversation
    }

    fn expertise_line(&self) -> String {
        if self.profile.expertise.is_empty() {
            "general".to_string()
        } else {
            self.profile.expertise.join(", ")
        }
    }

    fn thinking_prompt(&self) -> Vec<Message> {
        vec![
            self.profile.system_message(),
            Message::user(format!(
                "You are {}, a {} with expertise in {}.\n\nConversation history:\n{}\n\nBefore \
                 responding, think step by step about what is being discussed, what insights \
                 your expertise offers, and how to advance the conversation. Your thinking is \
                 private and not shared with others.",
                self.profile.name,
                self.profile.role,
                self.expertise_line(),
                self.conversation.formatted_history(false)
            )),
        ]
    }

    fn response_prompt(&self) -> Vec<Message> {
        vec![
            self.profile.system_message(),
            Message::user(format!(
                "You are {}, a {} with expertise in {}.\n\nConversation history:\n{}\n\nRespond \
                 to the conversation, advancing the discussion and sharing your expertise.",
                self.profile.name,
                self.profile.role,
                self.expertise_line(),
                self.conversation.formatted_history(false)
            )),
        ]
    }

    /// Generate one response into the shared history
    pub async fn respond(&mut self) -> Result<String> {
        let response = match self.provider.complete(&self.response_prompt(), None).await {
            Ok(response) => response,
            Err(e) => {
                // The turn degrades to silence; the failure stays in the log.
                self.conversation.add_message(Message::system(format!(
                    "{} failed to respond: {}",
                    self.profile.name, e
                )));
                return Ok(String::new());
            }
        };

        self.conversation
            .add_message(Message::assistant(&response).with_name(&self.profile.name));
        self.conversation.set_current_speaker(&self.profile.name);

        Ok(response)
    }

    /// Receive a message broadcast from another participant
    ///
    /// History is shared by reference, so a message the speaker already
    /// appended is not copied again; receiving only tracks the speaker.
    /// A standalone agent (private conversation) still records it.
    pub fn receive_message(&mut self, content: &str, sender: &str) {
        let already_shared = self
            .conversation
            .last_message()
            .map(|m| m.content == content && m.name.as_deref() == Some(sender))
            .unwrap_or(false);

        if !already_shared {
            let message = if sender == "human" {
                Message::user(content).with_name(sender)
            } else {
                Message::assistant(content).with_name(sender)
            };
            self.conversation.add_message(message);
        }

        self.conversation.set_current_speaker(sender);
    }

    /// This agent's private thinking transcript
    pub fn thinking_process(&self) -> String {
        self.conversation.formatted_thinking(&self.profile.name)
    }
}

#[async_trait]
impl Agent for ConversationalAgent {
    /// Think privately about the conversation
    async fn think(&mut self) -> Result<bool> {
        let thought = match self.provider.complete(&self.thinking_prompt(), None).await {
            Ok(thought) => thought,
            Err(e) => {
                self.conversation.add_message(Message::system(format!(
                    "{} failed to think: {}",
                    self.profile.name, e
                )));
                return Ok(false);
            }
        };

        self.conversation.add_thinking(&self.profile.name, thought);
        Ok(true)
    }

    /// One action for a participant is one response
    async fn act(&mut self) -> Result<String> {
        self.respond().await
    }

    /// Receive the request, think, respond
    async fn run(&mut self, request: Option<&str>) -> Result<String> {
        if let Some(request) = request {
            self.receive_message(request, "human");
        }

        self.think().await?;
        self.respond().await
    }
}
