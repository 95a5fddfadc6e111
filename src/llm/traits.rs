//! Reasoning collaborator trait
//!
//! The engine delegates every "what comes next" question to an external
//! text-generation service behind this trait. Implementations must
//! tolerate being called with the full accumulated memory on every
//! invocation, and must surface failures as catchable errors so the
//! calling agent can degrade instead of crashing.

use async_trait::async_trait;

use crate::core::{Message, Result};

/// Options for LLM generation
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Temperature for sampling (0.0 - 2.0)
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Stop sequences
    pub stop: Option<Vec<String>>,
}

/// Trait for reasoning collaborators
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a text completion from an ordered message sequence
    async fn complete(
        &self,
        messages: &[Message],
        options: Option<GenerateOptions>,
    ) -> Result<String>;

    /// Get the provider name
    fn name(&self) -> &str;
}
