//! Agent module - the think/act state machine and its variants
//!
//! Contains the capability trait shared by all agent variants, the
//! Working Backwards planning engine, conversational participants, and
//! the multi-agent orchestrator.

pub mod conversation;
pub mod extractor;
pub mod orchestrator;
pub mod participant;
pub mod plan;
pub mod planner;

use async_trait::async_trait;

use crate::core::Result;

/// Capability contract shared by every agent variant
///
/// `think` decides whether further action is required and records at
/// least one message; `act` consumes exactly one pending action; `run`
/// loops the two until done or a step cap is reached.
#[async_trait]
pub trait Agent {
    /// Inspect state and decide whether more action is required
    async fn think(&mut self) -> Result<bool>;

    /// Consume one pending action and return its textual result
    async fn act(&mut self) -> Result<String>;

    /// Drive the think/act loop from an optional initial request
    async fn run(&mut self, request: Option<&str>) -> Result<String>;
}

pub use conversation::ConversationState;
pub use extractor::{ActionExtractor, MarkerExtractor, ToolInvocationRequest};
pub use orchestrator::{default_roles, AgentRole, HybridAgent, MultiAgentConversation};
pub use participant::{AgentProfile, ConversationalAgent};
pub use plan::{BackwardStep, ExecutionCursor, INITIAL_STATE_MARKER};
pub use planner::{PlanningAgent, RetryPolicy};
