//! Workback - Working Backwards planning agent
//!
//! An agent-execution engine that plans by backward chaining from a
//! goal, reverses the chain into a forward plan, and executes it step
//! by step with tools. Also provides multi-agent conversations with
//! round-robin turn taking and a hybrid agent combining both.
//!
//! # Architecture
//!
//! - **Core**: Shared types, configuration, and error handling
//! - **LLM**: Provider abstraction with an OpenAI-compatible chat client
//! - **Tools**: Tool registry with safe text-only dispatch
//! - **Agent**: Planning engine, conversation state, and orchestration
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use workback::{Agent, ChatClient, Config, PlanningAgent, ToolRegistry};
//! use workback::tools::TerminateTool;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::load();
//!     let provider = Arc::new(ChatClient::from_config(&config));
//!
//!     let mut tools = ToolRegistry::new();
//!     tools.add(Arc::new(TerminateTool::new()));
//!
//!     let mut agent = PlanningAgent::new("workback", provider, &config).with_tools(tools);
//!     let summary = agent.run(Some("Write a hello world in Rust")).await.unwrap();
//!     println!("{}", summary);
//! }
//! ```

pub mod agent;
pub mod core;
pub mod llm;
pub mod tools;

// Re-export commonly used items
pub use agent::{
    Agent, ConversationState, ConversationalAgent, HybridAgent, MultiAgentConversation,
    PlanningAgent,
};
pub use core::{Config, Result, WorkbackError};
pub use llm::{ChatClient, LlmProvider};
pub use tools::ToolRegistry;
