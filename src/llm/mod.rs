//! LLM module - reasoning collaborator abstraction
//!
//! Contains the provider trait and the HTTP chat client implementation.

pub mod client;
pub mod traits;

pub use client::ChatClient;
pub use traits::{GenerateOptions, LlmProvider};
