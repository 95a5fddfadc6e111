//! Tools module - capabilities the agent can dispatch to
//!
//! Contains the Tool trait, the registry, and built-in tools.

pub mod echo;
pub mod registry;
pub mod terminate;
pub mod tool;

pub use echo::EchoTool;
pub use registry::ToolRegistry;
pub use terminate::{TerminateTool, TERMINATE_MARKER};
pub use tool::Tool;
