//! Core module - shared infrastructure for workback
//!
//! This module contains foundational types, configuration, and error handling
//! used throughout the engine.

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Result, WorkbackError};
pub use types::*;
