//! Configuration management for workback
//!
//! Supports environment variables, config files, and runtime overrides.
//!
//! Config file location: ~/.config/workback/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::core::error::{Result, WorkbackError};

/// Main configuration for workback
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Chat endpoint configuration
    pub llm: LlmConfig,
    /// Agent configuration
    pub agent: AgentConfig,
    /// Multi-agent conversation configuration
    #[serde(default)]
    pub conversation: ConversationConfig,
}

/// Chat completion endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible chat endpoint
    pub base_url: String,
    /// Model name sent with every request
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Agent behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum think/act iterations per run
    /// Default: 15
    pub max_steps: usize,
    /// Hard cap on backward-chaining queries, independent of max_steps
    /// Default: 10
    pub backward_cap: usize,
    /// Total attempts per failing step (initial + recovery)
    /// Default: 2, no backoff
    pub retry_attempts: usize,
    /// Whether to show debug output
    pub debug: bool,
    /// System prompt override
    pub system_prompt: Option<String>,
}

/// Multi-agent conversation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    /// Exact number of turns per conversation round
    /// Default: 9 (three rounds of the default role trio)
    pub max_turns: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            agent: AgentConfig::default(),
            conversation: ConversationConfig::default(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: env::var("WORKBACK_LLM_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            model: env::var("WORKBACK_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 120,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: 15,
            backward_cap: 10,
            retry_attempts: 2,
            debug: env::var("WORKBACK_DEBUG")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            system_prompt: None,
        }
    }
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self { max_turns: 9 }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("workback")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load() -> Self {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        // Try to load from config file
        if let Ok(config) = Self::load_from_file() {
            return config;
        }

        // Fall back to defaults (which respect env vars)
        Self::default()
    }

    /// Load configuration from file only
    pub fn load_from_file() -> Result<Self> {
        let config_path = Self::config_file();

        if !config_path.exists() {
            return Err(WorkbackError::config("Config file not found"));
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|e| WorkbackError::config(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| WorkbackError::config(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_dir = Self::config_dir();
        let config_path = Self::config_file();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .map_err(|e| WorkbackError::config(format!("Failed to create config dir: {}", e)))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| WorkbackError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&config_path, content)
            .map_err(|e| WorkbackError::config(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Check if a config file exists
    pub fn config_exists() -> bool {
        Self::config_file().exists()
    }

    /// Get the API key from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        env::var(&self.llm.api_key_env).ok()
    }

    /// Generate a default config file content for display
    pub fn default_config_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config)
            .unwrap_or_else(|_| String::from("# Error generating config"))
    }
}
