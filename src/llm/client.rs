//! Chat completion client
//!
//! Async HTTP client for an OpenAI-compatible /chat/completions endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::{Config, Message, Result, WorkbackError};
use crate::llm::traits::{GenerateOptions, LlmProvider};

/// HTTP client for a chat completion endpoint
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    debug: bool,
}

/// Chat request body
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
}

/// Message in wire format
#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

/// Chat response body
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

/// A single completion choice
#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: WireMessage,
}

impl ChatClient {
    /// Create a new client with default configuration
    pub fn new() -> Self {
        Self::from_config(&Config::default())
    }

    /// Create a new client from configuration
    pub fn from_config(config: &Config) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.llm.timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: config.llm.base_url.clone(),
            model: config.llm.model.clone(),
            api_key: config.api_key(),
            debug: config.agent.debug,
        }
    }

    /// Create a client with custom base URL and model
    pub fn with_base_url(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
            api_key: None,
            debug: false,
        }
    }

    /// Enable or disable debug output
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Convert internal Message to wire format
    fn to_wire_message(msg: &Message) -> WireMessage {
        WireMessage {
            role: msg.role.clone(),
            content: msg.content.clone(),
            name: msg.name.clone(),
        }
    }

    /// Debug print if enabled
    fn debug_print(&self, label: &str, content: &str) {
        if self.debug {
            // Cut on a char boundary; bodies are arbitrary UTF-8.
            match content.char_indices().nth(500) {
                Some((cut, _)) => eprintln!("DEBUG {}: {}...", label, &content[..cut]),
                None => eprintln!("DEBUG {}: {}", label, content),
            }
        }
    }
}

impl Default for ChatClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmProvider for ChatClient {
    async fn complete(
        &self,
        messages: &[Message],
        options: Option<GenerateOptions>,
    ) -> Result<String> {
        let wire_messages: Vec<WireMessage> = messages.iter().map(Self::to_wire_message).collect();
        let options = options.unwrap_or_default();

        let request = ChatRequest {
            model: &self.model,
            messages: wire_messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            stop: options.stop,
        };

        let request_json = serde_json::to_string(&request)?;
        self.debug_print("Request", &request_json);

        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&request);

        if let Some(ref key) = self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_connect() {
                WorkbackError::llm(format!(
                    "Cannot connect to LLM endpoint at {}. Is it reachable?",
                    self.base_url
                ))
            } else {
                WorkbackError::from(e)
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(WorkbackError::llm(format!(
                "Chat API error ({}): {}",
                status, error_text
            )));
        }

        let response_text = response.text().await?;
        self.debug_print("Response", &response_text);

        let chat_response: ChatResponse = serde_json::from_str(&response_text)
            .map_err(|e| WorkbackError::llm(format!("Failed to parse response: {}", e)))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| WorkbackError::llm("Chat response contained no choices"))
    }

    fn name(&self) -> &str {
        "chat"
    }
}
