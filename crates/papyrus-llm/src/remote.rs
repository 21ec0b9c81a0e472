//! Remote Chat API Backend
//!
//! Sends a system message and a user message to an OpenAI-compatible
//! chat-completion endpoint and returns the first choice's content.
//!
//! The API key is read from the credential store on every call. When it is
//! missing or blank the call fails with [`LlmError::Unavailable`] before any
//! network traffic happens.
//!
//! # Examples
//!
//! ```no_run
//! use papyrus_llm::{RemoteChatBackend, RemoteChatConfig, EnvCredentialStore};
//!
//! let backend = RemoteChatBackend::new(
//!     RemoteChatConfig::default(),
//!     EnvCredentialStore::default(),
//! ).unwrap();
//! ```

use crate::{InferenceBackend, LlmError};
use async_trait::async_trait;
use papyrus_domain::traits::CredentialStore;
use papyrus_domain::InferenceRequest;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Default chat-completion API base URL
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";

/// Default model identifier
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default timeout for a single request (60 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration for the remote chat backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteChatConfig {
    /// API base URL; `/chat/completions` is appended
    pub endpoint: String,

    /// Fixed model identifier sent with every request
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Sampling temperature
    pub temperature: f32,

    /// Optional cap on generated tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl Default for RemoteChatConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            temperature: 0.2,
            max_tokens: None,
        }
    }
}

impl RemoteChatConfig {
    /// Full URL of the chat-completion route
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.endpoint.trim().is_empty() {
            return Err("endpoint must not be empty".to_string());
        }
        if self.model.trim().is_empty() {
            return Err("model must not be empty".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err("temperature must be between 0.0 and 2.0".to_string());
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Chat-completion API backend
pub struct RemoteChatBackend<C> {
    client: reqwest::Client,
    config: RemoteChatConfig,
    credentials: Arc<C>,
}

impl<C> RemoteChatBackend<C>
where
    C: CredentialStore + Send + Sync + 'static,
    C::Error: Display,
{
    /// Create a new remote backend
    ///
    /// # Errors
    ///
    /// Fails if `config` is invalid or the HTTP client cannot be constructed
    /// (e.g. TLS backend initialization failure).
    pub fn new(config: RemoteChatConfig, credentials: C) -> Result<Self, LlmError> {
        config
            .validate()
            .map_err(|e| LlmError::Unavailable(format!("Invalid remote configuration: {}", e)))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Unavailable(format!("HTTP client initialization failed: {}", e)))?;

        Ok(Self {
            client,
            config,
            credentials: Arc::new(credentials),
        })
    }

    /// The active configuration
    pub fn config(&self) -> &RemoteChatConfig {
        &self.config
    }

    /// Read the API key, rejecting a missing or blank one
    async fn api_key(&self) -> Result<String, LlmError> {
        let credentials = Arc::clone(&self.credentials);
        let key = tokio::task::spawn_blocking(move || {
            credentials
                .load()
                .map_err(|e| LlmError::Unavailable(format!("Could not read API key: {}", e)))
        })
        .await
        .map_err(|e| LlmError::Runtime(format!("Credential lookup failed: {}", e)))??;

        match key {
            Some(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            _ => Err(LlmError::Unavailable("API key not set".to_string())),
        }
    }
}

#[async_trait]
impl<C> InferenceBackend for RemoteChatBackend<C>
where
    C: CredentialStore + Send + Sync + 'static,
    C::Error: Display,
{
    fn name(&self) -> &str {
        "remote"
    }

    async fn complete(&self, request: &InferenceRequest) -> Result<String, LlmError> {
        let api_key = self.api_key().await?;

        let body = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: request.system_instruction(),
                },
                ChatMessage {
                    role: "user",
                    content: request.user_prompt(),
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        debug!(model = %self.config.model, prompt_chars = request.user_prompt().len(), "Sending chat completion request");

        let response = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(self.config.timeout_secs)
                } else {
                    LlmError::Communication(format!("Request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::Communication(format!("HTTP {}: {}", status, error_text)));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        let choice = chat
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("Response contained no choices".to_string()))?;

        choice
            .message
            .and_then(|m| m.content)
            .ok_or_else(|| LlmError::InvalidResponse("First choice has no message content".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StaticCredential;

    #[test]
    fn test_completions_url() {
        let mut config = RemoteChatConfig::default();
        assert_eq!(config.completions_url(), "https://api.openai.com/v1/chat/completions");

        config.endpoint = "http://localhost:8000/v1/".to_string();
        assert_eq!(config.completions_url(), "http://localhost:8000/v1/chat/completions");
    }

    #[test]
    fn test_request_body_shape() {
        let body = ChatRequest {
            model: "m",
            messages: [
                ChatMessage { role: "system", content: "sys" },
                ChatMessage { role: "user", content: "usr" },
            ],
            temperature: 0.0,
            max_tokens: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "usr");
        assert!(json.get("max_tokens").is_none());
    }

    #[tokio::test]
    async fn test_missing_key_is_unavailable() {
        let backend = RemoteChatBackend::new(RemoteChatConfig::default(), StaticCredential::empty()).unwrap();
        let err = backend
            .complete(&InferenceRequest::new("s", "p"))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Unavailable(ref msg) if msg == "API key not set"));
    }

    #[tokio::test]
    async fn test_blank_key_is_unavailable() {
        let backend = RemoteChatBackend::new(RemoteChatConfig::default(), StaticCredential::new("   ")).unwrap();
        let err = backend
            .complete(&InferenceRequest::new("s", "p"))
            .await
            .unwrap_err();
        assert!(err.is_unavailable());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = RemoteChatConfig {
            timeout_secs: 0,
            ..RemoteChatConfig::default()
        };
        assert!(config.validate().is_err());

        let err = RemoteChatBackend::new(config, StaticCredential::new("sk-test")).err().unwrap();
        assert!(matches!(err, LlmError::Unavailable(ref msg) if msg.contains("timeout_secs")));
    }

    #[test]
    fn test_config_validation() {
        assert!(RemoteChatConfig::default().validate().is_ok());

        let blank_model = RemoteChatConfig {
            model: "  ".to_string(),
            ..RemoteChatConfig::default()
        };
        assert!(blank_model.validate().is_err());

        let hot = RemoteChatConfig {
            temperature: 3.5,
            ..RemoteChatConfig::default()
        };
        assert!(hot.validate().is_err());
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: RemoteChatConfig = serde_json::from_str(r#"{"model": "gpt-4o"}"#).unwrap();
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }
}
