//! OpenAI-compatible chat completions provider
//!
//! Talks to any server exposing `POST .../v1/chat/completions`: LM Studio,
//! Ollama's OpenAI layer, llama.cpp server. CPU inference on local models can
//! take many minutes per request, so the default timeout is generous.
//!
//! # Features
//!
//! - Bearer-token authentication
//! - Retry logic with exponential backoff
//! - Timeout handling

use crate::{ChatRequest, LlmError, LlmProvider};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default chat completions endpoint (Ollama's OpenAI-compatible API)
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434/v1/chat/completions";

/// Default model
pub const DEFAULT_MODEL: &str = "phi3:mini";

/// Default timeout for LLM requests (5 minutes)
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Default number of attempts per request
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Chat provider configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Full URL of the chat completions endpoint
    pub endpoint: String,

    /// Model name sent with every request
    pub model: String,

    /// Bearer token; local servers usually accept anything
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Request timeout (seconds)
    pub timeout_secs: u64,

    /// Attempts per request before giving up
    pub max_retries: u32,

    /// Delay before the first retry (milliseconds); doubles on each retry
    pub retry_backoff_ms: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            max_tokens: 1000,
            temperature: 0.2,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff_ms: 1000,
        }
    }
}

impl ChatConfig {
    /// Get the request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.endpoint.trim().is_empty() {
            return Err("endpoint must not be empty".to_string());
        }
        if self.model.trim().is_empty() {
            return Err("model must not be empty".to_string());
        }
        if self.max_tokens == 0 {
            return Err("max_tokens must be greater than 0".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!("temperature {} out of range [0.0, 2.0]", self.temperature));
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }
        if self.max_retries == 0 {
            return Err("max_retries must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Provider for OpenAI-compatible chat completion servers
#[derive(Debug, Clone)]
pub struct ChatProvider {
    config: ChatConfig,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

impl ChatProvider {
    /// Create a provider from `config`
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Other`] if the configuration is invalid or the
    /// HTTP client cannot be built.
    pub fn new(config: ChatConfig) -> Result<Self, LlmError> {
        config.validate().map_err(LlmError::Other)?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// The active configuration
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    fn completion_body<'a>(&'a self, request: &ChatRequest) -> CompletionRequest<'a> {
        CompletionRequest {
            model: &self.config.model,
            messages: vec![Message {
                role: "user".to_string(),
                content: request.combined_prompt(),
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        }
    }

    async fn send_once(&self, body: &CompletionRequest<'_>) -> Result<String, AttemptError> {
        let mut builder = self.client.post(&self.config.endpoint).json(body);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                AttemptError::Retry(LlmError::Timeout)
            } else {
                AttemptError::Retry(LlmError::Communication(format!("Request failed: {}", e)))
            }
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(AttemptError::Fatal(LlmError::ModelNotAvailable(
                self.config.model.clone(),
            )));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AttemptError::Retry(LlmError::RateLimitExceeded));
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AttemptError::Retry(LlmError::Communication(format!(
                "HTTP {}: {}",
                status, error_text
            ))));
        }

        let completion = response.json::<CompletionResponse>().await.map_err(|e| {
            AttemptError::Fatal(LlmError::InvalidResponse(format!(
                "Failed to parse response: {}",
                e
            )))
        })?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| {
                AttemptError::Fatal(LlmError::InvalidResponse(
                    "Response contained no choices".to_string(),
                ))
            })
    }
}

/// Outcome of a failed attempt
enum AttemptError {
    Retry(LlmError),
    Fatal(LlmError),
}

impl LlmProvider for ChatProvider {
    async fn generate(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let body = self.completion_body(request);
        debug!(
            model = %self.config.model,
            prompt_chars = body.messages[0].content.len(),
            max_tokens = body.max_tokens,
            temperature = body.temperature,
            "Sending chat completion request"
        );

        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.config.max_retries {
            match self.send_once(&body).await {
                Ok(content) => return Ok(content),
                Err(AttemptError::Fatal(e)) => return Err(e),
                Err(AttemptError::Retry(e)) => {
                    warn!(attempt = attempts + 1, error = %e, "Chat completion attempt failed");
                    last_error = Some(e);
                }
            }

            attempts += 1;
            if attempts < self.config.max_retries {
                // Exponential backoff: 1x, 2x, 4x the base delay
                let delay = self.config.retry_backoff_ms * 2u64.pow(attempts - 1);
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ChatConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.timeout(), Duration::from_secs(300));
    }

    #[test]
    fn test_invalid_configs() {
        let mut config = ChatConfig::default();
        config.temperature = 3.5;
        assert!(config.validate().is_err());

        let mut config = ChatConfig::default();
        config.model = " ".to_string();
        assert!(config.validate().is_err());

        let mut config = ChatConfig::default();
        config.max_retries = 0;
        assert!(ChatProvider::new(config).is_err());
    }

    #[test]
    fn test_completion_body_merges_system_prompt() {
        let config = ChatConfig {
            max_tokens: 1024,
            temperature: 0.0,
            ..ChatConfig::default()
        };
        let provider = ChatProvider::new(config).unwrap();

        let body = provider.completion_body(&ChatRequest::new("p").with_system("s"));
        assert_eq!(body.max_tokens, 1024);
        assert_eq!(body.temperature, 0.0);
        assert_eq!(body.messages.len(), 1);
        assert_eq!(body.messages[0].role, "user");
        assert_eq!(body.messages[0].content, "s\n\np");
    }

    #[test]
    fn test_completion_body_serializes() {
        let provider = ChatProvider::new(ChatConfig::default()).unwrap();
        let body = serde_json::to_value(provider.completion_body(&ChatRequest::new("p"))).unwrap();
        assert_eq!(body["model"], DEFAULT_MODEL);
        assert_eq!(body["messages"][0]["content"], "p");
    }

    #[tokio::test]
    async fn test_chat_error_handling() {
        // Use invalid endpoint to trigger error
        let config = ChatConfig {
            endpoint: "http://localhost:99999/v1/chat/completions".to_string(),
            max_retries: 1,
            ..ChatConfig::default()
        };
        let provider = ChatProvider::new(config).unwrap();

        let result = provider.generate(&ChatRequest::new("test")).await;
        assert!(matches!(result, Err(LlmError::Communication(_))));
    }
}
