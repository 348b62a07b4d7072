//! Salvage LLM Provider Layer
//!
//! The boundary between the extraction pipeline and the language model.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `ChatProvider`: OpenAI-compatible `chat/completions` endpoint (LM Studio,
//!   Ollama's `/v1` API, llama.cpp server, ...)
//!
//! # Examples
//!
//! ```
//! use salvage_llm::{ChatRequest, LlmProvider, MockProvider};
//!
//! # async fn example() {
//! let provider = MockProvider::new("Hello from LLM!");
//! let result = provider.generate(&ChatRequest::new("test prompt")).await.unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! # }
//! ```

#![warn(missing_docs)]

pub mod chat;

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use chat::{ChatConfig, ChatProvider};

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Request took longer than the configured timeout
    #[error("Request timeout")]
    Timeout,

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// One completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// User prompt
    pub prompt: String,

    /// Optional system prompt, merged into the user message when sent
    pub system: Option<String>,
}

impl ChatRequest {
    /// Create a request with only a user prompt
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system: None,
        }
    }

    /// Set the system prompt
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// The single user message actually sent.
    ///
    /// Local servers often reject the system role, so the system prompt is
    /// prepended to the user prompt instead.
    pub fn combined_prompt(&self) -> String {
        match &self.system {
            Some(system) => format!("{}\n\n{}", system, self.prompt),
            None => self.prompt.clone(),
        }
    }
}

/// Trait for LLM provider operations
pub trait LlmProvider: Send + Sync {
    /// Generate a completion for `request`
    fn generate(
        &self,
        request: &ChatRequest,
    ) -> impl Future<Output = Result<String, LlmError>> + Send;

    /// Name of the model answering requests
    fn model_name(&self) -> &str;
}

/// Mock LLM provider for deterministic testing
///
/// This provider returns pre-configured responses without making any network calls.
/// Specific responses are selected when the user prompt contains their key.
///
/// # Examples
///
/// ```
/// use salvage_llm::{ChatRequest, LlmProvider, MockProvider};
///
/// # async fn example() {
/// let mut provider = MockProvider::default();
/// provider.add_response("aspirin", r#"[{"subject":"aspirin"}]"#);
///
/// let reply = provider.generate(&ChatRequest::new("Facts about aspirin")).await.unwrap();
/// assert_eq!(reply, r#"[{"subject":"aspirin"}]"#);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    model: String,
    default_response: String,
    responses: Arc<Mutex<Vec<(String, MockReply)>>>,
    requests: Arc<Mutex<Vec<ChatRequest>>>,
}

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Error,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            model: "mock".to_string(),
            default_response: response.into(),
            responses: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the reported model name
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Respond with `response` when the user prompt contains `key`
    pub fn add_response(&mut self, key: impl Into<String>, response: impl Into<String>) {
        self.lock_responses()
            .push((key.into(), MockReply::Text(response.into())));
    }

    /// Fail when the user prompt contains `key`
    pub fn add_error(&mut self, key: impl Into<String>) {
        self.lock_responses().push((key.into(), MockReply::Error));
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        self.lock_requests().len()
    }

    /// Every request received so far, oldest first
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.lock_requests().clone()
    }

    /// Forget recorded requests
    pub fn reset_call_count(&self) {
        self.lock_requests().clear();
    }

    fn lock_responses(&self) -> std::sync::MutexGuard<'_, Vec<(String, MockReply)>> {
        self.responses
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_requests(&self) -> std::sync::MutexGuard<'_, Vec<ChatRequest>> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn reply_for(&self, request: &ChatRequest) -> Result<String, LlmError> {
        self.lock_requests().push(request.clone());

        let responses = self.lock_responses();
        let matched = responses
            .iter()
            .find(|(key, _)| request.prompt.contains(key.as_str()));

        match matched {
            Some((_, MockReply::Text(text))) => Ok(text.clone()),
            Some((_, MockReply::Error)) => Err(LlmError::Other("Mock error".to_string())),
            None => Ok(self.default_response.clone()),
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProvider for MockProvider {
    async fn generate(&self, request: &ChatRequest) -> Result<String, LlmError> {
        self.reply_for(request)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
