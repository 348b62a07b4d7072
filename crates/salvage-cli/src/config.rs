//! Pipeline configuration.
//!
//! One TOML file drives every command:
//!
//! ```toml
//! [llm]
//! endpoint = "http://localhost:1234/v1/chat/completions"
//! model = "phi3:mini"
//!
//! [extraction]
//! max_content_words = 150
//!
//! [batch]
//! pages_per_iteration = 2
//!
//! [retry]
//! model = "mistral-7b-instruct-v0.2"
//!
//! [paths]
//! input_file = "data/pages.json"
//! ```

use crate::error::{CliError, Result};
use salvage_extractor::ExtractorConfig;
use salvage_llm::ChatConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Complete pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Chat completions endpoint and generation settings
    pub llm: ChatConfig,

    /// Page screening and chunking
    pub extraction: ExtractorConfig,

    /// How much work one `extract` run does
    pub batch: BatchSettings,

    /// Overrides applied by `retry`
    pub retry: RetrySettings,

    /// Input, state and output files
    pub paths: Paths,
}

/// Settings for one `extract` iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSettings {
    /// Pages processed per run
    pub pages_per_iteration: usize,

    /// Pause between pages (milliseconds)
    pub page_delay_ms: u64,
}

/// Settings for `retry`; unset overrides keep the `[llm]` value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Model used for retries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Sampling temperature for retries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum tokens to generate per retry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Request timeout for retries (seconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Failed pages retried per run
    pub pages_per_iteration: usize,
}

/// File locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Paths {
    /// Pages to extract from: `{"pages": [...]}`
    pub input_file: PathBuf,

    /// Checkpoint state
    pub state_file: PathBuf,

    /// Knowledge graph output
    pub output_file: PathBuf,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            pages_per_iteration: 2,
            page_delay_ms: 1000,
        }
    }
}

impl BatchSettings {
    /// Pause between pages
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            model: None,
            temperature: Some(0.2),
            max_tokens: Some(1024),
            timeout_secs: Some(1200),
            pages_per_iteration: 1,
        }
    }
}

impl RetrySettings {
    /// `base` with the retry overrides applied
    pub fn chat_config(&self, base: &ChatConfig) -> ChatConfig {
        let mut config = base.clone();
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(temperature) = self.temperature {
            config.temperature = temperature;
        }
        if let Some(max_tokens) = self.max_tokens {
            config.max_tokens = max_tokens;
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config.timeout_secs = timeout_secs;
        }
        config
    }

    /// `base` with the page timeout raised to cover one retry request
    pub fn extractor_config(&self, base: &ExtractorConfig) -> ExtractorConfig {
        let mut config = base.clone();
        if let Some(timeout_secs) = self.timeout_secs {
            config.extraction_timeout_secs = config.extraction_timeout_secs.max(timeout_secs);
        }
        config
    }
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            input_file: PathBuf::from("data/pages.json"),
            state_file: PathBuf::from("data/extraction-state.json"),
            output_file: PathBuf::from("data/knowledge-graph.json"),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from `path`, or defaults if the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(CliError::file(path))?;
        let config: PipelineConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Use `api_key` for the endpoint when given.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        if api_key.is_some() {
            self.llm.api_key = api_key;
        }
        self
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.llm
            .validate()
            .map_err(|e| CliError::Config(format!("[llm] {}", e)))?;
        self.retry
            .chat_config(&self.llm)
            .validate()
            .map_err(|e| CliError::Config(format!("[retry] {}", e)))?;
        self.extraction
            .validate()
            .map_err(|e| CliError::Config(format!("[extraction] {}", e)))?;
        if self.batch.pages_per_iteration == 0 {
            return Err(CliError::Config(
                "[batch] pages_per_iteration must be greater than 0".to_string(),
            ));
        }
        if self.retry.pages_per_iteration == 0 {
            return Err(CliError::Config(
                "[retry] pages_per_iteration must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
