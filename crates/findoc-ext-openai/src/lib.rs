//! # FinDoc Ext OpenAI
//!
//! [`StructuredAnalyzer`] implementation backed by an OpenAI-compatible
//! chat-completion endpoint running in JSON mode.
//!
//! The analyzer owns the prompt and schema contract (see [`prompts`]). It
//! does not retry; a failed call is reported to the pipeline as is.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod prompts;
pub mod response;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use findoc_traits::analysis::StructuredAnalyzer;
use findoc_traits::{InvestmentReport, TraitError};

use crate::response::{
    parse_report, truncate_chars, ChatCompletionRequest, ChatCompletionResponse, ChatMessage,
    ResponseFormat,
};

/// OpenAI analyzer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// API key (usually supplied through `OPENAI_API_KEY`)
    #[serde(default, skip_serializing)]
    pub api_key: String,

    /// API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Chat model
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature; low for faithful extraction
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Output token cap
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Statement text beyond this many characters is dropped
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,

    /// Whole-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_tokens() -> u32 {
    4000
}

fn default_max_text_chars() -> usize {
    100_000
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            max_text_chars: default_max_text_chars(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Structured analyzer using OpenAI chat completions.
#[derive(Clone)]
pub struct OpenAiAnalyzer {
    client: Client,
    config: OpenAiConfig,
    endpoint: String,
}

impl OpenAiAnalyzer {
    /// Create an analyzer. Fails when the API key is missing.
    pub fn new(config: OpenAiConfig) -> Result<Self, TraitError> {
        if config.api_key.trim().is_empty() {
            return Err(TraitError::InvalidInput("OpenAI API key not configured".into()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| TraitError::Internal(format!("failed to build HTTP client: {}", e)))?;

        let endpoint = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));

        Ok(Self {
            client,
            config,
            endpoint,
        })
    }

    /// The model in use.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Build the request body for a statement.
    pub fn build_request(&self, statement_text: &str) -> ChatCompletionRequest {
        let text = truncate_chars(statement_text, self.config.max_text_chars);
        if text.len() < statement_text.len() {
            warn!(
                max_chars = self.config.max_text_chars,
                "Statement text truncated before analysis"
            );
        }

        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: prompts::SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompts::user_prompt(text),
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        }
    }

    async fn complete(&self, request: &ChatCompletionRequest) -> Result<String, TraitError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TraitError::AnalysisFailed(format!(
                "API request failed: status {}, body: {}",
                status, body
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| TraitError::ParseError(format!("unreadable completion: {}", e)))?;

        completion
            .first_content()
            .map(str::to_string)
            .ok_or_else(|| TraitError::AnalysisFailed("model returned no content".into()))
    }
}

fn map_transport_error(e: reqwest::Error) -> TraitError {
    if e.is_timeout() {
        TraitError::Timeout
    } else if e.is_connect() {
        TraitError::ConnectionFailed(e.to_string())
    } else {
        TraitError::AnalysisFailed(e.to_string())
    }
}

#[async_trait]
impl StructuredAnalyzer for OpenAiAnalyzer {
    async fn analyze(&self, text: &str) -> Result<InvestmentReport, TraitError> {
        let request = self.build_request(text);
        debug!(model = %self.config.model, chars = text.len(), "Requesting structured analysis");

        let content = self.complete(&request).await?;
        let report = parse_report(&content)?;

        debug!(
            classes = report.classification.classes.len(),
            stocks = report.stocks.stocks.len(),
            fixed_income = report.fixed_income.assets.len(),
            "Structured analysis parsed"
        );
        Ok(report)
    }

    fn name(&self) -> &str {
        "openai"
    }
}
