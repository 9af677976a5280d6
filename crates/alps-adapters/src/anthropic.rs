//! Anthropic Messages API backend
//!
//! Forces a single tool call whose input schema is the extracted record, so
//! the response is always a structured object rather than free text.

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use alps_core::{
    ExtractedRecord, ExtractionError, LlmConfig, StructuredExtractor, EXTRACTION_SYSTEM_PROMPT,
};

use crate::error::{AdapterError, Result};

/// Name of the tool the model is forced to call
pub const RECORD_TOOL_NAME: &str = "record_subsection";

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_MODEL: &str = "claude-3-7-sonnet-20250219";

/// Structured extraction through the Anthropic Messages API
#[derive(Clone)]
pub struct AnthropicExtractor {
    http: Client,
    endpoint: Url,
    api_key: Secret<String>,
    model: String,
    max_tokens: u32,
    temperature: f32,
    read_timeout: Duration,
}

impl std::fmt::Debug for AnthropicExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicExtractor")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("read_timeout", &self.read_timeout)
            .finish()
    }
}

/// Builder for [`AnthropicExtractor`]
#[derive(Default)]
pub struct AnthropicExtractorBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    connect_timeout: Option<Duration>,
    read_timeout: Option<Duration>,
}

impl AnthropicExtractorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Time allowed to establish a connection
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Time allowed for the whole request, response included
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<AnthropicExtractor> {
        let api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AdapterError::Config("Anthropic API key is not set".to_string()))?;

        let mut base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let endpoint = Url::parse(&base_url)?.join("v1/messages")?;

        let connect_timeout = self.connect_timeout.unwrap_or(Duration::from_secs(60));
        let read_timeout = self.read_timeout.unwrap_or(Duration::from_secs(300));

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            "anthropic-version",
            header::HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        let http = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(read_timeout)
            .user_agent(format!("alps-parser/{}", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(AnthropicExtractor {
            http,
            endpoint,
            api_key: Secret::new(api_key),
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: self.max_tokens.unwrap_or(16 * 1024),
            temperature: self.temperature.unwrap_or(0.0),
            read_timeout,
        })
    }
}

impl AnthropicExtractor {
    pub fn builder() -> AnthropicExtractorBuilder {
        AnthropicExtractorBuilder::new()
    }

    /// Build from the `llm` configuration section
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        if !config.provider.eq_ignore_ascii_case("anthropic") {
            return Err(AdapterError::Config(format!(
                "Unsupported LLM provider: {}",
                config.provider
            )));
        }

        Self::builder()
            .base_url(config.base_url.clone())
            .api_key(config.api_key.clone())
            .model(config.model.clone())
            .max_tokens(config.max_tokens)
            .temperature(config.temperature)
            .connect_timeout(config.connect_timeout())
            .read_timeout(config.read_timeout())
            .build()
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_body<'a>(&'a self, block: &'a str) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system: EXTRACTION_SYSTEM_PROMPT,
            tools: vec![Tool {
                name: RECORD_TOOL_NAME,
                description: "Record the structured fields of one ALPS subsection",
                input_schema: ExtractedRecord::json_schema(),
            }],
            tool_choice: ToolChoice {
                kind: "tool",
                name: RECORD_TOOL_NAME,
            },
            messages: vec![Message {
                role: "user",
                content: format!(
                    "Extract the structured fields from this ALPS subsection:\n\n{block}"
                ),
            }],
        }
    }

    fn map_transport(&self, error: reqwest::Error) -> ExtractionError {
        if error.is_timeout() {
            ExtractionError::Timeout(self.read_timeout)
        } else {
            ExtractionError::Transport(error.to_string())
        }
    }
}

#[async_trait]
impl StructuredExtractor for AnthropicExtractor {
    #[instrument(skip(self, block), fields(model = %self.model, block_len = block.len()))]
    async fn extract(&self, block: &str) -> std::result::Result<ExtractedRecord, ExtractionError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .header("x-api-key", self.api_key.expose_secret())
            .json(&self.request_body(block))
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_transport(e))?;

        if !status.is_success() {
            return Err(ExtractionError::Api {
                status: status.as_u16(),
                message: api_error_message(status, &body),
            });
        }

        let parsed: MessagesResponse = serde_json::from_str(&body)
            .map_err(|e| ExtractionError::Malformed(format!("invalid response body: {e}")))?;

        debug!(
            stop_reason = parsed.stop_reason.as_deref().unwrap_or("unknown"),
            blocks = parsed.content.len(),
            "Received extraction response"
        );

        let input = parsed
            .content
            .into_iter()
            .find_map(|block| match block {
                ContentBlock::ToolUse { name, input } if name == RECORD_TOOL_NAME => Some(input),
                _ => None,
            })
            .ok_or_else(|| {
                ExtractionError::Malformed(format!("response has no {RECORD_TOOL_NAME} tool call"))
            })?;

        serde_json::from_value(input)
            .map_err(|e| ExtractionError::Malformed(format!("tool input does not match record: {e}")))
    }

    fn name(&self) -> &'static str {
        "anthropic"
    }
}

/// Prefer the API's own error message over the raw body
fn api_error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ApiErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .ok()
        .filter(|message| !message.is_empty())
        .or_else(|| Some(body.trim().to_string()).filter(|b| !b.is_empty()))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string())
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    tools: Vec<Tool<'a>>,
    tool_choice: ToolChoice<'a>,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Tool<'a> {
    name: &'a str,
    description: &'a str,
    input_schema: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct ToolChoice<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    ToolUse {
        name: String,
        input: serde_json::Value,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}
