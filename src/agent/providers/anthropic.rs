//! Anthropic Messages API provider over plain HTTP.
//!
//! The wire format maps one-to-one onto this crate's message model (typed
//! content blocks, separate system field, `stop_reason` vocabulary), so the
//! provider serializes requests directly instead of going through an SDK.

use serde::{Deserialize, Serialize};

use async_trait::async_trait;

use crate::config::Config;
use crate::error::AgentError;
use crate::tools::ToolDefinition;

use super::super::message::{ContentBlock, Message};
use super::super::provider::{Completion, CompletionRequest, ReasoningModel, StopReason};

/// Default API origin.
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
/// Messages API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Messages API provider.
pub struct AnthropicProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout_secs: u64,
}

#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    system: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    tools: &'a [ToolDefinition],
}

#[derive(Deserialize)]
struct WireResponse {
    content: Vec<ContentBlock>,
    stop_reason: Option<StopReason>,
}

impl AnthropicProvider {
    /// Creates a provider from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiRequest`] if the HTTP client cannot be
    /// constructed.
    pub fn new(config: &Config) -> Result<Self, AgentError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AgentError::ApiRequest {
                message: format!("failed to build HTTP client: {e}"),
                status: None,
            })?;

        Ok(Self {
            http,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            timeout_secs: config.request_timeout.as_secs(),
        })
    }

    fn build_wire<'a>(&'a self, request: &'a CompletionRequest) -> WireRequest<'a> {
        WireRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            // The API rejects temperature 0.0 on some models; omit the
            // default instead of sending it.
            temperature: (request.temperature != 0.0).then_some(request.temperature),
            system: &request.system,
            messages: &request.messages,
            tools: &request.tools,
        }
    }
}

impl std::fmt::Debug for AnthropicProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicProvider")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ReasoningModel for AnthropicProvider {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, AgentError> {
        let wire = self.build_wire(request);

        let response = self
            .http
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&wire)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AgentError::ModelTimeout {
                        seconds: self.timeout_secs,
                    }
                } else {
                    AgentError::ApiRequest {
                        message: e.to_string(),
                        status: None,
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::ApiRequest {
                message: body,
                status: Some(status.as_u16()),
            });
        }

        let parsed: WireResponse = response.json().await.map_err(|e| AgentError::ApiRequest {
            message: format!("invalid response body: {e}"),
            status: Some(status.as_u16()),
        })?;

        Ok(Completion {
            stop_reason: parsed.stop_reason.unwrap_or(StopReason::Other),
            content: parsed.content,
        })
    }
}
