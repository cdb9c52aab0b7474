//! OpenAI-compatible provider using the `async-openai` crate.
//!
//! Pointed at OpenRouter by default, but works against any endpoint that
//! follows the OpenAI chat-completion spec via the base URL override.
//! Translates between this crate's content-block model and the flat
//! message/tool-call shape of the chat-completion API.

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessage,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestToolMessage, ChatCompletionRequestUserMessage, ChatCompletionTool,
    ChatCompletionToolType, CreateChatCompletionRequest, FunctionCall, FunctionObject,
};
use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::config::Config;
use crate::error::AgentError;
use crate::tools::ToolUse;

use super::super::message::{ContentBlock, Message, Role};
use super::super::provider::{Completion, CompletionRequest, ReasoningModel, StopReason};

/// Default OpenRouter API origin.
const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// OpenAI-compatible reasoning-model provider.
pub struct OpenRouterProvider {
    client: Client<OpenAIConfig>,
    model: String,
    timeout: std::time::Duration,
}

impl OpenRouterProvider {
    /// Creates a provider from configuration.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.api_key)
            .with_api_base(
                config
                    .base_url
                    .clone()
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            );

        Self {
            client: Client::with_config(openai_config),
            model: config.model.clone(),
            timeout: config.request_timeout,
        }
    }

    /// Flattens one block-structured message into chat-completion messages.
    ///
    /// Tool results become individual `tool`-role messages; a user message
    /// may therefore expand into several wire messages.
    fn convert_message(msg: &Message) -> Vec<ChatCompletionRequestMessage> {
        let mut out = Vec::new();
        match msg.role {
            Role::User => {
                for block in &msg.content {
                    if let ContentBlock::ToolResult {
                        tool_use_id,
                        content,
                    } = block
                    {
                        out.push(ChatCompletionRequestMessage::Tool(
                            ChatCompletionRequestToolMessage {
                                content:
                                    async_openai::types::ChatCompletionRequestToolMessageContent::Text(
                                        content.clone(),
                                    ),
                                tool_call_id: tool_use_id.clone(),
                            },
                        ));
                    }
                }
                let text = joined_text(&msg.content);
                if !text.is_empty() {
                    out.push(ChatCompletionRequestMessage::User(
                        ChatCompletionRequestUserMessage {
                            content:
                                async_openai::types::ChatCompletionRequestUserMessageContent::Text(
                                    text,
                                ),
                            name: None,
                        },
                    ));
                }
            }
            Role::Assistant => {
                let tool_calls: Vec<ChatCompletionMessageToolCall> = msg
                    .content
                    .iter()
                    .filter_map(|block| match block {
                        ContentBlock::ToolUse(tool_use) => Some(ChatCompletionMessageToolCall {
                            id: tool_use.id.clone(),
                            r#type: ChatCompletionToolType::Function,
                            function: FunctionCall {
                                name: tool_use.name.clone(),
                                arguments: tool_use.input.to_string(),
                            },
                        }),
                        _ => None,
                    })
                    .collect();

                let text = joined_text(&msg.content);
                let content = (!text.is_empty()).then(|| {
                    async_openai::types::ChatCompletionRequestAssistantMessageContent::Text(text)
                });

                #[allow(deprecated)]
                out.push(ChatCompletionRequestMessage::Assistant(
                    ChatCompletionRequestAssistantMessage {
                        content,
                        name: None,
                        tool_calls: (!tool_calls.is_empty()).then_some(tool_calls),
                        refusal: None,
                        audio: None,
                        function_call: None,
                    },
                ));
            }
        }
        out
    }

    /// Builds the chat-completion request from our generic request.
    fn build_request(&self, request: &CompletionRequest) -> CreateChatCompletionRequest {
        let mut messages = vec![ChatCompletionRequestMessage::System(
            ChatCompletionRequestSystemMessage {
                content: async_openai::types::ChatCompletionRequestSystemMessageContent::Text(
                    request.system.clone(),
                ),
                name: None,
            },
        )];
        messages.extend(request.messages.iter().flat_map(Self::convert_message));

        let tools = if request.tools.is_empty() {
            None
        } else {
            Some(
                request
                    .tools
                    .iter()
                    .map(|td| ChatCompletionTool {
                        r#type: ChatCompletionToolType::Function,
                        function: FunctionObject {
                            name: td.name.clone(),
                            description: Some(td.description.clone()),
                            parameters: Some(td.input_schema.clone()),
                            strict: None,
                        },
                    })
                    .collect(),
            )
        };

        CreateChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: Some(request.temperature).filter(|&t| t != 0.0),
            max_completion_tokens: Some(request.max_tokens),
            tools,
            ..Default::default()
        }
    }
}

/// Concatenated text blocks of a message.
fn joined_text(blocks: &[ContentBlock]) -> String {
    blocks
        .iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Maps an OpenAI finish reason onto the stop-reason vocabulary.
fn map_finish_reason(finish_reason: Option<&str>) -> StopReason {
    match finish_reason {
        Some("stop") => StopReason::EndTurn,
        Some("toolcalls" | "tool_calls") => StopReason::ToolUse,
        Some("length") => StopReason::MaxTokens,
        _ => StopReason::Other,
    }
}

impl std::fmt::Debug for OpenRouterProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouterProvider")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ReasoningModel for OpenRouterProvider {
    fn name(&self) -> &'static str {
        "openrouter"
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, AgentError> {
        let wire = self.build_request(request);

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(wire))
            .await
            .map_err(|_| AgentError::ModelTimeout {
                seconds: self.timeout.as_secs(),
            })?
            .map_err(|e| AgentError::ApiRequest {
                message: e.to_string(),
                status: None,
            })?;

        let choice = response.choices.first();

        let mut content = Vec::new();
        if let Some(text) = choice.and_then(|c| c.message.content.clone()) {
            if !text.is_empty() {
                content.push(ContentBlock::Text { text });
            }
        }
        if let Some(tool_calls) = choice.and_then(|c| c.message.tool_calls.as_ref()) {
            for tc in tool_calls {
                let input: Value = match serde_json::from_str(&tc.function.arguments) {
                    Ok(value) => value,
                    Err(e) => {
                        warn!(tool = %tc.function.name, error = %e, "unparseable tool arguments");
                        Value::Null
                    }
                };
                content.push(ContentBlock::ToolUse(ToolUse {
                    id: tc.id.clone(),
                    name: tc.function.name.clone(),
                    input,
                }));
            }
        }

        let finish = choice.and_then(|c| {
            c.finish_reason
                .as_ref()
                .map(|fr| format!("{fr:?}").to_lowercase())
        });

        Ok(Completion {
            stop_reason: map_finish_reason(finish.as_deref()),
            content,
        })
    }
}
