//! Pluggable reasoning-model trait.
//!
//! Implementations translate the provider-agnostic request/response pair
//! into vendor SDK or HTTP calls, keeping the agent loop decoupled from any
//! particular model vendor.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AgentError;
use crate::tools::ToolDefinition;

use super::message::{ContentBlock, Message};

/// Terminal signal of one model turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The model finished with a plain answer.
    EndTurn,
    /// The model requested one or more tools.
    ToolUse,
    /// Generation hit the token limit.
    MaxTokens,
    /// Anything this core does not recognize.
    #[serde(other)]
    Other,
}

/// A completion request (provider-agnostic).
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System framing, kept outside the message list.
    pub system: String,
    /// Ordered conversation messages.
    pub messages: Vec<Message>,
    /// Tool definitions available to the model; empty disables tool use.
    pub tools: Vec<ToolDefinition>,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

/// One model turn: the stop signal plus the raw content blocks.
#[derive(Debug, Clone)]
pub struct Completion {
    /// Why the model stopped.
    pub stop_reason: StopReason,
    /// Content blocks in emission order.
    pub content: Vec<ContentBlock>,
}

/// Trait for reasoning-model backends.
///
/// Implementations own the transport layer (HTTP, SDK calls, timeouts) and
/// must apply an explicit per-call timeout; a timed-out call is fatal to
/// the session and surfaces as [`AgentError::ModelTimeout`].
#[async_trait]
pub trait ReasoningModel: Send + Sync {
    /// Provider name (e.g. `"anthropic"`, `"openrouter"`).
    fn name(&self) -> &'static str;

    /// Identifier of the configured model.
    fn model_id(&self) -> &str;

    /// Executes one completion turn.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on transport failures, API errors, or
    /// timeouts; these propagate to the caller rather than degrading.
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, AgentError>;
}
