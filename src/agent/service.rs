//! Exposed surface consumed by the transport layer.
//!
//! [`AssistantService`] wires the reasoning model, the tool registry, and
//! the search engine together. All collaborators are injected explicitly at
//! construction; the service holds no global state and is safe to share
//! across concurrent sessions.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::AgentError;
use crate::search::{HybridSearchEngine, SearchResponse};
use crate::tools::ToolRegistry;

use super::message::{Message, first_text};
use super::prompt::{compose_system, compose_user};
use super::provider::{CompletionRequest, ReasoningModel};
use super::tool_loop::{LoopOptions, run_tool_loop};

/// A question with its structured dialogue context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRequest {
    /// System framing for the model.
    pub system_framing: String,
    /// Caller-specific framing appended to the system message.
    pub user_framing: String,
    /// The user's question.
    pub question: String,
    /// Entities detected by the upstream NLU layer.
    #[serde(default)]
    pub entities: Vec<Value>,
    /// Classified intent of the question.
    pub intent: String,
    /// Whether the model may invoke tools.
    #[serde(default)]
    pub use_tools: bool,
    /// Restricts tool use to these names; `None` means all registered tools.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_tools: Option<Vec<String>>,
}

/// The generated answer with timing and model identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResponse {
    /// The model's answer text.
    pub answer: String,
    /// Identifier of the model that produced it.
    pub model: String,
    /// Wall-clock processing time.
    pub elapsed_seconds: f64,
}

/// Service identity for health reporting.
#[derive(Debug, Clone, Serialize)]
pub struct Availability {
    /// Configured provider name.
    pub provider: String,
    /// Configured model identifier.
    pub model: String,
    /// Names of the registered tools.
    pub tools: Vec<String>,
}

/// Question-answering facade over the reasoning model and the retrieval
/// engine.
pub struct AssistantService {
    provider: Arc<dyn ReasoningModel>,
    registry: Arc<ToolRegistry>,
    engine: Arc<HybridSearchEngine>,
    options: LoopOptions,
}

impl AssistantService {
    /// Creates the service from its collaborators.
    #[must_use]
    pub const fn new(
        provider: Arc<dyn ReasoningModel>,
        registry: Arc<ToolRegistry>,
        engine: Arc<HybridSearchEngine>,
        options: LoopOptions,
    ) -> Self {
        Self {
            provider,
            registry,
            engine,
            options,
        }
    }

    /// Answers a question, optionally letting the model invoke tools.
    ///
    /// Input fields are validated before any external call. With tools
    /// disabled, or when none of the requested tools are registered, a
    /// single direct model call is made.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidInput`] for empty fields and propagates
    /// reasoning-model failures.
    pub async fn answer(&self, request: &AnswerRequest) -> Result<AnswerResponse, AgentError> {
        validate(&request.question, "pregunta")?;
        validate(&request.system_framing, "context.system")?;
        validate(&request.user_framing, "context.user")?;
        validate(&request.intent, "intencion")?;

        let start = Instant::now();
        let system = compose_system(&request.system_framing, &request.user_framing);
        let user = compose_user(&request.question, &request.entities, &request.intent);

        info!(
            intent = %request.intent,
            use_tools = request.use_tools,
            entities = request.entities.len(),
            "processing question"
        );

        let answer = if request.use_tools {
            let definitions = self.registry.definitions(request.available_tools.as_deref());
            if definitions.is_empty() {
                warn!("no tools available, falling back to direct completion");
                self.direct_answer(system, user).await?
            } else {
                run_tool_loop(
                    self.provider.as_ref(),
                    &self.registry,
                    &system,
                    &user,
                    definitions,
                    self.options,
                )
                .await?
            }
        } else {
            self.direct_answer(system, user).await?
        };

        Ok(AnswerResponse {
            answer,
            model: self.provider.model_id().to_string(),
            elapsed_seconds: start.elapsed().as_secs_f64(),
        })
    }

    /// Plain hybrid search, for the transport layer's search endpoint.
    ///
    /// An empty result set is a successful response, distinct from any
    /// error signal.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidInput`] for an empty query and
    /// propagates fatal search-path failures.
    pub async fn search(
        &self,
        query: &str,
        max_results: usize,
        confidence_threshold: f64,
    ) -> Result<SearchResponse, AgentError> {
        validate(query, "query")?;
        Ok(self
            .engine
            .search(query, max_results, confidence_threshold)
            .await?)
    }

    /// Reports provider and tool identity for health checks.
    #[must_use]
    pub fn availability(&self) -> Availability {
        Availability {
            provider: self.provider.name().to_string(),
            model: self.provider.model_id().to_string(),
            tools: self.registry.tool_names(),
        }
    }

    async fn direct_answer(&self, system: String, user: String) -> Result<String, AgentError> {
        let completion = self
            .provider
            .complete(&CompletionRequest {
                system,
                messages: vec![Message::user_text(user)],
                tools: Vec::new(),
                max_tokens: self.options.max_tokens,
                temperature: self.options.temperature,
            })
            .await?;
        Ok(first_text(&completion.content).unwrap_or_default().to_string())
    }
}

impl std::fmt::Debug for AssistantService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistantService")
            .field("provider", &self.provider.name())
            .field("model", &self.provider.model_id())
            .field("tools", &self.registry.tool_names())
            .finish_non_exhaustive()
    }
}

fn validate(value: &str, field: &'static str) -> Result<(), AgentError> {
    if value.trim().is_empty() {
        return Err(AgentError::InvalidInput { field });
    }
    Ok(())
}
