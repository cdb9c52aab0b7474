//! Concrete reasoning-model providers and the provider factory.

pub mod anthropic;
pub mod openrouter;

use std::sync::Arc;

use crate::config::Config;
use crate::error::AgentError;

use super::provider::ReasoningModel;

pub use anthropic::AnthropicProvider;
pub use openrouter::OpenRouterProvider;

/// Creates a [`ReasoningModel`] from the configured provider name.
///
/// # Supported providers
///
/// - `"anthropic"` (default) — Anthropic Messages API over HTTP
/// - `"openrouter"` — any OpenAI-compatible endpoint via `async-openai`
///
/// # Errors
///
/// Returns [`AgentError::UnsupportedProvider`] for unknown names and
/// propagates provider construction failures.
pub fn create_provider(config: &Config) -> Result<Arc<dyn ReasoningModel>, AgentError> {
    match config.provider.as_str() {
        "anthropic" => Ok(Arc::new(AnthropicProvider::new(config)?)),
        "openrouter" => Ok(Arc::new(OpenRouterProvider::new(config))),
        other => Err(AgentError::UnsupportedProvider {
            name: other.to_string(),
        }),
    }
}
