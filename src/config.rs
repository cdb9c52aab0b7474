//! Component configuration with builder pattern and environment support.
//!
//! Resolution order: explicit values → environment variables → defaults.
//! File-based configuration loading belongs to the process wiring outside
//! this crate.

use std::time::Duration;

use crate::agent::tool_loop::{DEFAULT_MAX_ITERATIONS, LoopOptions};
use crate::error::AgentError;
use crate::search::FallbackPolicy;
use crate::tools::email::DEFAULT_EMAIL_SERVICE_URL;

/// Default reasoning-model identifier.
const DEFAULT_MODEL: &str = "claude-haiku-4-5";
/// Default maximum tokens per model turn.
const DEFAULT_MAX_TOKENS: u32 = 2000;
/// Default sampling temperature.
const DEFAULT_TEMPERATURE: f32 = 0.0;
/// Default reasoning-model request timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
/// Default per-tool execution timeout in seconds.
const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 30;
/// Default result count for plain search.
const DEFAULT_MAX_RESULTS: usize = 3;
/// Default confidence threshold for plain search.
const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.4;

/// Configuration for the assistant core.
#[derive(Debug, Clone)]
pub struct Config {
    /// Reasoning-model provider name (`"anthropic"` or `"openrouter"`).
    pub provider: String,
    /// API key for the provider.
    pub api_key: String,
    /// Optional base URL override (proxies, compatible APIs).
    pub base_url: Option<String>,
    /// Model identifier.
    pub model: String,
    /// Maximum tokens per model turn.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Reasoning-model request timeout.
    pub request_timeout: Duration,
    /// Per-tool execution timeout.
    pub tool_timeout: Duration,
    /// Maximum tool-loop iterations per session.
    pub max_iterations: usize,
    /// Default result count for plain search.
    pub default_max_results: usize,
    /// Default confidence threshold for plain search.
    pub default_confidence_threshold: f64,
    /// Fallback cascade applied when nothing clears the threshold.
    pub fallback: FallbackPolicy,
    /// URL of the external email dispatch service.
    pub email_service_url: String,
}

impl Config {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if no API key is found.
    pub fn from_env() -> Result<Self, AgentError> {
        Self::builder().from_env().build()
    }

    /// Loop parameters derived from this configuration.
    #[must_use]
    pub const fn loop_options(&self) -> LoopOptions {
        LoopOptions {
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            max_iterations: self.max_iterations,
        }
    }
}

/// Builder for [`Config`].
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    provider: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    request_timeout: Option<Duration>,
    tool_timeout: Option<Duration>,
    max_iterations: Option<usize>,
    default_max_results: Option<usize>,
    default_confidence_threshold: Option<f64>,
    fallback: Option<FallbackPolicy>,
    email_service_url: Option<String>,
}

impl ConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.provider.is_none() {
            self.provider = std::env::var("TRANSITO_PROVIDER").ok();
        }
        if self.api_key.is_none() {
            self.api_key = std::env::var("ANTHROPIC_API_KEY")
                .or_else(|_| std::env::var("OPENROUTER_API_KEY"))
                .or_else(|_| std::env::var("TRANSITO_API_KEY"))
                .ok();
        }
        if self.base_url.is_none() {
            self.base_url = std::env::var("TRANSITO_BASE_URL").ok();
        }
        if self.model.is_none() {
            self.model = std::env::var("TRANSITO_MODEL").ok();
        }
        if self.max_iterations.is_none() {
            self.max_iterations = std::env::var("TRANSITO_MAX_ITERATIONS")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        if self.fallback.is_none() {
            self.fallback = std::env::var("TRANSITO_FALLBACK")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        if self.email_service_url.is_none() {
            self.email_service_url = std::env::var("EMAIL_SERVICE_URL").ok();
        }
        self
    }

    /// Sets the provider name.
    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the base URL override.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the model identifier.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the maximum tokens per model turn.
    #[must_use]
    pub const fn max_tokens(mut self, n: u32) -> Self {
        self.max_tokens = Some(n);
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub const fn temperature(mut self, t: f32) -> Self {
        self.temperature = Some(t);
        self
    }

    /// Sets the reasoning-model request timeout.
    #[must_use]
    pub const fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Sets the per-tool execution timeout.
    #[must_use]
    pub const fn tool_timeout(mut self, duration: Duration) -> Self {
        self.tool_timeout = Some(duration);
        self
    }

    /// Sets the maximum tool-loop iterations.
    #[must_use]
    pub const fn max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = Some(n);
        self
    }

    /// Sets the default result count for plain search.
    #[must_use]
    pub const fn default_max_results(mut self, n: usize) -> Self {
        self.default_max_results = Some(n);
        self
    }

    /// Sets the default confidence threshold for plain search.
    #[must_use]
    pub const fn default_confidence_threshold(mut self, t: f64) -> Self {
        self.default_confidence_threshold = Some(t);
        self
    }

    /// Sets the search fallback policy.
    #[must_use]
    pub const fn fallback(mut self, policy: FallbackPolicy) -> Self {
        self.fallback = Some(policy);
        self
    }

    /// Sets the email dispatch service URL.
    #[must_use]
    pub fn email_service_url(mut self, url: impl Into<String>) -> Self {
        self.email_service_url = Some(url.into());
        self
    }

    /// Builds the [`Config`].
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiKeyMissing`] if no API key was set.
    pub fn build(self) -> Result<Config, AgentError> {
        let api_key = self.api_key.ok_or(AgentError::ApiKeyMissing)?;

        Ok(Config {
            provider: self.provider.unwrap_or_else(|| "anthropic".to_string()),
            api_key,
            base_url: self.base_url,
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: self.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            request_timeout: self
                .request_timeout
                .unwrap_or(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)),
            tool_timeout: self
                .tool_timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TOOL_TIMEOUT_SECS)),
            max_iterations: self.max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS),
            default_max_results: self.default_max_results.unwrap_or(DEFAULT_MAX_RESULTS),
            default_confidence_threshold: self
                .default_confidence_threshold
                .unwrap_or(DEFAULT_CONFIDENCE_THRESHOLD),
            fallback: self.fallback.unwrap_or_default(),
            email_service_url: self
                .email_service_url
                .unwrap_or_else(|| DEFAULT_EMAIL_SERVICE_URL.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = Config::builder()
            .api_key("test-key")
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.provider, "anthropic");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(config.max_iterations, DEFAULT_MAX_ITERATIONS);
        assert_eq!(config.fallback, FallbackPolicy::FloorThenBest);
    }

    #[test]
    fn test_builder_missing_api_key() {
        let result = Config::builder().build();
        assert!(matches!(result, Err(AgentError::ApiKeyMissing)));
    }

    #[test]
    fn test_builder_custom_values() {
        let config = Config::builder()
            .api_key("key")
            .provider("openrouter")
            .model("openai/gpt-oss-20b:free")
            .max_tokens(500)
            .temperature(0.1)
            .max_iterations(3)
            .fallback(FallbackPolicy::Disabled)
            .request_timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.provider, "openrouter");
        assert_eq!(config.model, "openai/gpt-oss-20b:free");
        assert_eq!(config.max_tokens, 500);
        assert_eq!(config.max_iterations, 3);
        assert_eq!(config.fallback, FallbackPolicy::Disabled);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_loop_options_derivation() {
        let config = Config::builder()
            .api_key("key")
            .max_tokens(1234)
            .max_iterations(2)
            .build()
            .unwrap_or_else(|_| unreachable!());
        let options = config.loop_options();
        assert_eq!(options.max_tokens, 1234);
        assert_eq!(options.max_iterations, 2);
    }
}
