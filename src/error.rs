//! Error types for the retrieval engine and the agent subsystem.
//!
//! Two taxonomies coexist: [`SearchError`] for the retrieval paths and
//! [`AgentError`] for everything that touches the reasoning model. Tool
//! execution failures are deliberately absent from both public surfaces:
//! they are absorbed into [`ToolOutcome`](crate::tools::ToolOutcome) values
//! so the reasoning model can react to them inside the conversation.

use thiserror::Error;

/// Errors raised by the search paths.
///
/// A corpus-scan failure is recoverable (the engine degrades to vector-only
/// results); a vector-index failure is fatal to the search call.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The nearest-neighbor lookup against the external index failed.
    #[error("vector index lookup failed: {message}")]
    VectorIndex {
        /// Description of the underlying failure.
        message: String,
    },

    /// The full-corpus scan backing the lexical pass failed.
    #[error("corpus scan failed: {message}")]
    CorpusScan {
        /// Description of the underlying failure.
        message: String,
    },

    /// The article index is not connected or not yet initialized.
    #[error("article index is not available")]
    IndexUnavailable,
}

/// Errors raised by the agent subsystem.
#[derive(Debug, Error)]
pub enum AgentError {
    /// A required collaborator is not configured or reachable.
    #[error("service '{service}' is not available")]
    Unavailable {
        /// Name of the missing collaborator.
        service: String,
    },

    /// A request field failed validation before any external call was made.
    #[error("field '{field}' must not be empty")]
    InvalidInput {
        /// Name of the offending field.
        field: &'static str,
    },

    /// The reasoning-model provider returned a transport or API error.
    #[error("reasoning model request failed: {message}")]
    ApiRequest {
        /// Provider-reported error description.
        message: String,
        /// HTTP status code, when one was received.
        status: Option<u16>,
    },

    /// The reasoning-model call exceeded its configured timeout.
    #[error("reasoning model call timed out after {seconds}s")]
    ModelTimeout {
        /// Configured timeout that was exceeded.
        seconds: u64,
    },

    /// A tool implementation failed internally.
    ///
    /// Never crosses the registry boundary: the registry converts it into a
    /// failed [`ToolOutcome`](crate::tools::ToolOutcome) before returning.
    #[error("tool '{name}' failed: {message}")]
    ToolExecution {
        /// Name of the failing tool.
        name: String,
        /// Description of the failure.
        message: String,
    },

    /// The configured provider name is not recognized.
    #[error("unsupported reasoning-model provider '{name}'")]
    UnsupportedProvider {
        /// The unrecognized provider name.
        name: String,
    },

    /// No API key was configured for the reasoning-model provider.
    #[error("no API key configured for the reasoning-model provider")]
    ApiKeyMissing,

    /// A search-path failure surfaced through the plain-search entry point.
    #[error(transparent)]
    Search(#[from] SearchError),
}
