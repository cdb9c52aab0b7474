//! Hybrid retrieval engine and tool-use agent loop for question answering
//! over the Colombian national transit code.
//!
//! Two subsystems form the core:
//!
//! - [`search`] — fuses nearest-neighbor and synonym-expanded lexical
//!   retrieval into a ranked, deduplicated, threshold-filtered result set
//!   with a configurable degradation cascade.
//! - [`agent`] — a bounded tool-use loop that alternates between an
//!   external reasoning model and the [`tools`] registry until the model
//!   produces a final answer.
//!
//! The HTTP transport, document ingestion, embedding model, and vector
//! index live outside this crate; the index is consumed through the
//! [`corpus::ArticleIndex`] trait and the model through
//! [`agent::ReasoningModel`].
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use transito_rs::agent::{AssistantService, create_provider};
//! use transito_rs::config::Config;
//! use transito_rs::search::HybridSearchEngine;
//! use transito_rs::tools::{ArticleSearchTool, EmailTool, ToolRegistry};
//!
//! let config = Config::from_env()?;
//! let provider = create_provider(&config)?;
//! let engine = Arc::new(HybridSearchEngine::new(index).with_fallback(config.fallback));
//! let registry = Arc::new(
//!     ToolRegistry::new()
//!         .with_tool_timeout(config.tool_timeout)
//!         .register(Arc::new(ArticleSearchTool::new(Arc::clone(&engine))))
//!         .register(Arc::new(EmailTool::new(&config.email_service_url))),
//! );
//! let service = AssistantService::new(provider, registry, engine, config.loop_options());
//! ```

pub mod agent;
pub mod config;
pub mod corpus;
pub mod error;
pub mod search;
pub mod tools;

pub use agent::{AnswerRequest, AnswerResponse, AssistantService, ReasoningModel};
pub use config::Config;
pub use corpus::{Article, ArticleIndex, ArticleMetadata};
pub use error::{AgentError, SearchError};
pub use search::{FallbackPolicy, HybridSearchEngine, SearchResponse, SearchResult};
pub use tools::{Tool, ToolDefinition, ToolOutcome, ToolRegistry};
