//! Capabilities the reasoning model may invoke mid-conversation.
//!
//! Each capability implements the [`Tool`] trait and is registered by name
//! in a [`ToolRegistry`] built once at process start. Execution never raises:
//! every failure mode (unknown tool, invalid input, downstream error,
//! timeout) is returned as a [`ToolOutcome`] so the agent loop can feed it
//! back into the conversation for the model to react to.

pub mod article_search;
pub mod email;
pub mod registry;
pub mod types;

pub use article_search::ArticleSearchTool;
pub use email::EmailTool;
pub use registry::{Tool, ToolRegistry};
pub use types::{ToolDefinition, ToolOutcome, ToolUse};
