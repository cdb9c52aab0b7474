//! Tool-use agent loop and the reasoning-model abstraction behind it.
//!
//! The loop drives a bounded conversation with an external reasoning model:
//! on each turn the model either answers, requests tools, or signals a
//! limit. Requested tools are executed through the
//! [`ToolRegistry`](crate::tools::ToolRegistry) and their results fed back
//! as data until a terminal state is reached.
//!
//! # Architecture
//!
//! ```text
//! AnswerRequest → AssistantService
//!   ├── use_tools = false → single ReasoningModel call
//!   └── use_tools = true  → run_tool_loop
//!         ├── ReasoningModel::complete (bounded iterations)
//!         └── ToolRegistry::execute per requested tool
//! ```

pub mod message;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod service;
pub mod tool_loop;

pub use message::{ContentBlock, Message, Role};
pub use provider::{Completion, CompletionRequest, ReasoningModel, StopReason};
pub use providers::{AnthropicProvider, OpenRouterProvider, create_provider};
pub use service::{AnswerRequest, AnswerResponse, AssistantService, Availability};
pub use tool_loop::{Conversation, LoopOptions, run_tool_loop};
