//! Provider-agnostic conversation messages.
//!
//! Messages carry typed content blocks rather than flat strings so that a
//! single assistant turn can hold text and tool requests side by side, and
//! a single user turn can carry a whole batch of tool results. System
//! framing travels outside the message list, as a separate request field.

use serde::{Deserialize, Serialize};

use crate::tools::ToolUse;

/// Role of a conversation participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User input, including tool-result batches.
    User,
    /// Assistant response, including tool requests.
    Assistant,
}

/// One typed block within a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text.
    Text {
        /// The text content.
        text: String,
    },
    /// A tool invocation requested by the model.
    ToolUse(ToolUse),
    /// The result of one tool invocation, correlated by id.
    ToolResult {
        /// Id of the [`ToolUse`] this result answers.
        tool_use_id: String,
        /// Serialized tool outcome.
        content: String,
    },
}

/// A single conversation message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Who produced the message.
    pub role: Role,
    /// Ordered content blocks.
    pub content: Vec<ContentBlock>,
}

impl Message {
    /// A user message with one text block.
    #[must_use]
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::Text { text: text.into() }],
        }
    }

    /// An assistant message carrying the model's raw content blocks.
    #[must_use]
    pub const fn assistant(content: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content,
        }
    }

    /// A user message carrying a batch of tool results.
    #[must_use]
    pub const fn tool_results(results: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::User,
            content: results,
        }
    }
}

/// First text block in a block list, if any.
#[must_use]
pub fn first_text(blocks: &[ContentBlock]) -> Option<&str> {
    blocks.iter().find_map(|block| match block {
        ContentBlock::Text { text } => Some(text.as_str()),
        _ => None,
    })
}

/// All tool requests in a block list, in emission order.
#[must_use]
pub fn tool_uses(blocks: &[ContentBlock]) -> Vec<&ToolUse> {
    blocks
        .iter()
        .filter_map(|block| match block {
            ContentBlock::ToolUse(tool_use) => Some(tool_use),
            _ => None,
        })
        .collect()
}
