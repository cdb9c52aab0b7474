//! Tool type definitions shared by the registry and the agent loop.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool definition sent to the reasoning model for function-calling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name (must match a registry entry).
    pub name: String,
    /// Natural-language description the model uses to decide when to invoke.
    pub description: String,
    /// JSON Schema object describing the tool's parameters.
    pub input_schema: Value,
}

/// A tool invocation requested by the reasoning model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolUse {
    /// Correlation identifier assigned by the provider; the matching result
    /// carries it back into the conversation.
    pub id: String,
    /// Name of the tool to invoke.
    pub name: String,
    /// Input parameter values as a JSON object.
    pub input: Value,
}

/// The outcome of executing a tool.
///
/// Always a value, never an error: the registry converts every failure mode
/// into `success: false` with a description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutcome {
    /// Whether the execution succeeded.
    pub success: bool,
    /// Tool-specific result payload; `null` on failure.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub payload: Value,
    /// Failure description, present when `success` is `false`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolOutcome {
    /// A successful outcome carrying `payload`.
    #[must_use]
    pub const fn ok(payload: Value) -> Self {
        Self {
            success: true,
            payload,
            error: None,
        }
    }

    /// A failed outcome carrying an error description.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            payload: Value::Null,
            error: Some(message.into()),
        }
    }

    /// Serializes the outcome for embedding in a tool-result message.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"success":false,"error":"outcome serialization failed"}"#.to_string()
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_outcome_ok_serialization() {
        let outcome = ToolOutcome::ok(json!({"total_encontrados": 2}));
        let json = outcome.to_json();
        assert!(json.contains("\"success\":true"));
        assert!(json.contains("total_encontrados"));
        assert!(!json.contains("error"));
    }

    #[test]
    fn test_outcome_failure_serialization() {
        let outcome = ToolOutcome::failure("tool 'x' does not exist");
        let json = outcome.to_json();
        assert!(json.contains("\"success\":false"));
        assert!(json.contains("does not exist"));
        assert!(!json.contains("payload"));
    }

    #[test]
    fn test_tool_use_deserialization() {
        let raw = r#"{"id":"toolu_01","name":"buscar_articulos_transito","input":{"consulta":"multa"}}"#;
        let tool_use: ToolUse = serde_json::from_str(raw).unwrap_or_else(|e| {
            unreachable!("deserialization failed: {e}");
        });
        assert_eq!(tool_use.name, "buscar_articulos_transito");
        assert_eq!(tool_use.input["consulta"], "multa");
    }

    #[test]
    fn test_definition_serializes_input_schema_field() {
        let def = ToolDefinition {
            name: "enviar_email".to_string(),
            description: "Envía un correo".to_string(),
            input_schema: json!({"type": "object", "properties": {}}),
        };
        let json = serde_json::to_string(&def).unwrap_or_default();
        assert!(json.contains("\"input_schema\""));
    }
}
