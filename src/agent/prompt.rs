//! Prompt composition from structured caller context.

use serde_json::Value;

/// Combines system and user framing into the model's system message.
#[must_use]
pub fn compose_system(system_framing: &str, user_framing: &str) -> String {
    format!("{system_framing}\n\nContexto del usuario: {user_framing}")
}

/// Builds the user message from the question plus detected entities and the
/// classified intent. Entities are omitted when empty.
#[must_use]
pub fn compose_user(question: &str, entities: &[Value], intent: &str) -> String {
    let mut message = format!("Pregunta: {question}\n");
    if !entities.is_empty() {
        let serialized = serde_json::to_string(entities).unwrap_or_default();
        message.push_str(&format!("Entidades detectadas: {serialized}\n"));
    }
    message.push_str(&format!("Intención: {intent}"));
    message
}
