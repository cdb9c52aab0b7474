//! Tool trait and name-based registry.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::types::{ToolDefinition, ToolOutcome};

/// Default per-execution timeout applied by the registry.
const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 30;

/// An invocable capability exposed to the reasoning model.
///
/// Implementations absorb their own failures: `execute` returns a
/// [`ToolOutcome`] in every case, so a misbehaving downstream service can
/// never abort the surrounding session.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Static definition advertised to the reasoning model.
    fn definition(&self) -> ToolDefinition;

    /// Runs the tool with the model-supplied input object.
    async fn execute(&self, input: Value) -> ToolOutcome;
}

struct RegistryEntry {
    name: String,
    tool: Arc<dyn Tool>,
}

/// Name → implementation mapping built at startup.
///
/// Definitions are immutable after construction and safely shared across
/// concurrent sessions.
pub struct ToolRegistry {
    entries: Vec<RegistryEntry>,
    tool_timeout: Duration,
}

impl ToolRegistry {
    /// Creates an empty registry with the default execution timeout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            tool_timeout: Duration::from_secs(DEFAULT_TOOL_TIMEOUT_SECS),
        }
    }

    /// Sets the per-execution timeout.
    #[must_use]
    pub const fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = timeout;
        self
    }

    /// Registers a tool under its advertised name, replacing any previous
    /// registration with the same name.
    #[must_use]
    pub fn register(mut self, tool: Arc<dyn Tool>) -> Self {
        let name = tool.definition().name;
        if let Some(existing) = self.entries.iter_mut().find(|e| e.name == name) {
            warn!(tool = %name, "replacing existing tool registration");
            existing.tool = tool;
        } else {
            info!(tool = %name, "tool registered");
            self.entries.push(RegistryEntry { name, tool });
        }
        self
    }

    /// Names of all registered tools, in registration order.
    #[must_use]
    pub fn tool_names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.clone()).collect()
    }

    /// Returns `true` if a tool is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Tool definitions, optionally restricted to `names`.
    ///
    /// With `None`, returns every definition in registration order. With a
    /// list, returns the intersection in the requested order; unknown names
    /// are logged and skipped, so the result may be shorter than the input.
    #[must_use]
    pub fn definitions(&self, names: Option<&[String]>) -> Vec<ToolDefinition> {
        match names {
            None => self.entries.iter().map(|e| e.tool.definition()).collect(),
            Some(requested) => requested
                .iter()
                .filter_map(|name| {
                    let found = self.entries.iter().find(|e| &e.name == name);
                    if found.is_none() {
                        warn!(tool = %name, "requested tool is not registered");
                    }
                    found.map(|e| e.tool.definition())
                })
                .collect(),
        }
    }

    /// Executes a tool by name.
    ///
    /// Never returns an error: unknown names, executor failures, and
    /// timeouts all come back as failed [`ToolOutcome`]s for the agent loop
    /// to relay to the model.
    pub async fn execute(&self, name: &str, input: Value) -> ToolOutcome {
        let Some(entry) = self.entries.iter().find(|e| e.name == name) else {
            warn!(tool = %name, "unknown tool requested");
            return ToolOutcome::failure(format!(
                "Tool '{name}' does not exist. Available tools: {:?}",
                self.tool_names()
            ));
        };

        debug!(tool = %name, "executing tool");
        match tokio::time::timeout(self.tool_timeout, entry.tool.execute(input)).await {
            Ok(outcome) => {
                debug!(tool = %name, success = outcome.success, "tool execution complete");
                outcome
            }
            Err(_) => {
                warn!(tool = %name, timeout_secs = self.tool_timeout.as_secs(), "tool timed out");
                ToolOutcome::failure(format!(
                    "Tool '{name}' timed out after {}s",
                    self.tool_timeout.as_secs()
                ))
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tool_names())
            .field("tool_timeout", &self.tool_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    /// Tool stub that echoes its input, optionally after a delay.
    struct EchoTool {
        name: &'static str,
        delay: Duration,
    }

    #[async_trait]
    impl Tool for EchoTool {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition {
                name: self.name.to_string(),
                description: "Echoes its input.".to_string(),
                input_schema: json!({"type": "object", "properties": {}}),
            }
        }

        async fn execute(&self, input: Value) -> ToolOutcome {
            tokio::time::sleep(self.delay).await;
            ToolOutcome::ok(input)
        }
    }

    fn echo(name: &'static str) -> Arc<dyn Tool> {
        Arc::new(EchoTool {
            name,
            delay: Duration::ZERO,
        })
    }

    #[test]
    fn test_definitions_all_in_registration_order() {
        let registry = ToolRegistry::new()
            .register(echo("buscar_articulos_transito"))
            .register(echo("enviar_email"));
        let defs = registry.definitions(None);
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].name, "buscar_articulos_transito");
        assert_eq!(defs[1].name, "enviar_email");
    }

    #[test]
    fn test_definitions_skips_unknown_names() {
        let registry = ToolRegistry::new().register(echo("enviar_email"));
        let requested = vec!["unknown_tool".to_string()];
        let defs = registry.definitions(Some(&requested));
        assert!(defs.is_empty());
    }

    #[test]
    fn test_definitions_intersection_in_requested_order() {
        let registry = ToolRegistry::new()
            .register(echo("buscar_articulos_transito"))
            .register(echo("enviar_email"));
        let requested = vec![
            "enviar_email".to_string(),
            "nope".to_string(),
            "buscar_articulos_transito".to_string(),
        ];
        let defs = registry.definitions(Some(&requested));
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].name, "enviar_email");
        assert_eq!(defs[1].name, "buscar_articulos_transito");
    }

    #[test]
    fn test_register_replaces_same_name() {
        let registry = ToolRegistry::new()
            .register(echo("enviar_email"))
            .register(echo("enviar_email"));
        assert_eq!(registry.tool_names().len(), 1);
    }

    #[tokio::test]
    async fn test_execute_unknown_tool_returns_failure() {
        let registry = ToolRegistry::new().register(echo("enviar_email"));
        let outcome = registry.execute("nonexistent", json!({})).await;
        assert!(!outcome.success);
        let error = outcome.error.unwrap_or_default();
        assert!(error.contains("nonexistent"));
        assert!(error.contains("enviar_email"));
    }

    #[tokio::test]
    async fn test_execute_passes_input_through() {
        let registry = ToolRegistry::new().register(echo("echo"));
        let outcome = registry.execute("echo", json!({"consulta": "multa"})).await;
        assert!(outcome.success);
        assert_eq!(outcome.payload["consulta"], "multa");
    }

    #[tokio::test]
    async fn test_execute_timeout_becomes_failure() {
        let registry = ToolRegistry::new()
            .with_tool_timeout(Duration::from_millis(20))
            .register(Arc::new(EchoTool {
                name: "slow",
                delay: Duration::from_millis(200),
            }));
        let outcome = registry.execute("slow", json!({})).await;
        assert!(!outcome.success);
        assert!(outcome.error.unwrap_or_default().contains("timed out"));
    }
}
