//! Bounded tool-use loop.
//!
//! Alternates between the reasoning model and the tool registry: every tool
//! request in a model turn is executed and all results are appended as one
//! combined message before the next model call, so the model never sees a
//! partial batch. The loop terminates on a plain answer, a token limit, an
//! unrecognized stop signal, or iteration exhaustion.

use tracing::{debug, warn};

use crate::error::AgentError;
use crate::tools::{ToolDefinition, ToolRegistry};

use super::message::{ContentBlock, Message, first_text, tool_uses};
use super::provider::{CompletionRequest, ReasoningModel, StopReason};

/// Recommended iteration bound.
pub const DEFAULT_MAX_ITERATIONS: usize = 5;

/// Returned when generation hit the token limit with no partial text.
pub const TRUNCATED_REPLY: &str =
    "Lo siento, la respuesta fue muy larga. Por favor, intenta con una pregunta más específica.";

/// Returned on an unrecognized stop signal.
pub const UNRECOGNIZED_REPLY: &str =
    "Lo siento, no pude procesar tu consulta completamente. Por favor, intenta reformularla.";

/// Returned when the iteration budget runs out.
pub const EXHAUSTED_REPLY: &str =
    "Lo siento, no pude completar tu consulta. Por favor, intenta reformularla.";

/// Generation parameters for one loop session.
#[derive(Debug, Clone, Copy)]
pub struct LoopOptions {
    /// Maximum tokens per model turn.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum model calls before the session is declared exhausted.
    pub max_iterations: usize,
}

impl Default for LoopOptions {
    fn default() -> Self {
        Self {
            max_tokens: 2000,
            temperature: 0.0,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Per-session working memory: the ordered message history plus the
/// iteration budget. Exclusively owned by its session and discarded when
/// the loop terminates; nothing persists across sessions.
#[derive(Debug)]
pub struct Conversation {
    messages: Vec<Message>,
    iterations: usize,
    max_iterations: usize,
}

impl Conversation {
    /// Starts a conversation with the given iteration budget.
    #[must_use]
    pub const fn new(max_iterations: usize) -> Self {
        Self {
            messages: Vec::new(),
            iterations: 0,
            max_iterations,
        }
    }

    /// Appends a message.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// The ordered message history.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Completed tool rounds so far.
    #[must_use]
    pub const fn iterations(&self) -> usize {
        self.iterations
    }

    /// Records a completed tool round. Returns `false` once the budget is
    /// used up, i.e. no further model call is allowed.
    pub const fn record_iteration(&mut self) -> bool {
        self.iterations += 1;
        self.iterations < self.max_iterations
    }
}

/// Runs the bounded tool-use loop and returns the final answer text.
///
/// Tool execution failures are fed back to the model as data; only
/// reasoning-model transport failures propagate as errors. The model is
/// called at most `options.max_iterations` times.
///
/// # Errors
///
/// Returns [`AgentError`] when a model call fails or times out.
pub async fn run_tool_loop(
    provider: &dyn ReasoningModel,
    registry: &ToolRegistry,
    system: &str,
    user: &str,
    tools: Vec<ToolDefinition>,
    options: LoopOptions,
) -> Result<String, AgentError> {
    let mut conversation = Conversation::new(options.max_iterations);
    conversation.push(Message::user_text(user));

    if options.max_iterations == 0 {
        return Ok(EXHAUSTED_REPLY.to_string());
    }

    loop {
        debug!(
            iteration = conversation.iterations(),
            max = options.max_iterations,
            "calling reasoning model"
        );

        let completion = provider
            .complete(&CompletionRequest {
                system: system.to_string(),
                messages: conversation.messages().to_vec(),
                tools: tools.clone(),
                max_tokens: options.max_tokens,
                temperature: options.temperature,
            })
            .await?;

        match completion.stop_reason {
            StopReason::EndTurn => {
                debug!(
                    iteration = conversation.iterations(),
                    "model produced final answer"
                );
                return Ok(first_text(&completion.content).unwrap_or_default().to_string());
            }
            StopReason::ToolUse => {
                let requests: Vec<_> = tool_uses(&completion.content)
                    .into_iter()
                    .cloned()
                    .collect();
                debug!(tool_count = requests.len(), "model requested tools");

                conversation.push(Message::assistant(completion.content));

                let mut results = Vec::with_capacity(requests.len());
                for request in &requests {
                    let outcome = registry.execute(&request.name, request.input.clone()).await;
                    debug!(
                        tool = %request.name,
                        id = %request.id,
                        success = outcome.success,
                        "tool execution complete"
                    );
                    results.push(ContentBlock::ToolResult {
                        tool_use_id: request.id.clone(),
                        content: outcome.to_json(),
                    });
                }
                conversation.push(Message::tool_results(results));

                if !conversation.record_iteration() {
                    warn!(
                        max_iterations = options.max_iterations,
                        "iteration budget exhausted"
                    );
                    return Ok(EXHAUSTED_REPLY.to_string());
                }
            }
            StopReason::MaxTokens => {
                warn!("generation hit the token limit");
                return Ok(first_text(&completion.content)
                    .filter(|text| !text.is_empty())
                    .map_or_else(|| TRUNCATED_REPLY.to_string(), str::to_string));
            }
            StopReason::Other => {
                warn!("unrecognized stop signal");
                return Ok(UNRECOGNIZED_REPLY.to_string());
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::{Value, json};

    use super::*;
    use crate::agent::message::Role;
    use crate::agent::provider::Completion;
    use crate::tools::{Tool, ToolOutcome, ToolUse};

    /// Provider that replays a scripted sequence of completions.
    struct ScriptedProvider {
        script: Vec<Completion>,
        calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn new(script: Vec<Completion>) -> Self {
            Self {
                script,
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReasoningModel for ScriptedProvider {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn model_id(&self) -> &str {
            "test-model"
        }

        async fn complete(&self, _request: &CompletionRequest) -> Result<Completion, AgentError> {
            let i = self.calls.fetch_add(1, Ordering::SeqCst);
            self.script
                .get(i)
                .cloned()
                .ok_or_else(|| AgentError::ApiRequest {
                    message: "script exhausted".to_string(),
                    status: None,
                })
        }
    }

    /// Tool that counts executions and echoes its input.
    struct CountingTool {
        executions: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Tool for CountingTool {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition {
                name: "buscar_articulos_transito".to_string(),
                description: "Busca artículos".to_string(),
                input_schema: json!({"type": "object", "properties": {}}),
            }
        }

        async fn execute(&self, input: Value) -> ToolOutcome {
            self.executions.fetch_add(1, Ordering::SeqCst);
            ToolOutcome::ok(input)
        }
    }

    fn counting_registry() -> (ToolRegistry, Arc<AtomicUsize>) {
        let executions = Arc::new(AtomicUsize::new(0));
        let registry = ToolRegistry::new()
            .with_tool_timeout(Duration::from_secs(5))
            .register(Arc::new(CountingTool {
                executions: Arc::clone(&executions),
            }));
        (registry, executions)
    }

    fn text_completion(stop_reason: StopReason, text: &str) -> Completion {
        Completion {
            stop_reason,
            content: vec![ContentBlock::Text {
                text: text.to_string(),
            }],
        }
    }

    fn tool_completion(ids: &[&str]) -> Completion {
        Completion {
            stop_reason: StopReason::ToolUse,
            content: ids
                .iter()
                .map(|id| {
                    ContentBlock::ToolUse(ToolUse {
                        id: (*id).to_string(),
                        name: "buscar_articulos_transito".to_string(),
                        input: json!({"consulta": "multa"}),
                    })
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_plain_answer_returns_immediately() {
        let provider = ScriptedProvider::new(vec![text_completion(
            StopReason::EndTurn,
            "La multa es de quince salarios.",
        )]);
        let (registry, executions) = counting_registry();

        let answer = run_tool_loop(
            &provider,
            &registry,
            "sistema",
            "pregunta",
            Vec::new(),
            LoopOptions::default(),
        )
        .await
        .unwrap_or_else(|e| panic!("loop failed: {e}"));

        assert_eq!(answer, "La multa es de quince salarios.");
        assert_eq!(provider.call_count(), 1);
        assert_eq!(executions.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_tool_round_then_answer() {
        let provider = ScriptedProvider::new(vec![
            tool_completion(&["toolu_01"]),
            text_completion(StopReason::EndTurn, "Respuesta con cita."),
        ]);
        let (registry, executions) = counting_registry();

        let answer = run_tool_loop(
            &provider,
            &registry,
            "sistema",
            "pregunta",
            Vec::new(),
            LoopOptions::default(),
        )
        .await
        .unwrap_or_else(|e| panic!("loop failed: {e}"));

        assert_eq!(answer, "Respuesta con cita.");
        assert_eq!(provider.call_count(), 2);
        assert_eq!(executions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_single_iteration_executes_tool_once_then_exhausts() {
        // With max_iterations = 1, a tool-use turn must execute the tool
        // exactly once and terminate without a second model call.
        let provider = ScriptedProvider::new(vec![
            tool_completion(&["toolu_01"]),
            text_completion(StopReason::EndTurn, "never reached"),
        ]);
        let (registry, executions) = counting_registry();

        let answer = run_tool_loop(
            &provider,
            &registry,
            "sistema",
            "pregunta",
            Vec::new(),
            LoopOptions {
                max_iterations: 1,
                ..LoopOptions::default()
            },
        )
        .await
        .unwrap_or_else(|e| panic!("loop failed: {e}"));

        assert_eq!(answer, EXHAUSTED_REPLY);
        assert_eq!(provider.call_count(), 1);
        assert_eq!(executions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_model_calls_never_exceed_max_iterations() {
        let provider = ScriptedProvider::new(vec![
            tool_completion(&["a"]),
            tool_completion(&["b"]),
            tool_completion(&["c"]),
            tool_completion(&["d"]),
        ]);
        let (registry, _) = counting_registry();

        let answer = run_tool_loop(
            &provider,
            &registry,
            "sistema",
            "pregunta",
            Vec::new(),
            LoopOptions {
                max_iterations: 3,
                ..LoopOptions::default()
            },
        )
        .await
        .unwrap_or_else(|e| panic!("loop failed: {e}"));

        assert_eq!(answer, EXHAUSTED_REPLY);
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_two_tool_requests_in_one_turn_batched_in_order() {
        let provider = ScriptedProvider::new(vec![
            tool_completion(&["toolu_01", "toolu_02"]),
            text_completion(StopReason::EndTurn, "listo"),
        ]);
        let (registry, executions) = counting_registry();

        // Capture the conversation the second call sees via a wrapper.
        struct Recording<'a> {
            inner: &'a ScriptedProvider,
            seen: std::sync::Mutex<Vec<Vec<Message>>>,
        }

        #[async_trait]
        impl ReasoningModel for Recording<'_> {
            fn name(&self) -> &'static str {
                "recording"
            }

            fn model_id(&self) -> &str {
                "test-model"
            }

            async fn complete(
                &self,
                request: &CompletionRequest,
            ) -> Result<Completion, AgentError> {
                if let Ok(mut seen) = self.seen.lock() {
                    seen.push(request.messages.clone());
                }
                self.inner.complete(request).await
            }
        }

        let recording = Recording {
            inner: &provider,
            seen: std::sync::Mutex::new(Vec::new()),
        };

        let answer = run_tool_loop(
            &recording,
            &registry,
            "sistema",
            "pregunta",
            Vec::new(),
            LoopOptions::default(),
        )
        .await
        .unwrap_or_else(|e| panic!("loop failed: {e}"));

        assert_eq!(answer, "listo");
        assert_eq!(executions.load(Ordering::SeqCst), 2);

        let seen = recording.seen.into_inner().unwrap_or_default();
        // Second model call: user question, assistant tool requests, one
        // combined tool-results message.
        let second = &seen[1];
        assert_eq!(second.len(), 3);
        let results = &second[2];
        assert_eq!(results.role, Role::User);
        let ids: Vec<&str> = results
            .content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::ToolResult { tool_use_id, .. } => Some(tool_use_id.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(ids, vec!["toolu_01", "toolu_02"]);
    }

    #[tokio::test]
    async fn test_unknown_tool_failure_is_fed_back_not_raised() {
        let provider = ScriptedProvider::new(vec![
            Completion {
                stop_reason: StopReason::ToolUse,
                content: vec![ContentBlock::ToolUse(ToolUse {
                    id: "toolu_01".to_string(),
                    name: "tool_inexistente".to_string(),
                    input: json!({}),
                })],
            },
            text_completion(StopReason::EndTurn, "me disculpo"),
        ]);
        let (registry, _) = counting_registry();

        let answer = run_tool_loop(
            &provider,
            &registry,
            "sistema",
            "pregunta",
            Vec::new(),
            LoopOptions::default(),
        )
        .await
        .unwrap_or_else(|e| panic!("loop failed: {e}"));

        assert_eq!(answer, "me disculpo");
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_max_tokens_with_partial_text_returns_it() {
        let provider = ScriptedProvider::new(vec![text_completion(
            StopReason::MaxTokens,
            "Respuesta parcial",
        )]);
        let (registry, _) = counting_registry();

        let answer = run_tool_loop(
            &provider,
            &registry,
            "sistema",
            "pregunta",
            Vec::new(),
            LoopOptions::default(),
        )
        .await
        .unwrap_or_else(|e| panic!("loop failed: {e}"));

        assert_eq!(answer, "Respuesta parcial");
    }

    #[tokio::test]
    async fn test_max_tokens_without_text_returns_apology() {
        let provider = ScriptedProvider::new(vec![Completion {
            stop_reason: StopReason::MaxTokens,
            content: Vec::new(),
        }]);
        let (registry, _) = counting_registry();

        let answer = run_tool_loop(
            &provider,
            &registry,
            "sistema",
            "pregunta",
            Vec::new(),
            LoopOptions::default(),
        )
        .await
        .unwrap_or_else(|e| panic!("loop failed: {e}"));

        assert_eq!(answer, TRUNCATED_REPLY);
    }

    #[tokio::test]
    async fn test_unrecognized_stop_signal_terminates() {
        let provider = ScriptedProvider::new(vec![Completion {
            stop_reason: StopReason::Other,
            content: Vec::new(),
        }]);
        let (registry, _) = counting_registry();

        let answer = run_tool_loop(
            &provider,
            &registry,
            "sistema",
            "pregunta",
            Vec::new(),
            LoopOptions::default(),
        )
        .await
        .unwrap_or_else(|e| panic!("loop failed: {e}"));

        assert_eq!(answer, UNRECOGNIZED_REPLY);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_provider_failure_propagates() {
        let provider = ScriptedProvider::new(Vec::new());
        let (registry, _) = counting_registry();

        let result = run_tool_loop(
            &provider,
            &registry,
            "sistema",
            "pregunta",
            Vec::new(),
            LoopOptions::default(),
        )
        .await;

        assert!(matches!(result, Err(AgentError::ApiRequest { .. })));
    }

    #[tokio::test]
    async fn test_zero_iterations_never_calls_model() {
        let provider = ScriptedProvider::new(vec![text_completion(StopReason::EndTurn, "x")]);
        let (registry, _) = counting_registry();

        let answer = run_tool_loop(
            &provider,
            &registry,
            "sistema",
            "pregunta",
            Vec::new(),
            LoopOptions {
                max_iterations: 0,
                ..LoopOptions::default()
            },
        )
        .await
        .unwrap_or_else(|e| panic!("loop failed: {e}"));

        assert_eq!(answer, EXHAUSTED_REPLY);
        assert_eq!(provider.call_count(), 0);
    }
}
