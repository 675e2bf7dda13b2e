//! Turn-by-turn conversational driver.

use std::sync::Arc;

use super::config::AgentConfig;
use super::observation::format_observations;
use super::traits::{CompletionBackend, ConversationStore};
use super::types::{Message, ToolCall, Turn, TurnOutcome};
use crate::error::AgentError;
use crate::tool::{ParamKind, ParameterSchema, ParameterSpec, ToolArgs, ToolSet, ToolSpec};

/// Reserved tool the model calls to finish, with its answer in `result`.
pub const TERMINATION_TOOL: &str = "call-termination";

const CONTINUATION_PROMPT: &str =
    "Continue. When the task is finished, call `call-termination` with the final result.";

pub struct Agent {
    config: AgentConfig,
    backend: Arc<dyn CompletionBackend>,
    tools: ToolSet,
    termination: ToolSpec,
    store: Option<Arc<dyn ConversationStore>>,
    history: Vec<Message>,
    iterations: usize,
    completed: bool,
    result: Option<String>,
}

impl Agent {
    pub fn new(
        instructions: impl Into<String>,
        config: AgentConfig,
        backend: Arc<dyn CompletionBackend>,
        tools: ToolSet,
    ) -> Self {
        let mut history = Vec::with_capacity(2);
        if let Some(prompt) = &config.system_prompt {
            history.push(Message::system(prompt.clone()));
        }
        history.push(Message::user(instructions));

        let termination = ToolSpec::describe(
            TERMINATION_TOOL,
            "Terminate the conversation and return the final result.",
            &ParameterSchema::new(vec![ParameterSpec::required(
                "result",
                ParamKind::String,
                "The final result of the task.",
            )]),
            tools.platform(),
        );

        Self {
            config,
            backend,
            tools,
            termination,
            store: None,
            history,
            iterations: 0,
            completed: false,
            result: None,
        }
    }

    /// Attach a store that receives every turn.
    pub fn set_database_provider(&mut self, store: Arc<dyn ConversationStore>) {
        self.store = Some(store);
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Step until the model terminates or the iteration bound is hit.
    pub async fn run(&mut self) -> Result<String, AgentError> {
        if self.completed {
            return Err(AgentError::AlreadyCompleted);
        }

        loop {
            match self.step().await {
                TurnOutcome::Continue(_) => continue,
                TurnOutcome::Done => return Ok(self.result.clone().unwrap_or_default()),
                TurnOutcome::Error(err) => return Err(err),
            }
        }
    }

    /// One request/response exchange. The iteration bound counts every
    /// completed exchange over the agent's lifetime, across `run` calls.
    pub async fn step(&mut self) -> TurnOutcome {
        if self.completed {
            return TurnOutcome::Error(AgentError::AlreadyCompleted);
        }
        if self.iterations >= self.config.max_iterations {
            tracing::warn!(
                session_id = %self.config.session_id,
                max_iterations = self.config.max_iterations,
                "agent hit its iteration bound"
            );
            return TurnOutcome::Error(AgentError::MaxIterationsExceeded {
                max: self.config.max_iterations,
            });
        }

        let mut specs = self.tools.specs();
        specs.push(self.termination.clone());

        let completion = match self.backend.complete(&self.history, &specs).await {
            Ok(c) => c,
            Err(e) => return TurnOutcome::Error(AgentError::Backend(format!("{e:#}"))),
        };

        let index = self.iterations;
        self.iterations += 1;

        let mut call = completion.tool_call;
        if let Some(c) = call.as_mut() {
            if c.id.is_empty() {
                c.id = format!("call_{index}");
            }
        }
        let response = Message::assistant(completion.text, call.clone());
        self.history.push(response.clone());

        let follow_up = match call {
            Some(call) if call.name == TERMINATION_TOOL => {
                let result = termination_result(&call, &response.content);
                tracing::info!(
                    session_id = %self.config.session_id,
                    iterations = self.iterations,
                    "agent completed"
                );
                self.completed = true;
                self.result = Some(result);
                let turn = Turn {
                    index,
                    response,
                    follow_up: None,
                };
                self.record(&turn).await;
                return TurnOutcome::Done;
            }
            Some(call) => match self.dispatch(&call).await {
                Ok(observation) => Message::tool_result(call.id.clone(), observation),
                Err(err) => return TurnOutcome::Error(err),
            },
            None => Message::user(CONTINUATION_PROMPT),
        };

        self.history.push(follow_up.clone());
        let turn = Turn {
            index,
            response,
            follow_up: Some(follow_up),
        };
        self.record(&turn).await;
        TurnOutcome::Continue(turn)
    }

    async fn dispatch(&self, call: &ToolCall) -> Result<String, AgentError> {
        if !self.tools.contains(&call.name) {
            tracing::warn!(tool = %call.name, "model requested an unknown tool");
            let available = self.tools.names().join(", ");
            let message = format!(
                "Error: no tool named '{}'. Available tools: {}",
                call.name,
                if available.is_empty() { "none" } else { available.as_str() }
            );
            return Ok(format_observations([(call.name.as_str(), message.as_str())]));
        }

        let tool_err = |message: String| AgentError::Tool {
            tool: call.name.clone(),
            message,
        };
        let args = ToolArgs::from_value(&call.name, call.arguments.clone())
            .map_err(|e| tool_err(e.to_string()))?;
        let output = self
            .tools
            .invoke(&call.name, &args)
            .await
            .map_err(|e| tool_err(e.to_string()))?;

        tracing::debug!(tool = %call.name, bytes = output.len(), "tool returned");
        Ok(format_observations([(call.name.as_str(), output.as_str())]))
    }

    async fn record(&self, turn: &Turn) {
        let Some(store) = &self.store else {
            return;
        };
        if let Err(e) = store.record_turn(&self.config.session_id, turn).await {
            tracing::warn!(
                session_id = %self.config.session_id,
                turn = turn.index,
                error = %e,
                "failed to record conversation turn"
            );
        }
    }
}

fn termination_result(call: &ToolCall, fallback: &str) -> String {
    call.arguments
        .get("result")
        .map(|v| match v.as_str() {
            Some(s) => s.to_string(),
            None => v.to_string(),
        })
        .unwrap_or_else(|| fallback.to_string())
}
