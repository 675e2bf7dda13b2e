//! Runs `TaskKind::Agent` tasks: one fresh agent per attempt.

use std::sync::Arc;

use async_trait::async_trait;

use taskweave_core::api::{
    Agent, AgentConfig, AgentDefaults, CompletionBackend, ConversationStore, Task, TaskError,
    TaskExecution, TaskKind, ToolBuilderRegistry, ToolDependencies,
};

/// Hands out the completion backend for a resolved agent config.
pub trait BackendProvider: Send + Sync {
    fn backend(&self, config: &AgentConfig) -> Result<Arc<dyn CompletionBackend>, TaskError>;
}

impl<F> BackendProvider for F
where
    F: Fn(&AgentConfig) -> Result<Arc<dyn CompletionBackend>, TaskError> + Send + Sync,
{
    fn backend(&self, config: &AgentConfig) -> Result<Arc<dyn CompletionBackend>, TaskError> {
        self(config)
    }
}

pub struct AgentTaskExecution {
    registry: Arc<ToolBuilderRegistry>,
    deps: ToolDependencies,
    backends: Arc<dyn BackendProvider>,
    defaults: AgentDefaults,
    store: Option<Arc<dyn ConversationStore>>,
}

impl AgentTaskExecution {
    pub fn new(
        registry: Arc<ToolBuilderRegistry>,
        deps: ToolDependencies,
        backends: Arc<dyn BackendProvider>,
    ) -> Self {
        Self {
            registry,
            deps,
            backends,
            defaults: AgentDefaults::default(),
            store: None,
        }
    }

    pub fn with_defaults(mut self, defaults: AgentDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_store(mut self, store: Arc<dyn ConversationStore>) -> Self {
        self.store = Some(store);
        self
    }
}

#[async_trait]
impl TaskExecution for AgentTaskExecution {
    async fn execute(&self, task: &Task) -> Result<String, TaskError> {
        if task.kind() != &TaskKind::Agent {
            return Err(TaskError::General(format!(
                "agent executor cannot run task kind '{}'",
                task.kind()
            )));
        }

        let config = AgentConfig::from_parameters(task.parameters(), &self.defaults)?;
        let tools = self
            .registry
            .build_toolset(&config.toolkits, config.platform, &self.deps)
            .map_err(|e| TaskError::General(e.to_string()))?;
        let backend = self.backends.backend(&config)?;

        tracing::info!(
            task_id = %task.id(),
            session_id = %config.session_id,
            model = %config.model,
            platform = %config.platform,
            backend = backend.name(),
            tools = tools.len(),
            "agent starting"
        );

        let mut agent = Agent::new(task.instructions(), config, backend, tools);
        if let Some(store) = &self.store {
            agent.set_database_provider(store.clone());
        }
        let result = agent.run().await?;
        tracing::info!(task_id = %task.id(), iterations = agent.iterations(), "agent finished");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ScriptedBackend;
    use crate::memory::InMemoryConversationStore;
    use crate::tools::register_builtin_tools;
    use serde_json::json;
    use taskweave_core::api::{Completion, TERMINATION_TOOL};

    fn execution(
        completions: Vec<Completion>,
        root: &std::path::Path,
    ) -> (AgentTaskExecution, Arc<InMemoryConversationStore>) {
        let mut registry = ToolBuilderRegistry::new();
        register_builtin_tools(&mut registry).unwrap();
        let backend: Arc<dyn CompletionBackend> =
            Arc::new(ScriptedBackend::from_completions(completions));
        let provider = move |_: &AgentConfig| -> Result<Arc<dyn CompletionBackend>, TaskError> {
            Ok(backend.clone())
        };
        let store = Arc::new(InMemoryConversationStore::new());
        let exec = AgentTaskExecution::new(
            Arc::new(registry),
            ToolDependencies::new().with_workspace_root(root),
            Arc::new(provider),
        )
        .with_store(store.clone());
        (exec, store)
    }

    #[tokio::test]
    async fn writes_a_file_then_terminates() {
        let dir = tempfile::tempdir().unwrap();
        let (exec, store) = execution(
            vec![
                Completion::tool_call("write-file", json!({"path": "out.txt", "content": "hi"})),
                Completion::tool_call(TERMINATION_TOOL, json!({"result": "written"})),
            ],
            dir.path(),
        );
        let task = Task::builder("write hi to out.txt")
            .parameter("model", "scripted")
            .parameter("toolkits", "file_writer")
            .parameter("session_id", "s-42")
            .build()
            .unwrap();

        assert_eq!(exec.execute(&task).await.unwrap(), "written");
        assert_eq!(
            tokio::fs::read_to_string(dir.path().join("out.txt")).await.unwrap(),
            "hi"
        );
        assert_eq!(store.turns("s-42").await.len(), 2);
    }

    #[tokio::test]
    async fn custom_kinds_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (exec, _) = execution(vec![], dir.path());
        let task = Task::builder("x")
            .kind(TaskKind::Custom("cron".into()))
            .build()
            .unwrap();
        assert!(matches!(
            exec.execute(&task).await,
            Err(TaskError::General(_))
        ));
    }

    #[tokio::test]
    async fn missing_tool_dependency_is_a_general_error() {
        let dir = tempfile::tempdir().unwrap();
        let (exec, _) = execution(vec![], dir.path());
        let task = Task::builder("x")
            .parameter("model", "scripted")
            .parameter("toolkits", "context_oracle")
            .build()
            .unwrap();
        let err = exec.execute(&task).await.unwrap_err();
        assert!(matches!(err, TaskError::General(ref m) if m.contains("similarity scorer")));
    }
}
