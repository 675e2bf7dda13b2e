mod common;

use std::sync::Arc;

use async_trait::async_trait;
use common::CannedBackend;
use serde_json::json;
use taskweave_core::api::{
    Agent, AgentConfig, AgentDefaults, Completion, CompletionBackend, ParamKind, ParameterSchema,
    ParameterSpec, Platform, RegistryError, Task, TaskEnvironment, TaskError, TaskExecution,
    TaskExecutor, TaskRegistry, TaskStatus, Tool, ToolArgs, ToolBuilder, ToolBuilderRegistry,
    ToolCategory, ToolDependencies, ToolError, ToolHandler, BroadcastObserver, TERMINATION_TOOL,
};

struct WordCount;

#[async_trait]
impl ToolHandler for WordCount {
    async fn invoke(&self, args: &ToolArgs) -> Result<String, ToolError> {
        let text = args.require_str("word-count", "text")?;
        Ok(text.split_whitespace().count().to_string())
    }
}

struct TextToolsBuilder;

impl ToolBuilder for TextToolsBuilder {
    fn category(&self) -> ToolCategory {
        ToolCategory::FileReader
    }

    fn build(&self) -> Vec<Tool> {
        vec![Tool::new(
            "word-count",
            "Count words in text",
            ParameterSchema::new(vec![ParameterSpec::required(
                "text",
                ParamKind::String,
                "Text to count",
            )]),
            Arc::new(WordCount),
        )]
    }
}

/// Builds an agent from the task parameters and runs it.
struct AgentExecution {
    registry: Arc<ToolBuilderRegistry>,
    backend: Arc<dyn CompletionBackend>,
}

#[async_trait]
impl TaskExecution for AgentExecution {
    async fn execute(&self, task: &Task) -> Result<String, TaskError> {
        let config = AgentConfig::from_parameters(task.parameters(), &AgentDefaults::default())?;
        let tools = self
            .registry
            .build_toolset(&config.toolkits, config.platform, &ToolDependencies::new())
            .map_err(|e| TaskError::General(e.to_string()))?;
        let mut agent = Agent::new(task.instructions(), config, self.backend.clone(), tools);
        Ok(agent.run().await?)
    }
}

fn registry() -> Arc<ToolBuilderRegistry> {
    let mut registry = ToolBuilderRegistry::new();
    registry
        .register_all_platforms(ToolCategory::FileReader, |_| {
            Ok(Box::new(TextToolsBuilder) as Box<dyn ToolBuilder>)
        })
        .unwrap();
    Arc::new(registry)
}

async fn pending(task: Task) -> taskweave_core::api::SharedTask {
    let registry = TaskRegistry::new();
    let env = TaskEnvironment::new(registry.clone(), Arc::new(BroadcastObserver::default()));
    let shared = registry.register(task).await.unwrap();
    env.setup(&mut *shared.lock().await).await.unwrap();
    shared
}

#[tokio::test]
async fn agent_task_uses_registry_tools_and_finishes() {
    let backend = CannedBackend::new(vec![
        Completion::tool_call("word-count", json!({ "text": "one two three" })),
        Completion::tool_call(TERMINATION_TOOL, json!({ "result": "3 words" })),
    ]);
    let executor = TaskExecutor::new(Arc::new(AgentExecution {
        registry: registry(),
        backend,
    }));

    let shared = pending(
        Task::builder("count the words")
            .parameter("model", "m")
            .parameter("platform", "anthropic")
            .parameter("toolkits", "file_reader")
            .build()
            .unwrap(),
    )
    .await;

    executor.execute_shared(&shared).await.unwrap();
    let task = shared.lock().await;
    assert_eq!(task.status(), TaskStatus::Success);
    assert_eq!(task.result(), Some("3 words"));
    assert_eq!(task.retry_count(), 0);
}

#[tokio::test]
async fn missing_model_fails_without_retry() {
    let backend = CannedBackend::new(vec![]);
    let executor = TaskExecutor::new(Arc::new(AgentExecution {
        registry: registry(),
        backend,
    }));
    let shared = pending(Task::builder("no model").max_retries(5).build().unwrap()).await;

    let err = executor.execute_shared(&shared).await.unwrap_err();
    assert!(matches!(err, TaskError::General(_)));
    let task = shared.lock().await;
    assert_eq!(task.status(), TaskStatus::Failed);
    assert_eq!(task.retry_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn iteration_bound_is_retried_as_resource_exhaustion() {
    let backend = CannedBackend::new(vec![
        Completion::text("hmm"),
        Completion::text("still thinking"),
        Completion::tool_call(TERMINATION_TOOL, json!({ "result": "second try" })),
    ]);
    let executor = TaskExecutor::new(Arc::new(AgentExecution {
        registry: registry(),
        backend,
    }));
    let shared = pending(
        Task::builder("slow")
            .parameter("model", "m")
            .parameter("max_iterations", "2")
            .max_retries(2)
            .build()
            .unwrap(),
    )
    .await;

    executor.execute_shared(&shared).await.unwrap();
    let task = shared.lock().await;
    assert_eq!(task.status(), TaskStatus::Success);
    assert_eq!(task.retry_count(), 1);
    assert_eq!(task.result(), Some("second try"));
}

#[test]
fn unregistered_platform_pair_is_reported() {
    let mut registry = ToolBuilderRegistry::new();
    registry
        .register(ToolCategory::FileReader, Platform::OpenAi, |_| {
            Ok(Box::new(TextToolsBuilder) as Box<dyn ToolBuilder>)
        })
        .unwrap();

    let err = registry
        .build_toolset(
            &[ToolCategory::FileReader],
            Platform::Anthropic,
            &ToolDependencies::new(),
        )
        .unwrap_err();
    assert_eq!(
        err,
        RegistryError::UnknownBuilder {
            category: ToolCategory::FileReader,
            platform: Platform::Anthropic,
        }
    );
}
