//! CLI wiring: build the registry, environment and executor from config and run one task.
use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;

use taskweave_core::api::{
    AppConfig, BroadcastObserver, CliError, RegistryError, Task, TaskEnvironment, TaskEvent,
    TaskExecutor, TaskObserver, TaskRegistry, TaskStatus,
};
use taskweave_plugins::factory;

use crate::commands::cli::RunArgs;

fn config_err(e: anyhow::Error) -> CliError {
    CliError::Config(format!("{e:#}"))
}

/// Classify a factory failure by its root cause.
fn factory_err(e: anyhow::Error) -> CliError {
    let e = match e.downcast::<RegistryError>() {
        Ok(err) => return CliError::Registry(err),
        Err(e) => e,
    };
    if let Some(kind) = e.downcast_ref::<std::io::Error>().map(std::io::Error::kind) {
        return CliError::Io(std::io::Error::new(kind, format!("{e:#}")));
    }
    config_err(e)
}

/// Log every status change until the observer goes away.
fn spawn_event_logger(observer: &BroadcastObserver) -> tokio::task::JoinHandle<()> {
    let mut event_rx = observer.subscribe();
    tokio::spawn(async move {
        loop {
            match event_rx.recv().await {
                Ok(TaskEvent::StatusChanged {
                    task_id,
                    status,
                    retry_count,
                    error,
                    ..
                }) => match status {
                    TaskStatus::Failed => {
                        tracing::error!(%task_id, retry_count, error = ?error, "task failed");
                    }
                    TaskStatus::Retrying => {
                        tracing::warn!(%task_id, retry_count, error = ?error, "task retrying");
                    }
                    _ => tracing::debug!(%task_id, %status, retry_count, "task status changed"),
                },
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "task event logger lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

pub fn build_task(cfg: &AppConfig, run: &RunArgs) -> Result<Task, CliError> {
    let mut builder = Task::builder(run.instructions.clone())
        .parameters(run.params.iter().cloned())
        .max_retries(run.max_retries.unwrap_or(cfg.executor.max_retries))
        .deterministic_id(run.deterministic_id);
    if !run.toolkits.is_empty() {
        builder = builder.parameter("toolkits", run.toolkits.join(","));
    }
    Ok(builder.build()?)
}

#[tracing::instrument(name = "cli.run_task", skip_all)]
pub async fn run_task(cfg: &AppConfig, run: &RunArgs) -> Result<String, CliError> {
    let execution = factory::build_agent_execution(cfg).map_err(factory_err)?;
    let retry = factory::build_retry_strategy(&cfg.executor.retry).map_err(config_err)?;
    let executor = TaskExecutor::new(Arc::new(execution)).with_retry_strategy(retry);

    let observer = Arc::new(BroadcastObserver::default());
    let logger = spawn_event_logger(&observer);
    let env_observer: Arc<dyn TaskObserver> = observer.clone();

    let registry = TaskRegistry::new();
    let env = TaskEnvironment::new(registry.clone(), env_observer);

    let task = build_task(cfg, run)?;
    let task_id = task.id();
    let shared = registry.register(task).await?;
    env.setup(&mut *shared.lock().await).await?;
    tracing::info!(%task_id, retry = executor.retry_strategy().name(), "task ready");

    let outcome = executor.execute_shared(&shared).await;

    // Closing the channel lets the logger drain and stop.
    drop(env);
    drop(observer);
    let _ = logger.await;

    outcome?;
    let guard = shared.lock().await;
    Ok(guard.result().unwrap_or_default().to_string())
}

pub fn list_tools() -> Result<Vec<String>, CliError> {
    let registry = factory::build_tool_registry()?;
    Ok(registry
        .keys()
        .into_iter()
        .map(|(category, platform)| format!("{category}\t{platform}"))
        .collect())
}
