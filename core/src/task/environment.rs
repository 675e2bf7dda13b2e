use std::sync::Arc;

use super::observer::TaskObserver;
use super::registry::TaskRegistry;
use super::transitions::StateTransition;
use super::types::{Task, TaskStatus};
use crate::error::TaskError;

/// Prepares registered tasks for execution.
#[derive(Clone)]
pub struct TaskEnvironment {
    registry: TaskRegistry,
    observer: Arc<dyn TaskObserver>,
}

impl TaskEnvironment {
    pub fn new(registry: TaskRegistry, observer: Arc<dyn TaskObserver>) -> Self {
        Self { registry, observer }
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    /// Attach the environment observer and move the task to PENDING.
    ///
    /// The task must be known to the registry and currently REGISTERED.
    pub async fn setup(&self, task: &mut Task) -> Result<(), TaskError> {
        if !self.registry.contains(&task.id()).await {
            return Err(TaskError::State(format!(
                "task {} is not registered",
                task.id()
            )));
        }
        if task.status() != TaskStatus::Registered {
            return Err(TaskError::State(format!(
                "task {} must be {} to set up, found {}",
                task.id(),
                TaskStatus::Registered,
                task.status()
            )));
        }
        StateTransition::validate(task.status(), TaskStatus::Pending)?;

        task.set_observer(&self.observer);
        task.transition_to(TaskStatus::Pending)?;
        tracing::debug!(task_id = %task.id(), "task environment ready");
        Ok(())
    }
}
