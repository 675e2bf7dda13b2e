//! Retrying task executor.

use std::sync::Arc;

use super::backoff::ExponentialBackoff;
use super::traits::{RetryStrategy, TaskExecution};
use crate::error::TaskError;
use crate::task::{SharedTask, Task, TaskStatus};

/// Drives a [`TaskExecution`] with a bounded number of attempts.
#[derive(Clone)]
pub struct TaskExecutor {
    execution: Arc<dyn TaskExecution>,
    retry: Arc<dyn RetryStrategy>,
}

impl TaskExecutor {
    pub fn new(execution: Arc<dyn TaskExecution>) -> Self {
        Self {
            execution,
            retry: Arc::new(ExponentialBackoff::default()),
        }
    }

    pub fn with_retry_strategy(mut self, retry: Arc<dyn RetryStrategy>) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry_strategy(&self) -> &dyn RetryStrategy {
        self.retry.as_ref()
    }

    /// Lock a registered task and execute it.
    pub async fn execute_shared(&self, task: &SharedTask) -> Result<(), TaskError> {
        let mut guard = task.lock().await;
        self.execute(&mut guard).await
    }

    /// Run a PENDING task until it succeeds or its attempts run out.
    ///
    /// `State` and `General` failures end the task immediately. Retryable
    /// failures move it through RETRYING and back to RUNNING after the
    /// strategy's delay; the last one is returned with the task FAILED.
    pub async fn execute(&self, task: &mut Task) -> Result<(), TaskError> {
        if task.status() != TaskStatus::Pending {
            return Err(TaskError::State(format!(
                "task {} is not in {} state (found {})",
                task.id(),
                TaskStatus::Pending,
                task.status()
            )));
        }

        let task_id = task.id();
        let max_attempts = task.max_retries();

        for attempt in 0..max_attempts {
            task.transition_to(TaskStatus::Running)?;
            tracing::debug!(
                task_id = %task_id,
                attempt = attempt + 1,
                max_attempts,
                "task attempt started"
            );

            let err = match self.execution.execute(task).await {
                Ok(result) => {
                    task.record_success(result)?;
                    tracing::info!(task_id = %task_id, attempt = attempt + 1, "task succeeded");
                    return Ok(());
                }
                Err(err) => err,
            };

            let last_attempt = attempt + 1 >= max_attempts;
            if !err.is_retryable() || last_attempt {
                task.record_failure(err.to_string(), TaskStatus::Failed)?;
                tracing::error!(
                    task_id = %task_id,
                    attempt = attempt + 1,
                    kind = err.kind(),
                    error = %err,
                    "task failed"
                );
                return Err(err);
            }

            task.record_failure(err.to_string(), TaskStatus::Retrying)?;
            let delay = self.retry.next_delay(attempt);
            tracing::warn!(
                task_id = %task_id,
                attempt = attempt + 1,
                delay_ms = delay.as_millis() as u64,
                strategy = self.retry.name(),
                error = %err,
                "task attempt failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }

        // max_retries > 0 is enforced when the task is built.
        Err(TaskError::General(format!(
            "task {task_id} has no attempts configured"
        )))
    }
}
