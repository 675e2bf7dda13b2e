use async_trait::async_trait;

use crate::error::TaskError;
use crate::task::Task;

/// Runs one attempt of a task.
///
/// Implementations only read the task. The executor writes the outcome back,
/// so a strategy can't leave status and error out of sync.
#[async_trait]
pub trait TaskExecution: Send + Sync {
    async fn execute(&self, task: &Task) -> Result<String, TaskError>;
}
