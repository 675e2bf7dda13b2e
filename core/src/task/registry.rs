//! 任务注册表

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use super::types::{Task, TaskId, TaskStatus};
use crate::error::TaskError;

/// A registered task. The mutex makes sure only one executor drives it at a time.
pub type SharedTask = Arc<Mutex<Task>>;

/// Tracks every task known to the process by id.
#[derive(Clone, Default)]
pub struct TaskRegistry {
    inner: Arc<RwLock<HashMap<TaskId, SharedTask>>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a CREATED task and move it to REGISTERED.
    pub async fn register(&self, mut task: Task) -> Result<SharedTask, TaskError> {
        let mut tasks = self.inner.write().await;
        let task_id = task.id();
        if tasks.contains_key(&task_id) {
            return Err(TaskError::General(format!(
                "task {task_id} is already registered"
            )));
        }

        task.transition_to(TaskStatus::Registered)?;
        tracing::debug!(task_id = %task_id, "task registered");

        let shared = Arc::new(Mutex::new(task));
        tasks.insert(task_id, shared.clone());
        Ok(shared)
    }

    pub async fn get(&self, task_id: &TaskId) -> Option<SharedTask> {
        self.inner.read().await.get(task_id).cloned()
    }

    pub async fn contains(&self, task_id: &TaskId) -> bool {
        self.inner.read().await.contains_key(task_id)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Registered ids in ascending order.
    pub async fn task_ids(&self) -> Vec<TaskId> {
        let mut ids: Vec<TaskId> = self.inner.read().await.keys().copied().collect();
        ids.sort();
        ids
    }
}
