use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

use super::types::{Task, TaskId, TaskStatus};

/// Receives a callback after every status change of an observed task.
pub trait TaskObserver: Send + Sync {
    fn notify(&self, task: &Task);
}

/// Snapshot emitted for every observed transition.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskEvent {
    StatusChanged {
        task_id: TaskId,
        status: TaskStatus,
        retry_count: u32,
        error: Option<String>,
        at: DateTime<Utc>,
    },
}

/// Fans task transitions out over a tokio broadcast channel.
#[derive(Clone)]
pub struct BroadcastObserver {
    event_tx: broadcast::Sender<TaskEvent>,
}

impl BroadcastObserver {
    pub fn new(capacity: usize) -> Self {
        let (event_tx, _) = broadcast::channel(capacity.max(1));
        Self { event_tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TaskEvent> {
        self.event_tx.subscribe()
    }
}

impl Default for BroadcastObserver {
    fn default() -> Self {
        Self::new(256)
    }
}

impl TaskObserver for BroadcastObserver {
    fn notify(&self, task: &Task) {
        let event = TaskEvent::StatusChanged {
            task_id: task.id(),
            status: task.status(),
            retry_count: task.retry_count(),
            error: task.error().map(str::to_string),
            at: task.updated_at(),
        };
        // no subscribers is fine
        let _ = self.event_tx.send(event);
    }
}
