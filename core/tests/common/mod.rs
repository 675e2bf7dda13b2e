#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use taskweave_core::api::{
    Completion, CompletionBackend, Message, Task, TaskError, TaskExecution, TaskObserver,
    TaskStatus, ToolSpec,
};

/// Observer that remembers every status it was told about.
#[derive(Default)]
pub struct CountingObserver {
    seen: Mutex<Vec<TaskStatus>>,
}

impl CountingObserver {
    pub fn statuses(&self) -> Vec<TaskStatus> {
        self.seen.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

impl TaskObserver for CountingObserver {
    fn notify(&self, task: &Task) {
        self.seen.lock().unwrap().push(task.status());
    }
}

/// Execution that returns a fixed sequence of outcomes, then keeps succeeding.
pub struct ScriptedExecution {
    outcomes: Mutex<VecDeque<Result<String, TaskError>>>,
    pub calls: AtomicU32,
}

impl ScriptedExecution {
    pub fn new(outcomes: Vec<Result<String, TaskError>>) -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(outcomes.into()),
            calls: AtomicU32::new(0),
        })
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaskExecution for ScriptedExecution {
    async fn execute(&self, task: &Task) -> Result<String, TaskError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(format!("ok: {}", task.instructions())))
    }
}

/// Backend replaying canned completions.
pub struct CannedBackend {
    replies: Mutex<VecDeque<Completion>>,
}

impl CannedBackend {
    pub fn new(replies: Vec<Completion>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
        })
    }
}

#[async_trait]
impl CompletionBackend for CannedBackend {
    fn name(&self) -> &str {
        "canned"
    }

    async fn complete(
        &self,
        _history: &[Message],
        _tools: &[ToolSpec],
    ) -> anyhow::Result<Completion> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("no more canned replies"))
    }
}
