use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{TaskError, TransitionError};

use super::id_gen::{deterministic_task_id, random_task_id};
use super::observer::TaskObserver;
use super::transitions::StateTransition;

pub type TaskId = Uuid;

/// Default attempt budget for tasks built without an explicit `max_retries`.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Lifecycle states of a [`Task`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Created,
    Registered,
    Pending,
    Running,
    Success,
    Failed,
    Retrying,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Registered => "REGISTERED",
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
            Self::Retrying => "RETRYING",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which execution strategy a task expects to be driven by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    #[default]
    Agent,
    Custom(String),
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Agent => f.write_str("agent"),
            TaskKind::Custom(name) => write!(f, "custom:{name}"),
        }
    }
}

/// A unit of work carried through the retryable lifecycle.
///
/// Status, retry bookkeeping and the result/error pair are only mutated by the
/// registry, the environment and the executor; everything else reads.
pub struct Task {
    task_id: TaskId,
    kind: TaskKind,
    instructions: String,
    parameters: BTreeMap<String, String>,
    status: TaskStatus,
    retry_count: u32,
    max_retries: u32,
    result: Option<String>,
    error: Option<String>,
    observer: Option<Weak<dyn TaskObserver>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Task {
    pub fn builder(instructions: impl Into<String>) -> TaskBuilder {
        TaskBuilder::new(instructions)
    }

    pub fn id(&self) -> TaskId {
        self.task_id
    }

    pub fn kind(&self) -> &TaskKind {
        &self.kind
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn parameters(&self) -> &BTreeMap<String, String> {
        &self.parameters
    }

    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_terminal(&self) -> bool {
        StateTransition::is_terminal(self.status)
    }

    /// Whether a live observer is attached.
    pub fn has_observer(&self) -> bool {
        self.observer
            .as_ref()
            .map(|o| o.strong_count() > 0)
            .unwrap_or(false)
    }

    /// Attach an observer. Only transitions made after this call are reported.
    pub fn set_observer(&mut self, observer: &Arc<dyn TaskObserver>) {
        self.observer = Some(Arc::downgrade(observer));
    }

    pub(crate) fn transition_to(&mut self, to: TaskStatus) -> Result<(), TransitionError> {
        StateTransition::validate(self.status, to)?;
        tracing::trace!(task_id = %self.task_id, from = %self.status, to = %to, "task transition");
        self.status = to;
        self.updated_at = Utc::now();
        self.notify_observer();
        Ok(())
    }

    pub(crate) fn record_success(&mut self, result: String) -> Result<(), TransitionError> {
        StateTransition::validate(self.status, TaskStatus::Success)?;
        self.result = Some(result);
        self.error = None;
        self.transition_to(TaskStatus::Success)
    }

    /// Record one failed attempt and move to `next` (FAILED or RETRYING).
    pub(crate) fn record_failure(
        &mut self,
        error: String,
        next: TaskStatus,
    ) -> Result<(), TransitionError> {
        StateTransition::validate(self.status, next)?;
        self.error = Some(error);
        self.result = None;
        self.retry_count = self.retry_count.saturating_add(1).min(self.max_retries);
        self.transition_to(next)
    }

    fn notify_observer(&self) {
        let observer = self.observer.as_ref().and_then(Weak::upgrade);
        if let Some(observer) = observer {
            observer.notify(self);
        }
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("task_id", &self.task_id)
            .field("kind", &self.kind)
            .field("status", &self.status)
            .field("retry_count", &self.retry_count)
            .field("max_retries", &self.max_retries)
            .field("parameters", &self.parameters)
            .field("result", &self.result)
            .field("error", &self.error)
            .field("has_observer", &self.has_observer())
            .finish()
    }
}

/// Builder for [`Task`].
#[derive(Debug, Clone)]
pub struct TaskBuilder {
    instructions: String,
    parameters: BTreeMap<String, String>,
    kind: TaskKind,
    max_retries: u32,
    deterministic_id: bool,
}

impl TaskBuilder {
    pub fn new(instructions: impl Into<String>) -> Self {
        Self {
            instructions: instructions.into(),
            parameters: BTreeMap::new(),
            kind: TaskKind::Agent,
            max_retries: DEFAULT_MAX_RETRIES,
            deterministic_id: false,
        }
    }

    pub fn parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    pub fn parameters<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.parameters
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn kind(mut self, kind: TaskKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn deterministic_id(mut self, deterministic: bool) -> Self {
        self.deterministic_id = deterministic;
        self
    }

    pub fn build(self) -> Result<Task, TaskError> {
        if self.max_retries == 0 {
            return Err(TaskError::General(
                "max_retries must be greater than zero".to_string(),
            ));
        }

        let task_id = if self.deterministic_id {
            deterministic_task_id(&self.instructions, &self.parameters)
        } else {
            random_task_id()
        };

        let now = Utc::now();
        Ok(Task {
            task_id,
            kind: self.kind,
            instructions: self.instructions,
            parameters: self.parameters,
            status: TaskStatus::Created,
            retry_count: 0,
            max_retries: self.max_retries,
            result: None,
            error: None,
            observer: None,
            created_at: now,
            updated_at: now,
        })
    }
}
