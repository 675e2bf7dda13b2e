use thiserror::Error;

use crate::task::TaskStatus;

use super::agent::AgentError;

/// Failures surfaced by the task machinery.
///
/// Only [`TaskError::Execution`] and [`TaskError::ResourceExhausted`] are
/// retried by the executor; the other two are caller bugs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    #[error("task state error: {0}")]
    State(String),

    #[error("task error: {0}")]
    General(String),

    #[error("task execution failed: {0}")]
    Execution(String),

    #[error("task exhausted its resources: {0}")]
    ResourceExhausted(String),
}

impl TaskError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Execution(_) | Self::ResourceExhausted(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::State(_) => "state",
            Self::General(_) => "general",
            Self::Execution(_) => "execution",
            Self::ResourceExhausted(_) => "resource_exhausted",
        }
    }
}

/// Illegal lifecycle edge.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition { from: TaskStatus, to: TaskStatus },

    #[error("cannot transition from terminal state {state}")]
    FromTerminalState { state: TaskStatus },
}

impl From<TransitionError> for TaskError {
    fn from(err: TransitionError) -> Self {
        TaskError::State(err.to_string())
    }
}

impl From<AgentError> for TaskError {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::AlreadyCompleted => TaskError::State(err.to_string()),
            AgentError::MaxIterationsExceeded { .. } => {
                TaskError::ResourceExhausted(err.to_string())
            }
            AgentError::Backend(_) | AgentError::Tool { .. } => {
                TaskError::Execution(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_execution_and_exhaustion_are_retryable() {
        assert!(TaskError::Execution("boom".into()).is_retryable());
        assert!(TaskError::ResourceExhausted("iters".into()).is_retryable());
        assert!(!TaskError::State("bad".into()).is_retryable());
        assert!(!TaskError::General("bad".into()).is_retryable());
    }

    #[test]
    fn agent_errors_map_onto_task_taxonomy() {
        let state: TaskError = AgentError::AlreadyCompleted.into();
        assert!(matches!(state, TaskError::State(_)));

        let exhausted: TaskError = AgentError::MaxIterationsExceeded { max: 3 }.into();
        assert!(matches!(exhausted, TaskError::ResourceExhausted(_)));
        assert!(exhausted.to_string().contains("3"));

        let backend: TaskError = AgentError::Backend("503".into()).into();
        assert!(matches!(backend, TaskError::Execution(_)));
    }

    #[test]
    fn transition_errors_become_state_errors() {
        let err: TaskError = TransitionError::InvalidTransition {
            from: TaskStatus::Created,
            to: TaskStatus::Running,
        }
        .into();
        assert_eq!(err.kind(), "state");
        assert!(err.to_string().contains("CREATED"));
    }
}
