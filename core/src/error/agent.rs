use thiserror::Error;

/// Errors raised while stepping an agent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    #[error("agent has already completed its task")]
    AlreadyCompleted,

    #[error("agent exceeded the maximum number of iterations ({max})")]
    MaxIterationsExceeded { max: usize },

    #[error("completion backend failed: {0}")]
    Backend(String),

    #[error("tool '{tool}' failed: {message}")]
    Tool { tool: String, message: String },
}
