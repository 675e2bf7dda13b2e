pub mod agent_task;
pub mod strategies;

pub use agent_task::{AgentTaskExecution, BackendProvider};
pub use strategies::LinearRetry;
