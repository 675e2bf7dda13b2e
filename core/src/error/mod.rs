#[allow(clippy::module_inception)]
pub mod error;
pub mod agent;
pub mod task;
pub mod tool;

pub use agent::AgentError;
pub use error::CliError;
pub use task::{TaskError, TransitionError};
pub use tool::{RegistryError, ToolError};
