#[allow(clippy::module_inception)]
pub mod agent;
pub mod config;
pub mod observation;
pub mod traits;
pub mod types;

pub use agent::{Agent, TERMINATION_TOOL};
pub use config::{parse_toolkits, AgentConfig, AgentDefaults, DEFAULT_MAX_ITERATIONS};
pub use observation::format_observations;
pub use traits::{CompletionBackend, ConversationStore};
pub use types::{Completion, Message, Role, ToolCall, Turn, TurnOutcome};
