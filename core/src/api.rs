//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `taskweave_core::api` instead of reaching into internal modules.

pub use crate::agent::{
    format_observations, Agent, AgentConfig, AgentDefaults, Completion, CompletionBackend,
    ConversationStore, Message, Role, ToolCall, Turn, TurnOutcome, TERMINATION_TOOL,
};
pub use crate::config::{
    load_default, load_from_path, AppConfig, BackendConfig, ConversationConfig, ExecutorConfig,
    HttpBackendConfig, IndexConfig, LoggingConfig, RetryConfig, ScriptedBackendConfig,
};
pub use crate::error::{AgentError, CliError, RegistryError, TaskError, ToolError, TransitionError};
pub use crate::executor::{ExponentialBackoff, RetryStrategy, TaskExecution, TaskExecutor};
pub use crate::search::{
    EmbeddingStore, SimilarityScorer, SymbolEmbedding, SymbolPath, SymbolSearch,
};
pub use crate::task::{
    BroadcastObserver, SharedTask, Task, TaskBuilder, TaskEnvironment, TaskEvent, TaskId, TaskKind,
    TaskObserver, TaskRegistry, TaskStatus,
};
pub use crate::tool::{
    ParamKind, ParameterSchema, ParameterSpec, Platform, PlatformTool, Tool, ToolArgs,
    ToolBuilder, ToolBuilderRegistry, ToolCategory, ToolDependencies, ToolHandler, ToolSet,
    ToolSpec,
};
