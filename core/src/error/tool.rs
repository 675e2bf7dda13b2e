use thiserror::Error;

use crate::tool::{Platform, ToolCategory};

/// Failures produced by a single tool invocation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("invalid arguments for '{tool}': {message}")]
    InvalidArguments { tool: String, message: String },

    #[error("'{tool}' failed: {message}")]
    Execution { tool: String, message: String },

    #[error("tool not found: {0}")]
    NotFound(String),
}

impl ToolError {
    pub fn invalid(tool: &str, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool: tool.to_string(),
            message: message.into(),
        }
    }

    pub fn execution(tool: &str, message: impl Into<String>) -> Self {
        Self::Execution {
            tool: tool.to_string(),
            message: message.into(),
        }
    }
}

/// Failures raised while registering or resolving tool builders.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("a builder is already registered for ({category}, {platform})")]
    DuplicateBuilder {
        category: ToolCategory,
        platform: Platform,
    },

    #[error("no builder registered for ({category}, {platform})")]
    UnknownBuilder {
        category: ToolCategory,
        platform: Platform,
    },

    #[error("builder for {category} requires a {dependency}")]
    MissingDependency {
        category: ToolCategory,
        dependency: &'static str,
    },

    #[error("unknown tool category: {0}")]
    UnknownCategory(String),

    #[error("unknown platform: {0}")]
    UnknownPlatform(String),

    #[error("tool name '{0}' is provided by more than one builder")]
    DuplicateToolName(String),

    #[error("tool name '{0}' is reserved for the agent's termination call")]
    ReservedToolName(String),
}
