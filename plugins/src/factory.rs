use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use taskweave_core::api::{
    AgentConfig, AppConfig, BackendConfig, CompletionBackend, ConversationConfig,
    ConversationStore, ExponentialBackoff, IndexConfig, RetryConfig, RetryStrategy, TaskError,
    RegistryError, ToolBuilderRegistry, ToolDependencies,
};

use crate::backend::{AnthropicBackend, OpenAiBackend, ScriptedBackend};
use crate::executor::{AgentTaskExecution, BackendProvider, LinearRetry};
use crate::memory::JsonlConversationStore;
use crate::search::KeywordIndex;
use crate::tools::register_builtin_tools;

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).to_string())
}

pub fn build_retry_strategy(cfg: &RetryConfig) -> Result<Arc<dyn RetryStrategy>> {
    let base = Duration::from_millis(cfg.base_delay_ms);
    let cap = cfg.max_delay_ms.map(Duration::from_millis);
    match cfg.strategy.as_str() {
        "exponential-backoff" | "exponential" => {
            let mut strategy = ExponentialBackoff::new(base);
            if let Some(cap) = cap {
                strategy = strategy.with_max_delay(cap);
            }
            Ok(Arc::new(strategy))
        }
        "linear" => {
            let mut strategy = LinearRetry::new(base);
            if let Some(cap) = cap {
                strategy = strategy.with_max_delay(cap);
            }
            Ok(Arc::new(strategy))
        }
        other => anyhow::bail!("unknown retry strategy: {other}"),
    }
}

/// The scripted backend is shared across agents so one script drives a whole run;
/// the HTTP backends are built per agent for its configured model.
pub fn build_backend_provider(cfg: &BackendConfig) -> Result<Arc<dyn BackendProvider>> {
    match cfg {
        BackendConfig::Scripted(s_cfg) => {
            if s_cfg.script_file.trim().is_empty() {
                anyhow::bail!("scripted backend requires backend.script_file");
            }
            let backend: Arc<dyn CompletionBackend> =
                Arc::new(ScriptedBackend::new(expand(&s_cfg.script_file)));
            Ok(Arc::new(
                move |_: &AgentConfig| -> Result<Arc<dyn CompletionBackend>, TaskError> {
                    Ok(backend.clone())
                },
            ))
        }
        BackendConfig::OpenAi(h_cfg) => {
            let h_cfg = h_cfg.clone();
            Ok(Arc::new(
                move |agent: &AgentConfig| -> Result<Arc<dyn CompletionBackend>, TaskError> {
                    let backend = OpenAiBackend::from_env(
                        &h_cfg.base_url,
                        &h_cfg.api_key_env,
                        agent.model.clone(),
                        h_cfg.timeout_ms,
                        h_cfg.max_tokens,
                    )
                    .map_err(|e| TaskError::General(format!("{e:#}")))?;
                    Ok(Arc::new(backend))
                },
            ))
        }
        BackendConfig::Anthropic(h_cfg) => {
            let h_cfg = h_cfg.clone();
            Ok(Arc::new(
                move |agent: &AgentConfig| -> Result<Arc<dyn CompletionBackend>, TaskError> {
                    let backend = AnthropicBackend::from_env(
                        &h_cfg.base_url,
                        &h_cfg.api_key_env,
                        agent.model.clone(),
                        h_cfg.timeout_ms,
                        h_cfg.max_tokens,
                    )
                    .map_err(|e| TaskError::General(format!("{e:#}")))?;
                    Ok(Arc::new(backend))
                },
            ))
        }
    }
}

pub fn build_index(cfg: &IndexConfig) -> Result<Option<Arc<KeywordIndex>>> {
    match cfg.path.as_deref().filter(|p| !p.trim().is_empty()) {
        Some(path) => Ok(Some(Arc::new(KeywordIndex::load(&expand(path))?))),
        None => Ok(None),
    }
}

pub fn build_conversation_store(cfg: &ConversationConfig) -> Option<Arc<dyn ConversationStore>> {
    if !cfg.enabled {
        return None;
    }
    Some(Arc::new(JsonlConversationStore::new(expand(&cfg.path))))
}

pub fn build_tool_registry() -> std::result::Result<ToolBuilderRegistry, RegistryError> {
    let mut registry = ToolBuilderRegistry::new();
    register_builtin_tools(&mut registry)?;
    Ok(registry)
}

/// Workspace root defaults to the current directory; search collaborators
/// are only present when an index is configured.
pub fn build_tool_dependencies(cfg: &IndexConfig) -> Result<ToolDependencies> {
    let root = match cfg.workspace_root.as_deref().filter(|p| !p.trim().is_empty()) {
        Some(root) => expand(root),
        None => std::env::current_dir()?,
    };
    let mut deps = ToolDependencies::new().with_workspace_root(root);
    if let Some(index) = build_index(cfg)? {
        deps = deps
            .with_symbol_search(index.clone())
            .with_similarity(index.clone())
            .with_embeddings(index);
    }
    Ok(deps)
}

pub fn build_agent_execution(cfg: &AppConfig) -> Result<AgentTaskExecution> {
    let mut execution = AgentTaskExecution::new(
        Arc::new(build_tool_registry()?),
        build_tool_dependencies(&cfg.index)?,
        build_backend_provider(&cfg.backend)?,
    )
    .with_defaults(cfg.agent.clone());
    if let Some(store) = build_conversation_store(&cfg.conversation) {
        execution = execution.with_store(store);
    }
    Ok(execution)
}
