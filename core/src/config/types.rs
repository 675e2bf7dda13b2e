use serde::{Deserialize, Serialize};

use crate::agent::AgentDefaults;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub executor: ExecutorConfig,

    #[serde(default)]
    pub agent: AgentDefaults,

    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub conversation: ConversationConfig,

    #[serde(default)]
    pub index: IndexConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default = "default_logging_file")]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "taskweave_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_file() -> bool {
    false
}

fn default_logging_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: default_logging_file(),
            level: default_logging_level(),
            directory: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Attempt budget for tasks that don't set their own.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_max_retries() -> u32 {
    crate::task::DEFAULT_MAX_RETRIES
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry: RetryConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// "exponential-backoff" or "linear".
    #[serde(default = "default_retry_strategy")]
    pub strategy: String,

    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Upper bound for a single delay. Unset means no cap.
    #[serde(default)]
    pub max_delay_ms: Option<u64>,
}

fn default_retry_strategy() -> String {
    "exponential-backoff".to_string()
}

fn default_base_delay_ms() -> u64 {
    1000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            strategy: default_retry_strategy(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum BackendConfig {
    #[serde(rename = "scripted")]
    Scripted(ScriptedBackendConfig),
    #[serde(rename = "openai")]
    OpenAi(HttpBackendConfig),
    #[serde(rename = "anthropic")]
    Anthropic(HttpBackendConfig),
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::OpenAi(HttpBackendConfig::default())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScriptedBackendConfig {
    /// JSONL file, one completion per line.
    #[serde(default)]
    pub script_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpBackendConfig {
    #[serde(default)]
    pub base_url: String,

    /// Name of the environment variable holding the API key.
    #[serde(default)]
    pub api_key_env: String,

    #[serde(default = "default_backend_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_backend_timeout_ms() -> u64 {
    60_000
}

fn default_max_tokens() -> u32 {
    4096
}

impl Default for HttpBackendConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key_env: String::new(),
            timeout_ms: default_backend_timeout_ms(),
            max_tokens: default_max_tokens(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationConfig {
    #[serde(default = "default_conversation_enabled")]
    pub enabled: bool,

    #[serde(default = "default_conversation_path")]
    pub path: String,
}

fn default_conversation_enabled() -> bool {
    false
}

fn default_conversation_path() -> String {
    "./conversations.jsonl".to_string()
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            enabled: default_conversation_enabled(),
            path: default_conversation_path(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexConfig {
    /// JSON file with the symbol documents for the search tools.
    #[serde(default)]
    pub path: Option<String>,

    /// Root the file tools are confined to.
    #[serde(default)]
    pub workspace_root: Option<String>,
}
