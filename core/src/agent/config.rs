use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TaskError;
use crate::tool::{Platform, ToolCategory};

pub const DEFAULT_MAX_ITERATIONS: usize = 50;

/// `[agent]` section: values used when a task doesn't carry its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentDefaults {
    pub model: Option<String>,
    pub platform: Platform,
    pub max_iterations: usize,
    pub toolkits: Vec<ToolCategory>,
    pub system_prompt: Option<String>,
}

impl Default for AgentDefaults {
    fn default() -> Self {
        Self {
            model: None,
            platform: Platform::default(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            toolkits: Vec::new(),
            system_prompt: None,
        }
    }
}

/// Fully resolved settings for one agent.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    pub model: String,
    pub platform: Platform,
    pub max_iterations: usize,
    pub toolkits: Vec<ToolCategory>,
    pub session_id: String,
    pub system_prompt: Option<String>,
}

impl AgentConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            platform: Platform::default(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            toolkits: Vec::new(),
            session_id: Uuid::new_v4().to_string(),
            system_prompt: None,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    /// Build from a task's parameter bag, falling back to `defaults`.
    ///
    /// Recognised keys: `model`, `platform`, `max_iterations`, `toolkits`
    /// (comma separated), `session_id`, `system_prompt`. Anything else is
    /// ignored here.
    pub fn from_parameters(
        params: &BTreeMap<String, String>,
        defaults: &AgentDefaults,
    ) -> Result<Self, TaskError> {
        let get = |key: &str| {
            params
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };

        let model = get("model")
            .map(str::to_string)
            .or_else(|| defaults.model.clone())
            .ok_or_else(|| TaskError::General("agent parameter 'model' must be provided".into()))?;

        let platform = match get("platform") {
            Some(raw) => raw
                .parse::<Platform>()
                .map_err(|e| TaskError::General(e.to_string()))?,
            None => defaults.platform,
        };

        let max_iterations = match get("max_iterations") {
            Some(raw) => raw.parse::<usize>().map_err(|_| {
                TaskError::General(format!("invalid max_iterations '{raw}'"))
            })?,
            None => defaults.max_iterations,
        };
        if max_iterations == 0 {
            return Err(TaskError::General(
                "max_iterations must be greater than zero".into(),
            ));
        }

        let toolkits = match params.get("toolkits") {
            Some(raw) => parse_toolkits(raw)?,
            None => defaults.toolkits.clone(),
        };

        let session_id = get("session_id")
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let system_prompt = get("system_prompt")
            .map(str::to_string)
            .or_else(|| defaults.system_prompt.clone());

        Ok(Self {
            model,
            platform,
            max_iterations,
            toolkits,
            session_id,
            system_prompt,
        })
    }
}

/// Parse a comma separated toolkit list. Duplicates collapse, order is kept.
pub fn parse_toolkits(raw: &str) -> Result<Vec<ToolCategory>, TaskError> {
    let mut toolkits = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let category = name
            .parse::<ToolCategory>()
            .map_err(|e| TaskError::General(e.to_string()))?;
        if !toolkits.contains(&category) {
            toolkits.push(category);
        }
    }
    Ok(toolkits)
}
