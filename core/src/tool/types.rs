use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::{RegistryError, ToolError};

/// Capability family a builder produces tools for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    FileReader,
    FileWriter,
    SymbolSearch,
    ContextOracle,
}

impl ToolCategory {
    pub const ALL: [ToolCategory; 4] = [
        ToolCategory::FileReader,
        ToolCategory::FileWriter,
        ToolCategory::SymbolSearch,
        ToolCategory::ContextOracle,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::FileReader => "file_reader",
            Self::FileWriter => "file_writer",
            Self::SymbolSearch => "symbol_search",
            Self::ContextOracle => "context_oracle",
        }
    }
}

impl fmt::Display for ToolCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolCategory {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| RegistryError::UnknownCategory(s.to_string()))
    }
}

/// Backend family whose tool-description format a tool set is rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    OpenAi,
    Anthropic,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::OpenAi, Platform::Anthropic];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            _ => Err(RegistryError::UnknownPlatform(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
    Number,
    Boolean,
}

impl ParamKind {
    fn json_type(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSpec {
    pub name: String,
    pub kind: ParamKind,
    pub description: String,
    pub required: bool,
}

impl ParameterSpec {
    pub fn required(name: &str, kind: ParamKind, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            description: description.to_string(),
            required: true,
        }
    }

    pub fn optional(name: &str, kind: ParamKind, description: &str) -> Self {
        Self {
            required: false,
            ..Self::required(name, kind, description)
        }
    }
}

/// Ordered list of accepted arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSchema {
    params: Vec<ParameterSpec>,
}

impl ParameterSchema {
    pub fn new(params: Vec<ParameterSpec>) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &[ParameterSpec] {
        &self.params
    }

    pub fn required_names(&self) -> Vec<&str> {
        self.params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect()
    }

    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for p in &self.params {
            properties.insert(
                p.name.clone(),
                json!({ "type": p.kind.json_type(), "description": p.description }),
            );
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": self.required_names(),
        })
    }
}

/// Arguments passed to a tool: a JSON object of strings or numbers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArgs(Map<String, Value>);

impl ToolArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_value(tool: &str, value: Value) -> Result<Self, ToolError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::default()),
            other => Err(ToolError::invalid(
                tool,
                format!("expected a JSON object, got {other}"),
            )),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn require_str(&self, tool: &str, key: &str) -> Result<&str, ToolError> {
        self.get_str(key)
            .ok_or_else(|| ToolError::invalid(tool, format!("missing string argument '{key}'")))
    }

    /// Non-negative integer given either as a number or a numeric string.
    pub fn get_u64(&self, tool: &str, key: &str) -> Result<Option<u64>, ToolError> {
        let Some(value) = self.0.get(key) else {
            return Ok(None);
        };
        let parsed = match value {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse::<u64>().ok(),
            Value::Null => return Ok(None),
            _ => None,
        };
        parsed.map(Some).ok_or_else(|| {
            ToolError::invalid(
                tool,
                format!("argument '{key}' must be a non-negative integer, got {value}"),
            )
        })
    }
}

#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn invoke(&self, args: &ToolArgs) -> Result<String, ToolError>;
}

/// A named, invocable capability.
#[derive(Clone)]
pub struct Tool {
    pub name: String,
    pub description: String,
    pub parameters: ParameterSchema,
    pub handler: Arc<dyn ToolHandler>,
}

impl Tool {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: ParameterSchema,
        handler: Arc<dyn ToolHandler>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            handler,
        }
    }

    pub async fn invoke(&self, args: &ToolArgs) -> Result<String, ToolError> {
        self.handler.invoke(args).await
    }
}

impl fmt::Debug for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// Backend-specific description of a tool, sent with every completion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub platform: Platform,
    pub schema: Value,
}

impl ToolSpec {
    pub fn describe(
        name: &str,
        description: &str,
        parameters: &ParameterSchema,
        platform: Platform,
    ) -> Self {
        Self {
            name: name.to_string(),
            platform,
            schema: render_schema(platform, name, description, parameters.to_json_schema()),
        }
    }

    /// Re-render this description for another platform.
    pub fn to_platform(&self, platform: Platform) -> ToolSpec {
        if self.platform == platform {
            return self.clone();
        }
        let (description, input) = match self.platform {
            Platform::OpenAi => (
                &self.schema["function"]["description"],
                &self.schema["function"]["parameters"],
            ),
            Platform::Anthropic => (&self.schema["description"], &self.schema["input_schema"]),
        };
        Self {
            name: self.name.clone(),
            platform,
            schema: render_schema(
                platform,
                &self.name,
                description.as_str().unwrap_or_default(),
                input.clone(),
            ),
        }
    }
}

fn render_schema(platform: Platform, name: &str, description: &str, input: Value) -> Value {
    match platform {
        Platform::OpenAi => json!({
            "type": "function",
            "function": {
                "name": name,
                "description": description,
                "parameters": input,
            },
        }),
        Platform::Anthropic => json!({
            "name": name,
            "description": description,
            "input_schema": input,
        }),
    }
}

/// A tool paired with its description for one platform. Both share one handler.
#[derive(Debug, Clone)]
pub struct PlatformTool {
    pub tool: Tool,
    pub spec: ToolSpec,
}

impl PlatformTool {
    pub fn adapt(tool: Tool, platform: Platform) -> Self {
        let spec = ToolSpec::describe(&tool.name, &tool.description, &tool.parameters, platform);
        Self { tool, spec }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Echo;

    #[async_trait]
    impl ToolHandler for Echo {
        async fn invoke(&self, args: &ToolArgs) -> Result<String, ToolError> {
            Ok(args.require_str("echo", "text")?.to_string())
        }
    }

    fn echo_tool() -> Tool {
        Tool::new(
            "echo",
            "Echo the text back",
            ParameterSchema::new(vec![
                ParameterSpec::required("text", ParamKind::String, "What to echo"),
                ParameterSpec::optional("times", ParamKind::Integer, "Repeat count"),
            ]),
            Arc::new(Echo),
        )
    }

    #[test]
    fn category_and_platform_names_round_trip() {
        for category in ToolCategory::ALL {
            assert_eq!(category.as_str().parse::<ToolCategory>().unwrap(), category);
        }
        assert_eq!("context-oracle".parse::<ToolCategory>().unwrap(), ToolCategory::ContextOracle);
        assert!(matches!(
            "py_reader".parse::<ToolCategory>(),
            Err(RegistryError::UnknownCategory(_))
        ));
        assert_eq!("OpenAI".parse::<Platform>().unwrap(), Platform::OpenAi);
        assert!("gemini".parse::<Platform>().is_err());
    }

    #[test]
    fn openai_spec_wraps_function() {
        let spec = PlatformTool::adapt(echo_tool(), Platform::OpenAi).spec;
        assert_eq!(
            spec.schema,
            json!({
                "type": "function",
                "function": {
                    "name": "echo",
                    "description": "Echo the text back",
                    "parameters": {
                        "type": "object",
                        "properties": {
                            "text": {"type": "string", "description": "What to echo"},
                            "times": {"type": "integer", "description": "Repeat count"},
                        },
                        "required": ["text"],
                    },
                },
            })
        );
    }

    #[test]
    fn anthropic_spec_uses_input_schema() {
        let spec = PlatformTool::adapt(echo_tool(), Platform::Anthropic).spec;
        assert_eq!(spec.schema["name"], "echo");
        assert_eq!(spec.schema["input_schema"]["required"], json!(["text"]));
    }

    #[test]
    fn specs_convert_between_platforms() {
        let openai = PlatformTool::adapt(echo_tool(), Platform::OpenAi).spec;
        let anthropic = PlatformTool::adapt(echo_tool(), Platform::Anthropic).spec;
        assert_eq!(openai.to_platform(Platform::Anthropic), anthropic);
        assert_eq!(anthropic.to_platform(Platform::OpenAi), openai);
    }

    #[tokio::test]
    async fn adapted_tool_keeps_handler() {
        let adapted = PlatformTool::adapt(echo_tool(), Platform::Anthropic);
        let out = adapted
            .tool
            .invoke(&ToolArgs::new().with("text", "hi"))
            .await
            .unwrap();
        assert_eq!(out, "hi");
    }

    #[test]
    fn numeric_args_accept_numbers_and_strings() {
        let args = ToolArgs::new().with("a", 3).with("b", "7").with("c", "x");
        assert_eq!(args.get_u64("t", "a").unwrap(), Some(3));
        assert_eq!(args.get_u64("t", "b").unwrap(), Some(7));
        assert_eq!(args.get_u64("t", "missing").unwrap(), None);
        assert!(matches!(
            args.get_u64("t", "c"),
            Err(ToolError::InvalidArguments { .. })
        ));
    }

    #[test]
    fn non_object_args_are_rejected() {
        assert!(ToolArgs::from_value("t", json!([1, 2])).is_err());
        assert!(ToolArgs::from_value("t", Value::Null).unwrap().as_map().is_empty());
    }
}
