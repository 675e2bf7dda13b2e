//! OpenAI-compatible chat completions with function tools.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

use taskweave_core::api::{
    Completion, CompletionBackend, Message, Platform, Role, ToolCall, ToolSpec,
};

use super::http_client::{api_key_from_env, AuthStyle, HttpClient};

pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";

pub struct OpenAiBackend {
    client: HttpClient,
    url: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiBackend {
    pub fn new(
        base_url: &str,
        api_key: String,
        model: String,
        timeout_ms: u64,
        max_tokens: u32,
    ) -> Result<Self> {
        let base = if base_url.trim().is_empty() {
            DEFAULT_OPENAI_URL
        } else {
            base_url.trim()
        };
        Ok(Self {
            client: HttpClient::new(api_key, AuthStyle::Bearer, timeout_ms)?,
            url: format!("{}/chat/completions", base.trim_end_matches('/')),
            model,
            max_tokens,
        })
    }

    pub fn from_env(
        base_url: &str,
        api_key_env: &str,
        model: String,
        timeout_ms: u64,
        max_tokens: u32,
    ) -> Result<Self> {
        let var = if api_key_env.trim().is_empty() {
            "OPENAI_API_KEY"
        } else {
            api_key_env
        };
        Self::new(base_url, api_key_from_env(var), model, timeout_ms, max_tokens)
    }

    fn request_body(&self, history: &[Message], tools: &[ToolSpec]) -> Value {
        let mut body = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": history.iter().map(message_to_json).collect::<Vec<_>>(),
        });
        if !tools.is_empty() {
            body["tools"] = tools
                .iter()
                .map(|t| t.to_platform(Platform::OpenAi).schema)
                .collect();
        }
        body
    }
}

fn message_to_json(m: &Message) -> Value {
    match m.role {
        Role::System => json!({ "role": "system", "content": m.content }),
        Role::User => json!({ "role": "user", "content": m.content }),
        Role::Tool => json!({
            "role": "tool",
            "tool_call_id": m.tool_call_id.clone().unwrap_or_default(),
            "content": m.content,
        }),
        Role::Assistant => match &m.tool_call {
            Some(call) => json!({
                "role": "assistant",
                "content": (!m.content.is_empty()).then(|| m.content.clone()),
                "tool_calls": [{
                    "id": call.id,
                    "type": "function",
                    "function": {
                        "name": call.name,
                        "arguments": call.arguments.to_string(),
                    },
                }],
            }),
            None => json!({ "role": "assistant", "content": m.content }),
        },
    }
}

fn parse_completion(v: &Value) -> Result<Completion> {
    let message = v["choices"]
        .get(0)
        .map(|c| &c["message"])
        .ok_or_else(|| anyhow!("response has no choices"))?;

    let text = message["content"].as_str().unwrap_or_default().to_string();
    let tool_call = message["tool_calls"].get(0).map(|tc| {
        let raw = tc["function"]["arguments"].as_str().unwrap_or("{}");
        ToolCall {
            id: tc["id"].as_str().unwrap_or_default().to_string(),
            name: tc["function"]["name"].as_str().unwrap_or_default().to_string(),
            // non-JSON arguments are surfaced as-is and rejected by the tool
            arguments: serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string())),
        }
    });
    Ok(Completion { text, tool_call })
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, history: &[Message], tools: &[ToolSpec]) -> Result<Completion> {
        let body = self.request_body(history, tools);
        let v = self.client.post_json(&self.url, &body).await?;
        parse_completion(&v)
    }
}
