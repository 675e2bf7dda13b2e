//! Anthropic messages API with `tool_use` blocks.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

use taskweave_core::api::{
    Completion, CompletionBackend, Message, Platform, Role, ToolCall, ToolSpec,
};

use super::http_client::{api_key_from_env, AuthStyle, HttpClient};

pub const DEFAULT_ANTHROPIC_URL: &str = "https://api.anthropic.com/v1";

pub struct AnthropicBackend {
    client: HttpClient,
    url: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicBackend {
    pub fn new(
        base_url: &str,
        api_key: String,
        model: String,
        timeout_ms: u64,
        max_tokens: u32,
    ) -> Result<Self> {
        let base = if base_url.trim().is_empty() {
            DEFAULT_ANTHROPIC_URL
        } else {
            base_url.trim()
        };
        Ok(Self {
            client: HttpClient::new(api_key, AuthStyle::AnthropicKey, timeout_ms)?,
            url: format!("{}/messages", base.trim_end_matches('/')),
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
            "ANTHROPIC_API_KEY"
        } else {
            api_key_env
        };
        Self::new(base_url, api_key_from_env(var), model, timeout_ms, max_tokens)
    }

    fn request_body(&self, history: &[Message], tools: &[ToolSpec]) -> Value {
        let system_text = history
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let messages: Vec<Value> = history
            .iter()
            .filter(|m| m.role != Role::System)
            .map(message_to_json)
            .collect();

        let mut body = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": messages,
        });
        if !system_text.is_empty() {
            body["system"] = json!(system_text);
        }
        if !tools.is_empty() {
            body["tools"] = tools
                .iter()
                .map(|t| t.to_platform(Platform::Anthropic).schema)
                .collect();
        }
        body
    }
}

fn message_to_json(m: &Message) -> Value {
    match m.role {
        Role::Assistant => {
            let mut blocks = Vec::new();
            if !m.content.is_empty() {
                blocks.push(json!({ "type": "text", "text": m.content }));
            }
            if let Some(call) = &m.tool_call {
                let input = if call.arguments.is_object() {
                    call.arguments.clone()
                } else {
                    json!({})
                };
                blocks.push(json!({
                    "type": "tool_use",
                    "id": call.id,
                    "name": call.name,
                    "input": input,
                }));
            }
            json!({ "role": "assistant", "content": blocks })
        }
        Role::Tool => json!({
            "role": "user",
            "content": [{
                "type": "tool_result",
                "tool_use_id": m.tool_call_id.clone().unwrap_or_default(),
                "content": m.content,
            }],
        }),
        Role::User | Role::System => json!({ "role": "user", "content": m.content }),
    }
}

fn parse_completion(v: &Value) -> Completion {
    let mut text = String::new();
    let mut tool_call = None;
    for block in v["content"].as_array().into_iter().flatten() {
        match block["type"].as_str() {
            Some("text") => text.push_str(block["text"].as_str().unwrap_or_default()),
            Some("tool_use") if tool_call.is_none() => {
                tool_call = Some(ToolCall {
                    id: block["id"].as_str().unwrap_or_default().to_string(),
                    name: block["name"].as_str().unwrap_or_default().to_string(),
                    arguments: block["input"].clone(),
                });
            }
            _ => {}
        }
    }
    Completion { text, tool_call }
}

#[async_trait]
impl CompletionBackend for AnthropicBackend {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, history: &[Message], tools: &[ToolSpec]) -> Result<Completion> {
        let body = self.request_body(history, tools);
        let v = self.client.post_json(&self.url, &body).await?;
        Ok(parse_completion(&v))
    }
}
