//! JSON-over-HTTP plumbing shared by the model backends.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

const BODY_PREVIEW_LIMIT: usize = 512;

/// A failed completion request.
#[derive(Debug, Error)]
pub enum BackendHttpError {
    #[error("completion request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("model API at {url} answered {status}: {message}")]
    Status {
        url: String,
        status: u16,
        message: String,
    },

    #[error("model API at {url} sent an undecodable completion: {source} | body={body}")]
    Decode {
        url: String,
        body: String,
        #[source]
        source: serde_json::Error,
    },
}

impl BackendHttpError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            Self::Status { status, .. } => Some(*status),
            Self::Decode { .. } => None,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Self::Transport { url, .. } | Self::Status { url, .. } | Self::Decode { url, .. } => {
                url
            }
        }
    }

    /// Rate limits, overloads, timeouts and refused connections; worth another attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport { source, .. } => source.is_timeout() || source.is_connect(),
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Decode { .. } => false,
        }
    }
}

pub(crate) fn preview_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    let mut out: String = trimmed.chars().take(BODY_PREVIEW_LIMIT).collect();
    if trimmed.chars().count() > BODY_PREVIEW_LIMIT {
        out.push_str("...");
    }
    out
}

/// Both providers wrap failures as `{"error": {"message": ..}}`; fall back to the raw body.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| preview_body(body))
}

async fn parse_json_response(
    url: &str,
    resp: reqwest::Response,
) -> Result<Value, BackendHttpError> {
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|source| BackendHttpError::Transport {
            url: url.to_string(),
            source,
        })?;

    if !status.is_success() {
        return Err(BackendHttpError::Status {
            url: url.to_string(),
            status: status.as_u16(),
            message: api_error_message(&body),
        });
    }

    serde_json::from_str::<Value>(&body).map_err(|source| BackendHttpError::Decode {
        url: url.to_string(),
        body: preview_body(&body),
        source,
    })
}

/// How the API key travels with each request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStyle {
    /// `Authorization: Bearer <key>`
    Bearer,
    /// `x-api-key: <key>` plus the pinned `anthropic-version`.
    AnthropicKey,
}

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Clone)]
pub struct HttpClient {
    api_key: String,
    auth: AuthStyle,
    http: reqwest::Client,
}

impl HttpClient {
    pub fn new(api_key: String, auth: AuthStyle, timeout_ms: u64) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;
        Ok(Self {
            api_key,
            auth,
            http,
        })
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth {
            AuthStyle::Bearer if self.api_key.trim().is_empty() => req,
            AuthStyle::Bearer => req.bearer_auth(&self.api_key),
            AuthStyle::AnthropicKey => {
                let req = req.header("anthropic-version", ANTHROPIC_VERSION);
                if self.api_key.trim().is_empty() {
                    req
                } else {
                    req.header("x-api-key", &self.api_key)
                }
            }
        }
    }

    pub async fn post_json(&self, url: &str, body: &Value) -> Result<Value, BackendHttpError> {
        tracing::debug!(
            target: "taskweave.backend",
            stage = "backend.http.in",
            url = %url
        );
        let req = self.http.post(url).json(body);
        let result = match self.auth(req).send().await {
            Ok(resp) => parse_json_response(url, resp).await,
            Err(source) => Err(BackendHttpError::Transport {
                url: url.to_string(),
                source,
            }),
        };
        match &result {
            Ok(_) => tracing::debug!(
                target: "taskweave.backend",
                stage = "backend.http.out",
                url = %url
            ),
            Err(err) => tracing::warn!(
                target: "taskweave.backend",
                url = %url,
                status = ?err.status(),
                transient = err.is_transient(),
                error = %err,
                "completion request failed"
            ),
        }
        result
    }
}

/// Resolve the API key from the named environment variable. Empty name means none.
pub fn api_key_from_env(var: &str) -> String {
    if var.trim().is_empty() {
        return String::new();
    }
    std::env::var(var).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[test]
    fn test_preview_body_empty() {
        assert_eq!(preview_body("   "), "<empty body>");
    }

    #[test]
    fn test_preview_body_truncates() {
        let body = "a".repeat(BODY_PREVIEW_LIMIT + 10);
        let preview = preview_body(&body);
        assert!(preview.ends_with("..."));
        assert_eq!(preview.len(), BODY_PREVIEW_LIMIT + 3);
    }

    #[test]
    fn api_error_message_prefers_the_provider_message() {
        let body = r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#;
        assert_eq!(api_error_message(body), "Overloaded");
        assert_eq!(api_error_message("bad gateway"), "bad gateway");
    }

    #[test]
    fn status_errors_classify_retries() {
        let status = |status| BackendHttpError::Status {
            url: "https://example.com/v1/messages".to_string(),
            status,
            message: "nope".to_string(),
        };
        assert!(status(429).is_transient());
        assert!(status(529).is_transient());
        assert!(!status(401).is_transient());

        let msg = status(429).to_string();
        assert!(msg.contains("answered 429"));
        assert!(msg.contains("https://example.com/v1/messages"));
    }

    #[tokio::test]
    async fn test_bearer_auth_header() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/chat")
            .match_header("authorization", "Bearer secret-token")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let client = HttpClient::new("secret-token".into(), AuthStyle::Bearer, 1_000).unwrap();
        let url = format!("{}/chat", server.url());
        assert_eq!(client.post_json(&url, &json!({})).await.unwrap(), json!({}));
    }

    #[tokio::test]
    async fn test_anthropic_headers() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/messages")
            .match_header("x-api-key", "k")
            .match_header("anthropic-version", ANTHROPIC_VERSION)
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let client = HttpClient::new("k".into(), AuthStyle::AnthropicKey, 1_000).unwrap();
        let url = format!("{}/messages", server.url());
        client.post_json(&url, &json!({})).await.unwrap();
    }

    #[tokio::test]
    async fn test_rate_limit_is_a_transient_status_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/chat")
            .with_status(429)
            .with_body(r#"{"error":{"message":"Rate limit reached"}}"#)
            .create_async()
            .await;

        let client = HttpClient::new(String::new(), AuthStyle::Bearer, 1_000).unwrap();
        let url = format!("{}/chat", server.url());
        let err = client.post_json(&url, &json!({})).await.unwrap_err();
        assert_eq!(err.status(), Some(429));
        assert!(err.is_transient());
        assert!(err.url().ends_with("/chat"));
        assert!(matches!(
            err,
            BackendHttpError::Status { ref message, .. } if message == "Rate limit reached"
        ));
    }

    #[tokio::test]
    async fn test_decode_error_is_typed() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/chat")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = HttpClient::new(String::new(), AuthStyle::Bearer, 1_000).unwrap();
        let url = format!("{}/chat", server.url());
        let err = client.post_json(&url, &json!({})).await.unwrap_err();
        assert!(matches!(err, BackendHttpError::Decode { ref body, .. } if body == "not json"));
        assert!(!err.is_transient());
    }
}
