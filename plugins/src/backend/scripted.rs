//! Replays completions from a JSONL script instead of calling a model.

use std::collections::VecDeque;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;

use taskweave_core::api::{Completion, CompletionBackend, Message, ToolSpec};

enum Source {
    File(PathBuf),
    Loaded(VecDeque<Completion>),
}

/// One completion per line:
/// `{"text": "...", "tool_call": {"name": "...", "arguments": {...}}}`.
/// Blank lines and lines starting with `#` are skipped.
pub struct ScriptedBackend {
    source: Mutex<Source>,
    served: Mutex<usize>,
}

impl ScriptedBackend {
    /// Reads `path` lazily on the first request.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            source: Mutex::new(Source::File(path.into())),
            served: Mutex::new(0),
        }
    }

    pub fn from_completions(completions: Vec<Completion>) -> Self {
        Self {
            source: Mutex::new(Source::Loaded(completions.into())),
            served: Mutex::new(0),
        }
    }
}

pub fn parse_script(content: &str) -> Result<VecDeque<Completion>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let t = line.trim();
            !t.is_empty() && !t.starts_with('#')
        })
        .map(|(idx, line)| {
            serde_json::from_str::<Completion>(line)
                .with_context(|| format!("invalid completion on script line {}", idx + 1))
        })
        .collect()
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, _history: &[Message], _tools: &[ToolSpec]) -> Result<Completion> {
        let mut source = self.source.lock().await;
        if let Source::File(path) = &*source {
            let content = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read script {}", path.display()))?;
            let completions = parse_script(&content)?;
            tracing::debug!(
                path = %path.display(),
                completions = completions.len(),
                "script loaded"
            );
            *source = Source::Loaded(completions);
        }

        let mut served = self.served.lock().await;
        let Source::Loaded(queue) = &mut *source else {
            return Err(anyhow!("script not loaded"));
        };
        let next = queue
            .pop_front()
            .ok_or_else(|| anyhow!("script exhausted after {} completions", *served))?;
        *served += 1;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn parse_skips_comments_and_reports_bad_lines() {
        let script = "# greeting\n{\"text\":\"hi\"}\n\n{\"tool_call\":{\"name\":\"x\",\"arguments\":{}}}\n";
        let parsed = parse_script(script).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0], Completion::text("hi"));
        assert_eq!(parsed[1].tool_call.as_ref().unwrap().name, "x");

        let err = parse_script("{\"text\":\"ok\"}\nnot json").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[tokio::test]
    async fn replays_file_then_reports_exhaustion() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", json!({"text": "one"})).unwrap();
        writeln!(
            file,
            "{}",
            json!({"tool_call": {"name": "call-termination", "arguments": {"result": "two"}}})
        )
        .unwrap();

        let backend = ScriptedBackend::new(file.path());
        assert_eq!(backend.complete(&[], &[]).await.unwrap().text, "one");
        let second = backend.complete(&[], &[]).await.unwrap();
        assert_eq!(second.tool_call.unwrap().arguments["result"], "two");

        let err = backend.complete(&[], &[]).await.unwrap_err();
        assert!(err.to_string().contains("exhausted after 2"));
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let backend = ScriptedBackend::new("/definitely/not/here.jsonl");
        assert!(backend.complete(&[], &[]).await.is_err());
    }
}
