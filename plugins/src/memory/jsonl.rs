//! Append-only JSONL conversation log.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use taskweave_core::api::{ConversationStore, Turn};

/// One JSON object per recorded turn: `{"session_id", "ts", "turn"}`.
pub struct JsonlConversationStore {
    path: PathBuf,
    // Serializes appends so concurrent agents never interleave lines.
    lock: Mutex<()>,
}

impl JsonlConversationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl ConversationStore for JsonlConversationStore {
    async fn record_turn(&self, session_id: &str, turn: &Turn) -> Result<()> {
        let mut line = serde_json::to_string(&json!({
            "session_id": session_id,
            "ts": Utc::now().to_rfc3339(),
            "turn": turn,
        }))?;
        line.push('\n');

        let _guard = self.lock.lock().await;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("failed to open {}", self.path.display()))?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use taskweave_core::api::Message;

    #[tokio::test]
    async fn appends_one_line_per_turn() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlConversationStore::new(dir.path().join("logs/conv.jsonl"));

        for index in 0..2 {
            let turn = Turn {
                index,
                response: Message::assistant(format!("reply {index}"), None),
                follow_up: Some(Message::user("continue")),
            };
            store.record_turn("s-1", &turn).await.unwrap();
        }

        let content = tokio::fs::read_to_string(store.path()).await.unwrap();
        let lines: Vec<Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["session_id"], "s-1");
        assert_eq!(lines[1]["turn"]["index"], 1);
        assert_eq!(lines[1]["turn"]["response"]["content"], "reply 1");
    }
}
