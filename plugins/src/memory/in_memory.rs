use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

use taskweave_core::api::{ConversationStore, Turn};

/// Keeps every turn in process, grouped by session.
#[derive(Default)]
pub struct InMemoryConversationStore {
    sessions: Mutex<HashMap<String, Vec<Turn>>>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn turns(&self, session_id: &str) -> Vec<Turn> {
        self.sessions
            .lock()
            .await
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn session_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sessions.lock().await.keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn record_turn(&self, session_id: &str, turn: &Turn) -> Result<()> {
        self.sessions
            .lock()
            .await
            .entry(session_id.to_string())
            .or_default()
            .push(turn.clone());
        Ok(())
    }
}
