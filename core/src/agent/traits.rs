use anyhow::Result;
use async_trait::async_trait;

use super::types::{Completion, Message, Turn};
use crate::tool::ToolSpec;

/// Generates the next response from the conversation so far.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    fn name(&self) -> &str;

    async fn complete(&self, history: &[Message], tools: &[ToolSpec]) -> Result<Completion>;
}

/// Side channel receiving every turn of a conversation.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn record_turn(&self, session_id: &str, turn: &Turn) -> Result<()>;
}
