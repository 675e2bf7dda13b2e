pub mod in_memory;
pub mod jsonl;

pub use in_memory::InMemoryConversationStore;
pub use jsonl::JsonlConversationStore;
