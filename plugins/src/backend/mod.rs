pub mod anthropic;
pub mod http_client;
pub mod openai;
pub mod scripted;

pub use anthropic::AnthropicBackend;
pub use http_client::BackendHttpError;
pub use openai::OpenAiBackend;
pub use scripted::ScriptedBackend;
