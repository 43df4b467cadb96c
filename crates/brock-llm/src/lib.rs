pub mod types;
pub mod traits;
pub mod streaming;
pub mod buffer_utils;
pub mod openai;
pub mod config;

#[cfg(feature = "testing")]
pub mod testing;

pub use traits::{ChatClient, ChatRequest, ChatResponse, ChatOptions, EventStream, TokenUsage};

pub use streaming::StreamEvent;
pub use buffer_utils::CircularLineBuffer;
pub use openai::OpenAIClient;
pub use config::{ClientFactory, ProviderConfig};
pub use types::{Message, Content, Tool, ToolCall, ToolChoice, FunctionCall, FunctionDefinition};
