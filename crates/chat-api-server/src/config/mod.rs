pub mod settings;

pub use settings::{ChatConfig, LlmConfig, PromptsConfig, ServerConfig, Settings};
