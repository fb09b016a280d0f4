pub mod bot;
pub mod conversation;
pub mod llm_service;
pub mod suggestions;

pub use bot::BotService;
pub use conversation::{ChatService, ConversationRepository};
pub use llm_service::LlmService;
pub use suggestions::{LlmSuggestionsClient, SuggestionsClient};
