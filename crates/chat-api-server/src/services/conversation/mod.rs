pub mod manager;
pub mod repository;

pub use manager::{ChatError, ChatModel, ChatService};
pub use repository::ConversationRepository;
