pub mod chat;
pub mod suggestion;

pub use chat::{Conversation, Message, Role};
pub use suggestion::{ActionType, SuggestedAction};
