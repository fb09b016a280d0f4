use std::sync::Arc;
use tracing::{error, info, warn};

use crate::models::chat::{BotReply, BotTurnRequest, ConversationUpdateRequest};
use crate::services::conversation::ChatService;
use crate::services::suggestions::SuggestionsClient;

pub const APOLOGY_MESSAGE: &str = "Something went wrong, please try again later.";
pub const ATTACHMENTS_NOT_SUPPORTED: &str = "Sorry, attachments aren't supported at the moment.";

/// Bot-channel turn handling. Never fails: every error becomes a reply.
pub struct BotService {
    chat: Arc<ChatService>,
    suggestions: Arc<dyn SuggestionsClient>,
}

impl BotService {
    pub fn new(chat: Arc<ChatService>, suggestions: Arc<dyn SuggestionsClient>) -> Self {
        Self { chat, suggestions }
    }

    pub async fn on_message(&self, request: BotTurnRequest) -> BotReply {
        let conversation_id = request.conversation_id;

        if !request.attachments.is_empty() {
            info!(
                "Conversation {} sent {} attachment(s)",
                conversation_id,
                request.attachments.len()
            );
            return reply(ATTACHMENTS_NOT_SUPPORTED.to_string(), conversation_id);
        }

        let text = match self.chat.get_reply(&request.text, &conversation_id).await {
            Ok(text) if text.trim().is_empty() => {
                warn!("Model returned a blank reply for conversation {}", conversation_id);
                return reply(APOLOGY_MESSAGE.to_string(), conversation_id);
            }
            Ok(text) => text,
            Err(e) => {
                error!("Turn failed for conversation {}: {}", conversation_id, e);
                return reply(APOLOGY_MESSAGE.to_string(), conversation_id);
            }
        };

        let suggested_actions = match self.suggestions.suggest(&text).await {
            Ok(actions) => actions,
            Err(e) => {
                warn!("Suggestions failed for conversation {}: {:#}", conversation_id, e);
                Vec::new()
            }
        };

        BotReply {
            text,
            conversation_id,
            suggested_actions,
        }
    }

    /// A member joined: greet them and (re)start the conversation.
    pub async fn on_conversation_started(&self, request: ConversationUpdateRequest) -> BotReply {
        let result = self
            .chat
            .start_conversation(Some(&request.conversation_id), request.locale.as_deref())
            .await;

        match result {
            Ok(conversation) => {
                let greeting = conversation
                    .messages()
                    .last()
                    .map(|m| m.content().to_string())
                    .unwrap_or_default();
                reply(greeting, conversation.id().to_string())
            }
            Err(e) => {
                error!(
                    "Could not start conversation {}: {}",
                    request.conversation_id, e
                );
                reply(APOLOGY_MESSAGE.to_string(), request.conversation_id)
            }
        }
    }
}

fn reply(text: String, conversation_id: String) -> BotReply {
    BotReply {
        text,
        conversation_id,
        suggested_actions: Vec::new(),
    }
}
