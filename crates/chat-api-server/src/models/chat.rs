use serde::{Deserialize, Serialize};

use super::suggestion::SuggestedAction;

// ===== CONVERSATION ENTITY =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Assistant,
}

/// One turn in a conversation. Role and content are fixed once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    role: Role,
    content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Chat history for one conversation id, oldest message first.
///
/// Only `ConversationRepository` appends to `messages`, which is how the
/// history bound is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    id: String,
    #[serde(default)]
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            messages: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub(crate) fn messages_mut(&mut self) -> &mut Vec<Message> {
        &mut self.messages
    }
}

// ===== REQUEST MODELS =====

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartConversationQuery {
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageRequest {
    pub message: String,
    pub conversation_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SuggestionsQuery {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub content_type: String,
    #[serde(default)]
    pub content_url: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Message activity forwarded by the bot channel
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotTurnRequest {
    #[serde(default)]
    pub text: String,
    pub conversation_id: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// Conversation-update activity (a user joined the conversation)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationUpdateRequest {
    pub conversation_id: String,
    #[serde(default)]
    pub locale: Option<String>,
}

// ===== RESPONSE MODELS =====

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageResponse {
    pub message: String,
    pub conversation_id: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BotReply {
    pub text: String,
    pub conversation_id: String,
    pub suggested_actions: Vec<SuggestedAction>,
}
