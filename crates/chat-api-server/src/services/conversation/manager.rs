use anyhow::Result;
use async_trait::async_trait;
use chat_cache::CacheError;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::chat::{Conversation, Message};

use super::repository::ConversationRepository;

/// Language-model collaborator used by the chat flow
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Short self-introduction in the language of `locale`.
    async fn greet(&self, locale: &str) -> Result<String>;

    /// Answer `user_input` given the earlier turns, oldest first.
    async fn reply(&self, history: &[Message], user_input: &str) -> Result<String>;
}

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("Model call failed: {0:#}")]
    Model(anyhow::Error),
}

pub struct ChatService {
    repository: ConversationRepository,
    model: Arc<dyn ChatModel>,
    default_locale: String,
}

impl ChatService {
    pub fn new(
        repository: ConversationRepository,
        model: Arc<dyn ChatModel>,
        default_locale: String,
    ) -> Self {
        Self {
            repository,
            model,
            default_locale,
        }
    }

    pub fn repository(&self) -> &ConversationRepository {
        &self.repository
    }

    /// Start (or restart) a conversation with a greeting from the model.
    ///
    /// A blank or missing id gets a fresh UUID. The greeting is fetched
    /// before anything is removed, so a model failure keeps the old state.
    pub async fn start_conversation(
        &self,
        conversation_id: Option<&str>,
        locale: Option<&str>,
    ) -> Result<Conversation, ChatError> {
        let id = match conversation_id {
            Some(id) if !id.trim().is_empty() => id.to_string(),
            _ => uuid::Uuid::new_v4().to_string(),
        };
        let locale = match locale.map(str::trim) {
            Some(locale) if !locale.is_empty() => locale,
            _ => self.default_locale.as_str(),
        };

        info!("Starting conversation {} (locale={})", id, locale);

        let greeting = self.model.greet(locale).await.map_err(ChatError::Model)?;
        let conversation = self.repository.start(&id, greeting).await?;

        Ok(conversation)
    }

    /// Run one chat turn and return the model's answer.
    pub async fn get_reply(
        &self,
        user_input: &str,
        conversation_id: &str,
    ) -> Result<String, ChatError> {
        if user_input.trim().is_empty() {
            return Err(ChatError::InvalidArgument(
                "message cannot be empty".to_string(),
            ));
        }
        if conversation_id.trim().is_empty() {
            return Err(ChatError::InvalidArgument(
                "conversationId cannot be empty".to_string(),
            ));
        }

        let mut conversation = match self.repository.load(conversation_id).await {
            Ok(Some(conversation)) => conversation,
            Ok(None) => {
                debug!("Conversation {} not found, starting empty", conversation_id);
                Conversation::new(conversation_id)
            }
            Err(e) if e.is_unreadable_entry() => {
                warn!(
                    "Stored conversation {} is unreadable, starting empty: {}",
                    conversation_id, e
                );
                Conversation::new(conversation_id)
            }
            Err(e) => return Err(e.into()),
        };

        self.repository
            .append_and_bound(&mut conversation, Message::user(user_input));

        let messages = conversation.messages();
        let history = &messages[..messages.len() - 1];

        debug!(
            "Requesting reply for {} with {} prior messages",
            conversation_id,
            history.len()
        );

        let reply = self
            .model
            .reply(history, user_input)
            .await
            .map_err(ChatError::Model)?;

        self.repository
            .append_and_bound(&mut conversation, Message::assistant(reply.clone()));
        self.repository.save(&conversation).await?;

        Ok(reply)
    }
}
