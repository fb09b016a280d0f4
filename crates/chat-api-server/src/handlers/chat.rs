use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;
use tracing::info;

use crate::models::chat::{ChatMessageRequest, ChatMessageResponse, StartConversationQuery};
use crate::services::ChatService;
use crate::utils::error::ApiError;

/// `GET /start`: greet and (re)start a conversation
pub async fn start_handler(
    State(chat_service): State<Arc<ChatService>>,
    Query(query): Query<StartConversationQuery>,
) -> Result<Json<ChatMessageResponse>, ApiError> {
    let conversation = chat_service
        .start_conversation(query.conversation_id.as_deref(), query.locale.as_deref())
        .await?;

    let greeting = conversation
        .messages()
        .last()
        .map(|m| m.content().to_string())
        .ok_or_else(|| ApiError::InternalError("Conversation started without a greeting".into()))?;

    Ok(Json(ChatMessageResponse {
        message: greeting,
        conversation_id: conversation.id().to_string(),
    }))
}

/// `POST /chat`: one chat turn
pub async fn chat_handler(
    State(chat_service): State<Arc<ChatService>>,
    Json(request): Json<ChatMessageRequest>,
) -> Result<Json<ChatMessageResponse>, ApiError> {
    info!(
        "Chat request: conversation={}, message_len={}",
        request.conversation_id,
        request.message.len()
    );

    let reply = chat_service
        .get_reply(&request.message, &request.conversation_id)
        .await?;

    Ok(Json(ChatMessageResponse {
        message: reply,
        conversation_id: request.conversation_id,
    }))
}
