use axum::{extract::State, Json};
use std::sync::Arc;

use crate::models::chat::{BotReply, BotTurnRequest, ConversationUpdateRequest};
use crate::services::BotService;

pub async fn turn_handler(
    State(bot): State<Arc<BotService>>,
    Json(request): Json<BotTurnRequest>,
) -> Json<BotReply> {
    Json(bot.on_message(request).await)
}

pub async fn conversation_update_handler(
    State(bot): State<Arc<BotService>>,
    Json(request): Json<ConversationUpdateRequest>,
) -> Json<BotReply> {
    Json(bot.on_conversation_started(request).await)
}
