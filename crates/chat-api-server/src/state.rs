use axum::extract::FromRef;
use chat_cache::Cache;
use std::sync::Arc;

use crate::services::{BotService, ChatService, SuggestionsClient};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<Cache>,
    pub chat_service: Arc<ChatService>,
    pub suggestions: Arc<dyn SuggestionsClient>,
    pub bot_service: Arc<BotService>,
}

impl FromRef<AppState> for Arc<Cache> {
    fn from_ref(state: &AppState) -> Self {
        state.cache.clone()
    }
}

impl FromRef<AppState> for Arc<ChatService> {
    fn from_ref(state: &AppState) -> Self {
        state.chat_service.clone()
    }
}

impl FromRef<AppState> for Arc<dyn SuggestionsClient> {
    fn from_ref(state: &AppState) -> Self {
        state.suggestions.clone()
    }
}

impl FromRef<AppState> for Arc<BotService> {
    fn from_ref(state: &AppState) -> Self {
        state.bot_service.clone()
    }
}
