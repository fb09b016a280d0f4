use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::models::chat::SuggestionsQuery;
use crate::models::suggestion::SuggestedAction;
use crate::services::SuggestionsClient;
use crate::utils::error::ApiError;

pub async fn suggestions_handler(
    State(suggestions): State<Arc<dyn SuggestionsClient>>,
    Query(query): Query<SuggestionsQuery>,
) -> Result<Json<Vec<SuggestedAction>>, ApiError> {
    if query.message.trim().is_empty() {
        return Err(ApiError::BadRequest("message cannot be empty".to_string()));
    }

    let actions = suggestions
        .suggest(&query.message)
        .await
        .map_err(|e| ApiError::LlmError(format!("{:#}", e)))?;

    Ok(Json(actions))
}
