use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chat_cache::CacheError;
use serde::Serialize;
use thiserror::Error;

use crate::services::conversation::ChatError;

/// Body sent for every server-side failure; details stay in the logs.
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error happened. Try again later.";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::BadRequest(msg) => {
                tracing::warn!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, "BadRequest", msg)
            }
            ApiError::Cache(err) => {
                tracing::error!("Cache error: {}", err);
                let status = match err {
                    CacheError::BackendUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, "CacheError", GENERIC_ERROR_MESSAGE.to_string())
            }
            ApiError::LlmError(msg) => {
                tracing::error!("LLM error: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "LlmError",
                    GENERIC_ERROR_MESSAGE.to_string(),
                )
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "InternalError",
                    GENERIC_ERROR_MESSAGE.to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::InvalidArgument(msg) => ApiError::BadRequest(msg),
            ChatError::Cache(e) => ApiError::Cache(e),
            ChatError::Model(e) => ApiError::LlmError(format!("{:#}", e)),
        }
    }
}
