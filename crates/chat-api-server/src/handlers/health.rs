use axum::{extract::State, http::StatusCode, Json};
use chat_cache::{Cache, CacheType};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
    cache: CacheType,
}

pub async fn health_check(State(cache): State<Arc<Cache>>) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            cache: cache.kind(),
        }),
    )
}

/// Ready once the cache backend answers
pub async fn readiness_check(State(cache): State<Arc<Cache>>) -> StatusCode {
    match cache.ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            warn!("Readiness check failed: {}", e);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
