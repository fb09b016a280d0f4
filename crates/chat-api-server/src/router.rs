use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let health_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/health/ready", get(handlers::health::readiness_check));

    let chat_routes = Router::new()
        .route("/start", get(handlers::chat::start_handler))
        .route("/chat", post(handlers::chat::chat_handler))
        .route("/suggestions", get(handlers::suggestions::suggestions_handler));

    let bot_routes = Router::new()
        .route("/bot/turn", post(handlers::bot::turn_handler))
        .route(
            "/bot/conversation-update",
            post(handlers::bot::conversation_update_handler),
        );

    Router::new()
        .merge(health_routes)
        .merge(chat_routes)
        .merge(bot_routes)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
}
