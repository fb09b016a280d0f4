use anyhow::Result;
use chat_cache::Cache;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use chat_api_server::config::Settings;
use chat_api_server::services::{
    BotService, ChatService, ConversationRepository, LlmService, LlmSuggestionsClient,
    SuggestionsClient,
};
use chat_api_server::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,chat_api_server=debug,chat_cache=debug".to_string()),
        )
        .with_target(true)
        .with_thread_ids(true)
        .json()
        .init();

    info!("🚀 Starting Chat API Server...");

    let settings = Settings::load()?;
    info!("✅ Configuration loaded");

    let cache = Arc::new(Cache::from_options(&settings.cache).await?);
    info!("✅ Cache backend ready ({:?})", cache.kind());

    let llm_service = Arc::new(LlmService::new(settings.llm.clone(), &settings.prompts)?);

    let repository = ConversationRepository::new(cache.clone(), settings.chat.max_saved_messages);
    let chat_service = Arc::new(ChatService::new(
        repository,
        llm_service.clone(),
        settings.chat.default_locale.clone(),
    ));

    let suggestions: Arc<dyn SuggestionsClient> = Arc::new(LlmSuggestionsClient::new(
        llm_service,
        settings.prompts.suggestions_system_prompt.clone(),
    ));

    let bot_service = Arc::new(BotService::new(chat_service.clone(), suggestions.clone()));

    let app = build_router(AppState {
        cache,
        chat_service,
        suggestions,
        bot_service,
    });

    let addr = SocketAddr::from((
        settings.server.host.parse::<std::net::IpAddr>()?,
        settings.server.port,
    ));

    info!("🎯 Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
