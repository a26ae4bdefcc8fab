//! HTTP API for the fact-checking service.

mod chat;
pub mod types;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::agent::FactChecker;
use crate::config::Config;

/// Application context shared by every handler, built once at startup.
pub struct AppState {
    pub checker: FactChecker,
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(chat::root))
        .route("/health", get(chat::health))
        .route("/api/chat", post(chat::chat))
        .route("/api/chat/stream", post(chat::chat_stream))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server. Runs until the process exits.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let state = Arc::new(AppState {
        checker: FactChecker::new(&config),
    });

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("listening on {}", addr);
    axum::serve(listener, router(state)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn router_builds_with_startup_state() {
        let config = Config::new("openai-key", "tavily-key", "serp-key");
        let state = Arc::new(AppState {
            checker: FactChecker::new(&config),
        });
        let _router = router(state);
    }
}
