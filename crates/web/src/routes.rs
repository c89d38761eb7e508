//! Router setup with all routes and middleware.

use axum::routing::{get, post};
use axum::Router;
use docchat_core::{AppError, AppResult};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/chat", post(handlers::chat))
        .route("/mode", post(handlers::set_mode))
        .route("/api/chat", post(handlers::api_chat))
        .route("/api/history", get(handlers::api_history))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve the chat UI until the process stops.
pub async fn start_server(addr: &str, state: AppState) -> AppResult<()> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Other(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Serving chat UI on http://{}", addr);

    axum::serve(listener, router)
        .await
        .map_err(|e| AppError::Other(format!("Server error: {}", e)))?;

    Ok(())
}
