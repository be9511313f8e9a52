//! HTTP front for the QA bot.
//!
//! - `POST /chat` `{question, history?}` → `{answer}`
//! - `GET /health` → `{status: "ok"}`
//!
//! Errors use the `{success: false, error: {code, message}}` envelope.

mod app_state;
mod error_handler;
mod http;
mod middleware_layer;
mod routes;

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use qabot::Bot;
use tokio::signal;
use tracing::{error, info};

pub use app_state::AppState;
pub use error_handler::{AppError, AppResult};

use crate::middleware_layer::json_extractor::json_error_mapper;
use crate::routes::{chat::chat_route::chat, health_route::health};

pub const DEFAULT_ADDRESS: &str = "0.0.0.0:8080";

/// Builds the application router around a shared bot.
pub fn router(bot: Arc<Bot>) -> Router {
    let state = Arc::new(AppState::new(bot));
    Router::new()
        .route("/chat", post(chat))
        .route("/health", get(health))
        .layer(middleware::from_fn(json_error_mapper))
        .with_state(state)
}

/// Serves on `API_ADDRESS` (default [`DEFAULT_ADDRESS`]) until Ctrl+C.
pub async fn start(bot: Arc<Bot>) -> Result<(), AppError> {
    let addr = std::env::var("API_ADDRESS")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ADDRESS.to_string());
    serve(bot, &addr).await
}

pub async fn serve(bot: Arc<Bot>, addr: &str) -> Result<(), AppError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| AppError::Bind {
            addr: addr.to_string(),
            source,
        })?;
    info!(%addr, "API listening");

    axum::serve(listener, router(bot))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("API stopped");
    Ok(())
}

/// Resolves when Ctrl+C is pressed. If the handler cannot be installed the
/// server keeps running.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
