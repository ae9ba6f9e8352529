//! HTTP layer for mongochat
//!
//! Endpoints:
//! - `POST /api/chat` runs one chat turn (JSON or NDJSON streaming)
//! - `GET  /health` is a liveness probe

pub mod chat;
pub mod error;
pub mod health;
pub mod state;

use axum::Router;
use axum::routing::{get, post};

pub use error::ApiError;
pub use state::AppState;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(chat::chat))
        .route("/health", get(health::health))
        .with_state(state)
}
