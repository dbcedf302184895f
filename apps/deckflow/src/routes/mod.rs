pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::deck::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Deck API
        .route("/api/v1/decks/layout", post(handlers::handle_layout))
        .route("/api/v1/decks/generate", post(handlers::handle_generate))
        .with_state(state)
}
