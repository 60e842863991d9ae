pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::chat::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/query", post(handlers::handle_query))
        .route("/agent-query", post(handlers::handle_agent_query))
        .with_state(state)
}
