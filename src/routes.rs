// routes.rs
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::{
    handlers::{admin_handler, code_link_handler, health_handler, status_handler, vote_handler},
    state::AppState,
};

pub fn create_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(status_handler))
        .route("/vote", post(vote_handler))
        .route("/admin", get(admin_handler))
        .route("/healthz", get(health_handler))
        .route("/{code}", get(code_link_handler))
        .with_state(state)
}
