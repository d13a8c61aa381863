pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::matching::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Jobs API
        .route("/api/v1/jobs/search", post(handlers::handle_search))
        .route("/api/v1/jobs/rank", post(handlers::handle_rank))
        .route("/api/v1/jobs/export", post(handlers::handle_export))
        // Skills API
        .route("/api/v1/skills/extract", post(handlers::handle_extract))
        .route("/api/v1/skills/analyze", post(handlers::handle_analyze))
        .with_state(state)
}
