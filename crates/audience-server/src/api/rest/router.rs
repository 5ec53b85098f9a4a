//! REST API router

use super::handlers::*;
use super::types::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Create REST API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/catalog", get(get_catalog))
        .route("/v1/segments/validate", post(validate_segment))
        .route("/v1/segments/evaluate", post(evaluate_segment))
        .route("/v1/triggers/evaluate", post(evaluate_triggers))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
