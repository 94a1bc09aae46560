pub mod health;

use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::errors::AppError;
use crate::layout::handlers;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {uri}"))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Layout API
        .route("/api/v1/layout/config", get(handlers::handle_get_config))
        .route("/api/v1/layout/panel", post(handlers::handle_compose_panel))
        .route(
            "/api/v1/layout/descriptors",
            post(handlers::handle_normalize_descriptors),
        )
        .fallback(not_found)
        .with_state(state)
}
