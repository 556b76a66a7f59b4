use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

// API Routes - REST API for programmatic access
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new().nest(
        "/api",
        Router::new()
            // Analysis pipeline
            .route("/analyze", post(handlers::api::analyze))

            // Dataset inspection and editing
            .route("/data", get(handlers::api::list_data))
            .route(
                "/data/{key}",
                get(handlers::api::get_data)
                    .put(handlers::api::replace_data)
                    .post(handlers::api::upsert_data)
                    .delete(handlers::api::delete_data),
            )

            // Schema used for prompt construction
            .route("/schema", get(handlers::api::get_schema))

            // System status
            .route("/health", get(handlers::api::health)),
    )
}
