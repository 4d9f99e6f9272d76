//! API route definitions

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::boundary;
use super::errors;
use super::ingest;
use super::AppState;

/// Build the API router
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Error groups
        .route("/errors", get(errors::list_errors))
        .route("/errors/stats", get(errors::get_stats))
        .route("/errors/clear-resolved", post(errors::clear_resolved))
        .route(
            "/errors/:id",
            get(errors::get_error_detail).delete(errors::delete_error),
        )
        .route("/errors/:id/debug-report", get(errors::get_debug_report))
        .route("/errors/:id/resolve", post(errors::resolve_error))
        .route("/errors/:id/note", post(errors::add_note))

        // Ingest
        .route("/log-error", post(ingest::log_backend_error))
        .route("/log-frontend-error", post(ingest::log_frontend_errors))

        // Health
        .route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            boundary::log_server_failures,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
