use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use tower_http::cors::CorsLayer;
use crate::app_state::AppState;

/// Build the main application router
pub fn app_router() -> Router<AppState> {
    let api_v1 = Router::new()
        .nest("/audit", crate::api::routes::audit_routes::audit_routes());

    Router::new()
        // Root route
        .route("/", get(root))
        // Health check
        .route("/health", get(health_check))
        // API v1
        .nest("/api/v1", api_v1)

        // Fallback handler for 404
        .fallback(handler_404)
        .layer(CorsLayer::very_permissive())
}

// Handler for root
async fn root() -> &'static str {
    "Connection audit is running!"
}

// Handler for health check
async fn health_check() -> &'static str {
    "OK"
}

// Handler for 404 Not Found
async fn handler_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        "The requested resource was not found",
    )
}
