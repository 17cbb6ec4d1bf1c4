use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use super::handlers::{handler_404, health, system_stats};
use super::state::AppState;

/// Build the router with routes and middleware wired.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/system_stats", get(system_stats))
        .fallback(handler_404)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
