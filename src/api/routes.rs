//! API route definitions

use axum::routing::get;
use axum::Router;

use super::handlers;
use super::server::AppState;

/// Create the API router with all routes
///
/// Domain routers (users, tasks, energy) are mounted by the embedding
/// application; this crate only carries the health endpoint.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health::health_check))
        .with_state(state)
}
