//! Axum router construction for the replay API.
//!
//! Assembles all routes into a single [`Router`] with CORS middleware
//! enabled for cross-origin dashboard access.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router for the replay server.
///
/// The router includes:
/// - `GET /api/health` -- liveness and storage root availability
/// - `GET /api/replays/{id}` -- paginated replay
/// - `GET /api/simulations/{id}/state` -- latest single-frame state
///
/// The dashboard requests paths with a trailing slash, so each id route is
/// also mounted with one.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/replays/{id}", get(handlers::get_replay))
        .route("/api/replays/{id}/", get(handlers::get_replay))
        .route("/api/simulations/{id}/state", get(handlers::get_current_state))
        .route("/api/simulations/{id}/state/", get(handlers::get_current_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
