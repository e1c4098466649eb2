//! REST API endpoint handlers for the replay server.
//!
//! Storage reads are blocking filesystem work, so each handler moves it
//! onto the blocking pool via [`tokio::task::spawn_blocking`].
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/health` | Liveness and storage root availability |
//! | `GET` | `/api/replays/{id}` | Paginated replay |
//! | `GET` | `/api/simulations/{id}/state` | Latest single-frame state |

use std::path::Path as FsPath;
use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use chrono::{DateTime, Utc};
use reverie_replay::ReplayRequest;
use reverie_types::{CurrentState, Replay, SimId};
use serde::Serialize;

use crate::error::ObserverError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /api/health
// ---------------------------------------------------------------------------

/// One configured storage root and whether it is currently present.
#[derive(Debug, Clone, Serialize)]
pub struct StorageRootStatus {
    /// The configured path.
    pub path: String,
    /// Whether the path is an existing directory.
    pub available: bool,
}

impl StorageRootStatus {
    fn probe(path: &FsPath) -> Self {
        Self {
            path: path.display().to_string(),
            available: path.is_dir(),
        }
    }
}

/// Body of the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// Always `true` when this handler answers.
    pub env_server: bool,
    /// Archive storage root.
    pub archive_root: StorageRootStatus,
    /// Live storage root.
    pub live_root: StorageRootStatus,
    /// Time of the check.
    pub timestamp: DateTime<Utc>,
}

/// Report liveness and whether the storage roots exist.
pub async fn health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HealthStatus>, ObserverError> {
    let status = tokio::task::spawn_blocking(move || HealthStatus {
        env_server: true,
        archive_root: StorageRootStatus::probe(&state.storage.archive_root),
        live_root: StorageRootStatus::probe(&state.storage.live_root),
        timestamp: Utc::now(),
    })
    .await
    .map_err(|e| ObserverError::Internal(format!("health task failed: {e}")))?;

    Ok(Json(status))
}

// ---------------------------------------------------------------------------
// GET /api/replays/{id}
// ---------------------------------------------------------------------------

/// Return one page of a simulation's replay.
///
/// Query parameters: `offset` (default 0), `limit` (default 100, clamped
/// to the configured maximum), `all_frames` (default `false`). Unknown or
/// unreadable simulations answer `200` with a single explanatory frame.
pub async fn get_replay(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
    query: Result<Query<ReplayRequest>, QueryRejection>,
) -> Result<Json<Replay>, ObserverError> {
    let sim_id = SimId::parse(&raw_id)?;
    let Query(request) = query.map_err(|e| ObserverError::InvalidQuery(e.body_text()))?;

    let replay = tokio::task::spawn_blocking(move || {
        state.assembler.build_or_explain(&sim_id, &request)
    })
    .await
    .map_err(|e| ObserverError::Internal(format!("replay task failed: {e}")))?;

    Ok(Json(replay))
}

// ---------------------------------------------------------------------------
// GET /api/simulations/{id}/state
// ---------------------------------------------------------------------------

/// Return the latest-known state of a simulation.
pub async fn get_current_state(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<CurrentState>, ObserverError> {
    let sim_id = SimId::parse(&raw_id)?;

    let current =
        tokio::task::spawn_blocking(move || state.projector.current_or_explain(&sim_id))
            .await
            .map_err(|e| ObserverError::Internal(format!("state task failed: {e}")))?;

    Ok(Json(current))
}
