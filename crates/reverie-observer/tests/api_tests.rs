//! Integration tests for the replay API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. Storage fixtures are written to a temporary
//! directory per test.

#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]

use std::fs;
use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, TimeDelta, Utc};
use reverie_observer::router::build_router;
use reverie_observer::state::AppState;
use reverie_replay::StorageConfig;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

fn write(path: &Path, body: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}

/// One archived run (`town_done`) and one sparse live run (`town_live`).
fn make_fixture() -> (TempDir, Arc<AppState>) {
    let root = tempfile::tempdir().unwrap();
    let archive = root.path().join("archive");
    let live = root.path().join("live");

    write(
        &archive.join("town_done/meta.json"),
        r#"{"step": 2, "start_date": "January 1, 2024", "seconds_per_step": 60,
            "persona_names": ["Alice"]}"#,
    );
    write(
        &archive.join("town_done/master_movement.json"),
        r#"{
            "0": {"Alice": {"movement": [10, 20], "description": "sleeping", "pronunciatio": "😴"}},
            "1": {"Alice": {"movement": [11, 20], "description": "the_ville"}},
            "2": {"Alice": {"movement": [12, 21], "description": "cafe"}}
        }"#,
    );
    write(
        &archive.join("town_done/personas/Alice/bootstrap_memory/associative_memory/nodes.json"),
        r#"{"node_1": {"description": "Alice is a barista"}}"#,
    );

    for step in [0, 1, 5] {
        write(
            &live.join(format!("town_live/environment/{step}.json")),
            &format!(r#"{{"Bob": {{"maze": "the_ville", "x": {step}, "y": 3}}}}"#),
        );
    }
    write(
        &live.join("town_live/movement/5.json"),
        r#"{"persona": {"Bob": {"description": "painting", "pronunciatio": "🎨"}}, "meta": {}}"#,
    );

    let state = Arc::new(AppState::new(StorageConfig {
        live_root: live,
        archive_root: archive,
        ..StorageConfig::default()
    }));
    (root, state)
}

async fn get(state: Arc<AppState>, uri: &str) -> (StatusCode, Value) {
    let response = build_router(state)
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn timestamp(frame: &Value) -> DateTime<Utc> {
    serde_json::from_value(frame["timestamp"].clone()).unwrap()
}

// ---------------------------------------------------------------------------
// Replays
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_archived_replay_all_frames() {
    let (_root, state) = make_fixture();
    let (status, json) = get(state, "/api/replays/town_done?all_frames=true").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], "town_done");
    assert_eq!(json["simulation_id"], "town_done");

    let frames = json["frames"].as_array().unwrap();
    assert_eq!(frames.len(), 3);
    for (expected_step, frame) in frames.iter().enumerate() {
        assert_eq!(frame["step"], expected_step);
    }
    let first = timestamp(&frames[0]);
    assert_eq!(timestamp(&frames[1]) - first, TimeDelta::seconds(60));
    assert_eq!(timestamp(&frames[2]) - first, TimeDelta::seconds(120));

    assert_eq!(json["metadata"]["total_steps"], 2);
    assert_eq!(json["metadata"]["duration_seconds"], 120);
    assert_eq!(json["metadata"]["agent_count"], 1);
    assert_eq!(json["metadata"]["has_more"], false);
}

#[tokio::test]
async fn test_archived_agent_fields() {
    let (_root, state) = make_fixture();
    let (_, json) = get(state, "/api/replays/town_done/").await;

    let alice = &json["frames"][0]["agents"][0];
    assert_eq!(alice["id"], "Alice");
    assert_eq!(alice["persona"], "Alice is a barista");
    assert_eq!(alice["location"]["x"], 10);
    assert_eq!(alice["location"]["area"], "sleeping");
    assert_eq!(alice["current_action"], "😴 sleeping");
    assert!(alice["emotions"]["happiness"].is_number());

    let sentinel = &json["frames"][1]["agents"][0];
    assert_eq!(sentinel["location"]["area"], "");
    assert_eq!(sentinel["current_action"], "Exploring the environment");
}

#[tokio::test]
async fn test_replay_pagination() {
    let (_root, state) = make_fixture();
    let (_, json) = get(state, "/api/replays/town_done?offset=1&limit=1").await;

    let frames = json["frames"].as_array().unwrap();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0]["step"], 1);
    assert_eq!(json["metadata"]["offset"], 1);
    assert_eq!(json["metadata"]["returned"], 1);
    assert_eq!(json["metadata"]["has_more"], true);
}

#[tokio::test]
async fn test_zero_limit_returns_one_frame() {
    let (_root, state) = make_fixture();
    let (status, json) = get(state, "/api/replays/town_done?limit=0").await;

    assert_eq!(status, StatusCode::OK);
    let frames = json["frames"].as_array().unwrap();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0]["step"], 0);
    assert_eq!(json["metadata"]["limit"], 1);
    assert_eq!(json["metadata"]["returned"], 1);
    assert_eq!(json["metadata"]["has_more"], true);
}

#[tokio::test]
async fn test_unknown_replay_is_explained() {
    let (_root, state) = make_fixture();
    let (status, json) = get(state, "/api/replays/nowhere").await;

    assert_eq!(status, StatusCode::OK);
    let frames = json["frames"].as_array().unwrap();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0]["step"], 0);
    assert_eq!(frames[0]["events"][0], "Replay nowhere not found");
    assert_eq!(json["metadata"]["total_steps"], 1);
}

#[tokio::test]
async fn test_invalid_id_is_rejected() {
    let (_root, state) = make_fixture();
    let (status, json) = get(state, "/api/replays/.hidden").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], 400);
    assert!(json["error"].as_str().unwrap().contains("invalid simulation id"));
}

#[tokio::test]
async fn test_invalid_query_is_rejected() {
    let (_root, state) = make_fixture();
    let (status, json) = get(state, "/api/replays/town_done?limit=lots").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], 400);
}

// ---------------------------------------------------------------------------
// Current state
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_live_state_uses_largest_step() {
    let (_root, state) = make_fixture();
    let (status, json) = get(state, "/api/simulations/town_live/state/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["step"], 5);
    let bob = &json["agents"][0];
    assert_eq!(bob["location"]["x"], 5);
    assert_eq!(bob["location"]["area"], "");
    assert_eq!(bob["current_action"], "🎨 painting");
    assert!(json["environment"]["time"].is_string());
}

#[tokio::test]
async fn test_archived_state_uses_final_step() {
    let (_root, state) = make_fixture();
    let (_, json) = get(state, "/api/simulations/town_done/state").await;

    assert_eq!(json["step"], 2);
    assert_eq!(json["agents"][0]["location"]["area"], "cafe");
    assert_eq!(json["environment"]["time"], "2024-01-01T00:02:00Z");
}

#[tokio::test]
async fn test_unknown_state_is_explained() {
    let (_root, state) = make_fixture();
    let (status, json) = get(state, "/api/simulations/nowhere/state").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["step"], 0);
    assert_eq!(json["agents"].as_array().unwrap().len(), 0);
    assert_eq!(json["environment"]["events"][0], "Simulation nowhere not found");
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_health_reports_roots() {
    let (_root, state) = make_fixture();
    let (status, json) = get(state, "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["env_server"], true);
    assert_eq!(json["archive_root"]["available"], true);
    assert_eq!(json["live_root"]["available"], true);
    assert!(json["timestamp"].is_string());
}
