//! Wire structs for replays and current-state snapshots.
//!
//! Field names follow the dashboard's `TypeScript` contract
//! (`persona`, `current_action`, `emotions`, ...), which is why a few
//! fields carry a `serde(rename)`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::{SimId, Step};

// ---------------------------------------------------------------------------
// Agents
// ---------------------------------------------------------------------------

/// Where an agent stands at a given step.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Location {
    /// Tile column.
    pub x: i64,
    /// Tile row.
    pub y: i64,
    /// Human-readable area label. Empty when the engine only recorded the
    /// world-level sentinel.
    pub area: String,
}

/// Fixed-dimension emotion vector.
///
/// Recorded simulation data carries no emotional state, so every snapshot
/// reports [`Emotions::PLACEHOLDER`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Emotions {
    /// Happiness in `[0, 1]`.
    pub happiness: f64,
    /// Curiosity in `[0, 1]`.
    pub curiosity: f64,
    /// Energy in `[0, 1]`.
    pub energy: f64,
}

impl Emotions {
    /// Constant vector reported for every agent.
    pub const PLACEHOLDER: Self = Self {
        happiness: 0.7,
        curiosity: 0.8,
        energy: 0.6,
    };
}

impl Default for Emotions {
    fn default() -> Self {
        Self::PLACEHOLDER
    }
}

/// One agent's recorded state at one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AgentSnapshot {
    /// Stable agent identifier (the persona name).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Persona description resolved from the agent's memory snapshot.
    #[serde(rename = "persona")]
    pub persona_description: String,
    /// Position and area label.
    pub location: Location,
    /// Display string for the current activity, emoji-prefixed when known.
    pub current_action: String,
    /// Emotion vector.
    pub emotions: Emotions,
}

// ---------------------------------------------------------------------------
// Frames and replays
// ---------------------------------------------------------------------------

/// One step's full world snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Frame {
    /// The step this frame represents.
    pub step: Step,
    /// Simulated-clock time for archived runs, read time for live runs.
    pub timestamp: DateTime<Utc>,
    /// Agents in a stable order (persona list order for archives, record
    /// order for live runs).
    pub agents: Vec<AgentSnapshot>,
    /// Event annotations for this step.
    pub events: Vec<String>,
}

impl Frame {
    /// A frame with no agents that carries a single explanatory event.
    pub fn explanatory(step: Step, timestamp: DateTime<Utc>, event: String) -> Self {
        Self {
            step,
            timestamp,
            agents: Vec::new(),
            events: vec![event],
        }
    }
}

/// Summary of a replay request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ReplayMetadata {
    /// True historical length, independent of sampling and paging.
    pub total_steps: u64,
    /// `total_steps * seconds_per_step`.
    pub duration_seconds: u64,
    /// Number of agents taking part in the run.
    pub agent_count: usize,
    /// Offset into the sampled step list.
    pub offset: usize,
    /// Page size that was applied.
    pub limit: usize,
    /// Number of frames in this page.
    pub returned: usize,
    /// Whether another page follows this one.
    pub has_more: bool,
}

/// A full, paginated replay payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Replay {
    /// The requested id.
    pub id: SimId,
    /// Originating simulation (the archive's base id when recorded).
    pub simulation_id: String,
    /// Display name.
    pub name: String,
    /// Materialized frames, strictly increasing by step.
    pub frames: Vec<Frame>,
    /// Paging and length summary.
    pub metadata: ReplayMetadata,
}

// ---------------------------------------------------------------------------
// Current state
// ---------------------------------------------------------------------------

/// Environment portion of a [`CurrentState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EnvironmentState {
    /// Timestamp of the projected frame.
    pub time: DateTime<Utc>,
    /// Events of the projected frame.
    pub events: Vec<String>,
}

/// Latest-known single-frame view of a simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CurrentState {
    /// The projected step.
    pub step: Step,
    /// Agents at that step.
    pub agents: Vec<AgentSnapshot>,
    /// Clock and events at that step.
    pub environment: EnvironmentState,
}

impl From<Frame> for CurrentState {
    fn from(frame: Frame) -> Self {
        Self {
            step: frame.step,
            agents: frame.agents,
            environment: EnvironmentState {
                time: frame.timestamp,
                events: frame.events,
            },
        }
    }
}
