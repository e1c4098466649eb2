//! Shared type definitions for the Reverie replay service.
//!
//! Everything the HTTP layer serializes lives here. Types are exported to
//! `TypeScript` via `ts-rs` for the replay dashboard.
//!
//! # Modules
//!
//! - [`ids`] -- Validated simulation identifiers and path-segment checks
//! - [`enums`] -- Storage representation selector
//! - [`structs`] -- Agents, frames, replays and current-state payloads

pub mod enums;
pub mod ids;
pub mod structs;

pub use enums::StorageKind;
pub use ids::{MAX_SIM_ID_LEN, SimId, SimIdError, Step, is_safe_path_segment};
pub use structs::{
    AgentSnapshot, CurrentState, Emotions, EnvironmentState, Frame, Location, Replay,
    ReplayMetadata,
};
