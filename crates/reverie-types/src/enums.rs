//! Enumeration types shared between the replay service and its clients.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Which on-disk representation backs a simulation id.
///
/// Archived storage takes precedence over live storage when both exist:
/// an archive is written once the run has finished, so it is the more
/// complete record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum StorageKind {
    /// A completed run with a consolidated `meta.json` + `master_movement.json`.
    Archived,
    /// An in-progress run with one environment file per step.
    Live,
    /// Neither representation exists for the id.
    NotFound,
}
