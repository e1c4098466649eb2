//! On-disk record schemas and their conversion into [`AgentSnapshot`].
//!
//! Each storage format gets an explicit schema ([`ArchiveStepRecord`],
//! [`LiveStepRecord`]). Both are lowered into an [`AgentObservation`], and
//! [`AgentObservation::into_snapshot`] is the single place where the
//! fallback chains for area and action text are applied.

use std::collections::BTreeMap;

use reverie_types::{AgentSnapshot, Emotions, Location, Step};
use serde::{Deserialize, Deserializer, de};
use serde_json::{Map, Value};

use crate::action::{AREA_SENTINEL, ActionSources, resolve_action};

// ---------------------------------------------------------------------------
// Archive records
// ---------------------------------------------------------------------------

/// `meta.json` of an archived (completed) simulation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArchiveMeta {
    /// The final recorded step.
    #[serde(rename = "step")]
    pub final_step: Step,
    /// Calendar date of step 0, in an engine date format.
    pub start_date: String,
    /// Simulated seconds per step.
    #[serde(alias = "sec_per_step")]
    pub seconds_per_step: u64,
    /// Persona names in recorded order.
    #[serde(default)]
    pub persona_names: Vec<String>,
    /// The simulation this run was forked from.
    #[serde(default, alias = "base_id")]
    pub fork_sim_code: Option<String>,
}

/// One persona's entry at one step of `master_movement.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ArchiveStepRecord {
    /// Tile coordinate `[x, y]`.
    #[serde(default)]
    pub movement: Option<[i64; 2]>,
    /// Activity text. The archive has no separate area field, so this also
    /// serves as the area label.
    #[serde(default)]
    pub description: Option<String>,
    /// Emoji attached to the movement.
    #[serde(default, alias = "emoji")]
    pub pronunciatio: Option<String>,
}

impl ArchiveStepRecord {
    /// Lower into the common observation shape.
    pub fn observe<'a>(&'a self, name: &'a str) -> AgentObservation<'a> {
        let [x, y] = self.movement.unwrap_or_default();
        let description = self.description.as_deref();
        AgentObservation {
            name,
            x,
            y,
            area: description,
            sources: ActionSources {
                movement_description: None,
                current_action: description,
                position_description: description,
                emoji: self.pronunciatio.as_deref(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Live records
// ---------------------------------------------------------------------------

/// One agent's entry in `environment/<step>.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LivePosition {
    /// Maze (area) name; the world sentinel means "no specific area".
    #[serde(default)]
    pub maze: Option<String>,
    /// Tile column.
    #[serde(default)]
    pub x: i64,
    /// Tile row.
    #[serde(default)]
    pub y: i64,
    /// Inline current action, when the engine recorded one.
    #[serde(default)]
    pub current_action: Option<String>,
    /// Inline description, when the engine recorded one.
    #[serde(default)]
    pub description: Option<String>,
}

/// Top-level key of the engine's nested movement form.
const NESTED_KEY: &str = "persona";

/// One agent's entry in `movement/<step>.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LiveMovement {
    /// Activity text.
    #[serde(default)]
    pub description: Option<String>,
    /// Emoji attached to the movement.
    #[serde(default, alias = "pronunciation", alias = "emoji")]
    pub pronunciatio: Option<String>,
}

/// A parsed `movement/<step>.json`, in either the engine's nested form
/// (`{"persona": {...}, "meta": {...}}`) or as a flat agent map.
///
/// A top-level `persona` key selects the nested form; its contents must then
/// parse, otherwise the whole file is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveMovementFile {
    /// `{"persona": {name: movement}, ...}`.
    Nested {
        /// Movements keyed by agent name.
        persona: BTreeMap<String, LiveMovement>,
    },
    /// `{name: movement}`.
    Flat(BTreeMap<String, LiveMovement>),
}

impl<'de> Deserialize<'de> for LiveMovementFile {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut map = Map::<String, Value>::deserialize(deserializer)?;
        match map.remove(NESTED_KEY) {
            Some(persona) => BTreeMap::deserialize(persona)
                .map(|persona| Self::Nested { persona })
                .map_err(|e| de::Error::custom(format_args!("{NESTED_KEY}: {e}"))),
            None => BTreeMap::deserialize(Value::Object(map))
                .map(Self::Flat)
                .map_err(de::Error::custom),
        }
    }
}

impl LiveMovementFile {
    /// Movements keyed by agent name, whichever form was recorded.
    pub fn into_agents(self) -> BTreeMap<String, LiveMovement> {
        match self {
            Self::Nested { persona } => persona,
            Self::Flat(agents) => agents,
        }
    }
}

/// An agent's live position joined with its optional movement entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveStepRecord {
    /// Agent name.
    pub name: String,
    /// Position from the environment record.
    pub position: LivePosition,
    /// Movement enrichment, if a movement record exists for the step.
    pub movement: Option<LiveMovement>,
}

impl LiveStepRecord {
    /// Lower into the common observation shape.
    pub fn observe(&self) -> AgentObservation<'_> {
        let movement = self.movement.as_ref();
        AgentObservation {
            name: &self.name,
            x: self.position.x,
            y: self.position.y,
            area: self.position.maze.as_deref(),
            sources: ActionSources {
                movement_description: movement.and_then(|m| m.description.as_deref()),
                current_action: self.position.current_action.as_deref(),
                position_description: self.position.description.as_deref(),
                emoji: movement.and_then(|m| m.pronunciatio.as_deref()),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Common shape
// ---------------------------------------------------------------------------

/// Format-independent view of one agent at one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentObservation<'a> {
    /// Agent name, also used as the stable id.
    pub name: &'a str,
    /// Tile column.
    pub x: i64,
    /// Tile row.
    pub y: i64,
    /// Raw area label.
    pub area: Option<&'a str>,
    /// Activity text sources.
    pub sources: ActionSources<'a>,
}

impl AgentObservation<'_> {
    /// Build the snapshot, applying the area and action fallbacks.
    pub fn into_snapshot(self, persona_description: String) -> AgentSnapshot {
        let area = self
            .area
            .map(str::trim)
            .filter(|a| *a != AREA_SENTINEL)
            .unwrap_or_default()
            .to_owned();
        AgentSnapshot {
            id: self.name.to_owned(),
            name: self.name.to_owned(),
            persona_description,
            location: Location {
                x: self.x,
                y: self.y,
                area,
            },
            current_action: resolve_action(&self.sources),
            emotions: Emotions::PLACEHOLDER,
        }
    }
}
