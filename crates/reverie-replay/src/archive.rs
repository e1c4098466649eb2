//! Reader for archived (completed) simulations.
//!
//! An archive directory holds one `meta.json` and one
//! `master_movement.json` mapping step strings to per-persona movement
//! entries, plus a `personas/` tree for descriptions:
//!
//! ```text
//! <archive_root>/<sim_id>/meta.json
//! <archive_root>/<sim_id>/master_movement.json
//! <archive_root>/<sim_id>/personas/<name>/bootstrap_memory/associative_memory/nodes.json
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use reverie_types::{Frame, SimId, StorageKind, Step};
use tracing::warn;

use crate::clock::ClockProjector;
use crate::error::ReplayError;
use crate::persona::{PersonaDescriptionResolver, PersonaLayout, PersonaMemo};
use crate::record::{ArchiveMeta, ArchiveStepRecord};
use crate::source::StepSource;
use crate::storage::{parse_step, read_json};

/// Summary record of a completed run.
pub const META_FILE: &str = "meta.json";

/// Consolidated movement record of a completed run.
pub const MASTER_MOVEMENT_FILE: &str = "master_movement.json";

type MasterMovement = BTreeMap<Step, BTreeMap<String, ArchiveStepRecord>>;

/// Reads consolidated archives under one storage root.
#[derive(Debug, Clone)]
pub struct ArchiveReader {
    root: PathBuf,
    personas: PersonaDescriptionResolver,
}

impl ArchiveReader {
    /// Create a reader rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            personas: PersonaDescriptionResolver::new(PersonaLayout::Archived),
        }
    }

    fn sim_dir(&self, sim_id: &SimId) -> PathBuf {
        self.root.join(sim_id.as_str())
    }

    /// Whether both the metadata and the consolidated movement record exist.
    pub fn exists(&self, sim_id: &SimId) -> bool {
        let dir = self.sim_dir(sim_id);
        dir.join(META_FILE).is_file() && dir.join(MASTER_MOVEMENT_FILE).is_file()
    }

    /// Read the run's metadata.
    ///
    /// # Errors
    ///
    /// [`ReplayError::NotFound`] when the archive does not exist,
    /// [`ReplayError::Malformed`] when `meta.json` does not parse.
    pub fn meta(&self, sim_id: &SimId) -> Result<ArchiveMeta, ReplayError> {
        if !self.exists(sim_id) {
            return Err(ReplayError::NotFound(sim_id.clone()));
        }
        let path = self.sim_dir(sim_id).join(META_FILE);
        read_json(&path).required(&path)
    }

    /// Steps recorded in the consolidated movement record, ascending.
    ///
    /// # Errors
    ///
    /// See [`ArchiveReader::open`].
    pub fn steps_available(&self, sim_id: &SimId) -> Result<Vec<Step>, ReplayError> {
        Ok(self.open(sim_id)?.steps().to_vec())
    }

    /// Build the frame for one step.
    ///
    /// # Errors
    ///
    /// See [`ArchiveReader::open`].
    pub fn frame_at(&self, sim_id: &SimId, step: Step) -> Result<Frame, ReplayError> {
        self.open(sim_id)?.frame_at(step)
    }

    /// Parse both records once and return a handle serving this request.
    ///
    /// # Errors
    ///
    /// [`ReplayError::NotFound`] when the archive does not exist,
    /// [`ReplayError::Malformed`] when either record does not parse or the
    /// metadata describes an unusable clock.
    pub fn open(&self, sim_id: &SimId) -> Result<ArchivedRun<'_>, ReplayError> {
        let meta = self.meta(sim_id)?;
        let dir = self.sim_dir(sim_id);

        let meta_path = dir.join(META_FILE);
        let clock = ClockProjector::from_start_date(&meta.start_date, meta.seconds_per_step)
            .map_err(|e| ReplayError::malformed(&meta_path, e.to_string()))?;

        let movement_path = dir.join(MASTER_MOVEMENT_FILE);
        let raw: BTreeMap<String, BTreeMap<String, ArchiveStepRecord>> =
            read_json(&movement_path).required(&movement_path)?;
        let movement = index_by_step(sim_id, raw);
        let steps = movement.keys().copied().collect();

        Ok(ArchivedRun {
            sim_id: sim_id.clone(),
            meta_path,
            meta,
            clock,
            movement,
            steps,
            personas: PersonaMemo::new(self.personas, &self.root, sim_id.clone()),
        })
    }
}

/// Re-key the consolidated record by numeric step, dropping keys that are
/// not step numbers. When two keys name the same step (`"01"` and `"1"`),
/// the one sorting last wins.
fn index_by_step(
    sim_id: &SimId,
    raw: BTreeMap<String, BTreeMap<String, ArchiveStepRecord>>,
) -> MasterMovement {
    let mut movement = MasterMovement::new();
    for (key, personas) in raw {
        let Some(step) = parse_step(&key) else {
            warn!(
                sim_id = %sim_id,
                key = %key,
                "ignoring non-numeric step key in master movement"
            );
            continue;
        };
        if movement.insert(step, personas).is_some() {
            warn!(
                sim_id = %sim_id,
                key = %key,
                step,
                "duplicate step key in master movement, keeping the later entry"
            );
        }
    }
    movement
}

/// One archived run, parsed for the lifetime of a request.
#[derive(Debug)]
pub struct ArchivedRun<'a> {
    sim_id: SimId,
    meta_path: PathBuf,
    meta: ArchiveMeta,
    clock: ClockProjector,
    movement: MasterMovement,
    steps: Vec<Step>,
    personas: PersonaMemo<'a>,
}

impl StepSource for ArchivedRun<'_> {
    fn kind(&self) -> StorageKind {
        StorageKind::Archived
    }

    fn sim_id(&self) -> &SimId {
        &self.sim_id
    }

    fn simulation_id(&self) -> String {
        self.meta
            .fork_sim_code
            .clone()
            .unwrap_or_else(|| self.sim_id.to_string())
    }

    fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// The engine's recorded step count, independent of how many steps the
    /// consolidated record happens to key.
    fn total_steps(&self) -> u64 {
        self.meta.final_step
    }

    fn seconds_per_step(&self) -> u64 {
        self.clock.seconds_per_step()
    }

    fn latest_step(&self) -> Option<Step> {
        Some(self.meta.final_step)
    }

    fn agent_count(&mut self) -> Result<usize, ReplayError> {
        Ok(self.meta.persona_names.len())
    }

    fn frame_at(&mut self, step: Step) -> Result<Frame, ReplayError> {
        let timestamp = self
            .clock
            .project(step)
            .map_err(|e| ReplayError::malformed(&self.meta_path, e.to_string()))?;

        let mut agents = Vec::new();
        if let Some(at_step) = self.movement.get(&step) {
            for name in &self.meta.persona_names {
                if let Some(record) = at_step.get(name) {
                    let description = self.personas.describe(name);
                    agents.push(record.observe(name).into_snapshot(description));
                }
            }
        }

        Ok(Frame {
            step,
            timestamp,
            agents,
            events: Vec::new(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::persona::DEFAULT_PERSONA_DESCRIPTION;

    fn sim() -> SimId {
        SimId::parse("done_1").unwrap()
    }

    fn write_archive(root: &Path, meta: &str, movement: &str) {
        let dir = root.join("done_1");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(META_FILE), meta).unwrap();
        fs::write(dir.join(MASTER_MOVEMENT_FILE), movement).unwrap();
    }

    const META: &str = r#"{"step": 2, "start_date": "January 1, 2024",
        "seconds_per_step": 60, "persona_names": ["Alice", "Bob"]}"#;

    #[test]
    fn exists_requires_both_records() {
        let root = tempfile::tempdir().unwrap();
        let reader = ArchiveReader::new(root.path());
        assert!(!reader.exists(&sim()));

        fs::create_dir_all(root.path().join("done_1")).unwrap();
        fs::write(root.path().join("done_1").join(META_FILE), META).unwrap();
        assert!(!reader.exists(&sim()));

        fs::write(root.path().join("done_1").join(MASTER_MOVEMENT_FILE), "{}").unwrap();
        assert!(reader.exists(&sim()));
    }

    #[test]
    fn steps_are_numeric_and_sorted() {
        let root = tempfile::tempdir().unwrap();
        write_archive(
            root.path(),
            META,
            r#"{"10": {}, "2": {}, "summary": {}, "0": {}}"#,
        );
        let reader = ArchiveReader::new(root.path());
        assert_eq!(reader.steps_available(&sim()).unwrap(), vec![0, 2, 10]);
    }

    #[test]
    fn equivalent_step_keys_collapse_to_one_step() {
        let root = tempfile::tempdir().unwrap();
        write_archive(
            root.path(),
            META,
            r#"{"01": {"Alice": {"description": "first"}},
                "1": {"Alice": {"description": "second"}}}"#,
        );
        let reader = ArchiveReader::new(root.path());
        assert_eq!(reader.steps_available(&sim()).unwrap(), vec![1]);

        let frame = reader.frame_at(&sim(), 1).unwrap();
        assert_eq!(
            frame.agents.first().map(|a| a.current_action.as_str()),
            Some("second")
        );
    }

    #[test]
    fn frame_follows_persona_order_and_clock() {
        let root = tempfile::tempdir().unwrap();
        write_archive(
            root.path(),
            META,
            r#"{"1": {
                "Bob": {"movement": [5, 6], "description": "cooking", "pronunciatio": "🍳"},
                "Alice": {"movement": [1, 2], "description": "the_ville"},
                "Mallory": {"movement": [0, 0], "description": "lurking"}
            }}"#,
        );
        let reader = ArchiveReader::new(root.path());
        let frame = reader.frame_at(&sim(), 1).unwrap();

        assert_eq!(frame.step, 1);
        assert_eq!(
            frame.timestamp,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 1, 0).unwrap()
        );
        let names: Vec<&str> = frame.agents.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob"]);

        let alice = frame.agents.first().unwrap();
        assert_eq!(alice.current_action, "Exploring the environment");
        assert_eq!(alice.location.area, "");
        assert_eq!(alice.persona_description, DEFAULT_PERSONA_DESCRIPTION);

        let bob = frame.agents.get(1).unwrap();
        assert_eq!(bob.current_action, "🍳 cooking");
        assert_eq!((bob.location.x, bob.location.y), (5, 6));
    }

    #[test]
    fn missing_archive_is_not_found() {
        let root = tempfile::tempdir().unwrap();
        let reader = ArchiveReader::new(root.path());
        assert!(matches!(reader.open(&sim()), Err(ReplayError::NotFound(_))));
    }

    #[test]
    fn bad_start_date_is_malformed() {
        let root = tempfile::tempdir().unwrap();
        write_archive(
            root.path(),
            r#"{"step": 1, "start_date": "whenever", "seconds_per_step": 10}"#,
            "{}",
        );
        let reader = ArchiveReader::new(root.path());
        assert!(matches!(
            reader.open(&sim()),
            Err(ReplayError::Malformed { .. })
        ));
    }
}
