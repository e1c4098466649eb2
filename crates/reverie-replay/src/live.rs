//! Reader for live (in-progress) simulations.
//!
//! A live run writes one environment record per step and, when available,
//! one movement record per step:
//!
//! ```text
//! <live_root>/<sim_id>/environment/<step>.json   agent -> {maze, x, y, ...}
//! <live_root>/<sim_id>/movement/<step>.json      agent -> {description, pronunciatio}
//! <live_root>/<sim_id>/personas/<name>/...
//! ```
//!
//! Live runs carry no simulated-clock metadata, so frame timestamps are the
//! wall-clock time of the read.

use std::path::{Path, PathBuf};

use chrono::Utc;
use reverie_types::{Frame, SimId, StorageKind, Step};
use serde_json::{Map, Value};

use crate::config::StorageConfig;
use crate::error::ReplayError;
use crate::persona::{PersonaDescriptionResolver, PersonaLayout, PersonaMemo};
use crate::record::{LiveMovementFile, LivePosition, LiveStepRecord};
use crate::source::StepSource;
use crate::storage::{numeric_json_stems, read_json};

/// Directory of per-step environment records.
pub const ENVIRONMENT_DIR: &str = "environment";

/// Directory of per-step movement records.
pub const MOVEMENT_DIR: &str = "movement";

/// Reads per-step simulation directories under one storage root.
#[derive(Debug, Clone)]
pub struct LiveStepReader {
    root: PathBuf,
    personas: PersonaDescriptionResolver,
    seconds_per_step: u64,
    movement_enrichment: bool,
}

impl LiveStepReader {
    /// Create a reader from the live settings of `config`.
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            root: config.live_root.clone(),
            personas: PersonaDescriptionResolver::new(PersonaLayout::Live),
            seconds_per_step: config.live_seconds_per_step,
            movement_enrichment: config.live_movement_enrichment,
        }
    }

    fn sim_dir(&self, sim_id: &SimId) -> PathBuf {
        self.root.join(sim_id.as_str())
    }

    /// Whether a per-step environment directory exists for the id.
    pub fn exists(&self, sim_id: &SimId) -> bool {
        self.sim_dir(sim_id).join(ENVIRONMENT_DIR).is_dir()
    }

    /// Steps with an environment record, ascending.
    ///
    /// # Errors
    ///
    /// [`ReplayError::NotFound`] when no environment directory exists,
    /// [`ReplayError::Malformed`] when it cannot be listed.
    pub fn steps_available(&self, sim_id: &SimId) -> Result<Vec<Step>, ReplayError> {
        if !self.exists(sim_id) {
            return Err(ReplayError::NotFound(sim_id.clone()));
        }
        numeric_json_stems(&self.sim_dir(sim_id).join(ENVIRONMENT_DIR))
    }

    /// Build the frame for one step.
    ///
    /// # Errors
    ///
    /// See [`LiveStepReader::open`] and [`StepSource::frame_at`].
    pub fn frame_at(&self, sim_id: &SimId, step: Step) -> Result<Frame, ReplayError> {
        self.open(sim_id)?.frame_at(step)
    }

    /// List the run's steps and return a handle serving this request.
    ///
    /// # Errors
    ///
    /// See [`LiveStepReader::steps_available`].
    pub fn open(&self, sim_id: &SimId) -> Result<LiveRun<'_>, ReplayError> {
        let steps = self.steps_available(sim_id)?;
        Ok(LiveRun {
            reader: self,
            sim_id: sim_id.clone(),
            dir: self.sim_dir(sim_id),
            steps,
            personas: PersonaMemo::new(self.personas, &self.root, sim_id.clone()),
        })
    }
}

/// One live run, listed for the lifetime of a request.
#[derive(Debug)]
pub struct LiveRun<'a> {
    reader: &'a LiveStepReader,
    sim_id: SimId,
    dir: PathBuf,
    steps: Vec<Step>,
    personas: PersonaMemo<'a>,
}

impl LiveRun<'_> {
    fn environment_at(&self, step: Step) -> Result<Map<String, Value>, ReplayError> {
        let path = self
            .dir
            .join(ENVIRONMENT_DIR)
            .join(format!("{step}.json"));
        read_json(&path).required(&path)
    }

    /// Agent records for one step, in environment-record order.
    ///
    /// # Errors
    ///
    /// [`ReplayError::Malformed`] when the environment record is missing or
    /// an agent's position does not parse. A bad movement record only
    /// removes enrichment.
    pub fn records_at(&self, step: Step) -> Result<Vec<LiveStepRecord>, ReplayError> {
        let environment = self.environment_at(step)?;

        let mut movements = if self.reader.movement_enrichment {
            let path = self.dir.join(MOVEMENT_DIR).join(format!("{step}.json"));
            read_json::<LiveMovementFile>(&path)
                .optional(&path)
                .map(LiveMovementFile::into_agents)
        } else {
            None
        };

        environment
            .into_iter()
            .map(|(name, value)| {
                let position: LivePosition = serde_json::from_value(value).map_err(|e| {
                    ReplayError::malformed(
                        self.dir.join(ENVIRONMENT_DIR).join(format!("{step}.json")),
                        format!("agent {name:?}: {e}"),
                    )
                })?;
                let movement = movements.as_mut().and_then(|m| m.remove(&name));
                Ok(LiveStepRecord {
                    name,
                    position,
                    movement,
                })
            })
            .collect()
    }
}

impl StepSource for LiveRun<'_> {
    fn kind(&self) -> StorageKind {
        StorageKind::Live
    }

    fn sim_id(&self) -> &SimId {
        &self.sim_id
    }

    fn simulation_id(&self) -> String {
        self.sim_id.to_string()
    }

    fn steps(&self) -> &[Step] {
        &self.steps
    }

    fn total_steps(&self) -> u64 {
        u64::try_from(self.steps.len()).unwrap_or(u64::MAX)
    }

    fn seconds_per_step(&self) -> u64 {
        self.reader.seconds_per_step
    }

    /// The largest step present; the set may be sparse.
    fn latest_step(&self) -> Option<Step> {
        self.steps.last().copied()
    }

    fn agent_count(&mut self) -> Result<usize, ReplayError> {
        match self.latest_step() {
            Some(step) => Ok(self.environment_at(step)?.len()),
            None => Ok(0),
        }
    }

    fn frame_at(&mut self, step: Step) -> Result<Frame, ReplayError> {
        let records = self.records_at(step)?;
        let agents = records
            .iter()
            .map(|record| {
                let description = self.personas.describe(&record.name);
                record.observe().into_snapshot(description)
            })
            .collect();

        Ok(Frame {
            step,
            timestamp: Utc::now(),
            agents,
            events: Vec::new(),
        })
    }
}
