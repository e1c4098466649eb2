//! Storage selection shared by the assembler and the projector.

use reverie_types::{Frame, SimId, StorageKind, Step};
use tracing::debug;

use crate::archive::ArchiveReader;
use crate::config::StorageConfig;
use crate::error::ReplayError;
use crate::live::LiveStepReader;

/// A simulation opened for one request, whichever representation it uses.
pub trait StepSource {
    /// Which representation backs this source.
    fn kind(&self) -> StorageKind;

    /// The id the source was opened for.
    fn sim_id(&self) -> &SimId;

    /// The simulation id reported to clients.
    fn simulation_id(&self) -> String;

    /// Every available step, ascending.
    fn steps(&self) -> &[Step];

    /// The historical length of the run, independent of sampling.
    fn total_steps(&self) -> u64;

    /// Simulated seconds per step.
    fn seconds_per_step(&self) -> u64;

    /// The step a current-state view shows, if any.
    fn latest_step(&self) -> Option<Step>;

    /// How many agents the run has.
    ///
    /// # Errors
    ///
    /// [`ReplayError::Malformed`] when the record holding the count cannot
    /// be read.
    fn agent_count(&mut self) -> Result<usize, ReplayError>;

    /// Materialize the frame for `step`.
    ///
    /// # Errors
    ///
    /// [`ReplayError::Malformed`] when an essential record for the step is
    /// missing or cannot be parsed.
    fn frame_at(&mut self, step: Step) -> Result<Frame, ReplayError>;
}

/// Chooses between archived and live storage for an id.
#[derive(Debug, Clone)]
pub struct StorageLocator {
    archive: ArchiveReader,
    live: LiveStepReader,
}

impl StorageLocator {
    /// Build both readers from `config`.
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            archive: ArchiveReader::new(config.archive_root.clone()),
            live: LiveStepReader::new(config),
        }
    }

    /// Which representation exists for `sim_id`. An archive wins over a
    /// live directory with the same id.
    pub fn locate(&self, sim_id: &SimId) -> StorageKind {
        let kind = if self.archive.exists(sim_id) {
            StorageKind::Archived
        } else if self.live.exists(sim_id) {
            StorageKind::Live
        } else {
            StorageKind::NotFound
        };
        debug!(sim_id = %sim_id, ?kind, "located simulation storage");
        kind
    }

    /// Open whichever representation exists.
    ///
    /// # Errors
    ///
    /// [`ReplayError::NotFound`] when neither exists, otherwise whatever
    /// the chosen reader's `open` returns.
    pub fn open(&self, sim_id: &SimId) -> Result<Box<dyn StepSource + '_>, ReplayError> {
        match self.locate(sim_id) {
            StorageKind::Archived => Ok(Box::new(self.archive.open(sim_id)?)),
            StorageKind::Live => Ok(Box::new(self.live.open(sim_id)?)),
            StorageKind::NotFound => Err(ReplayError::NotFound(sim_id.clone())),
        }
    }
}
