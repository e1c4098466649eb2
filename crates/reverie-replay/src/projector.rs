//! Latest-state projection.

use chrono::Utc;
use reverie_types::{CurrentState, Frame, SimId};

use crate::assembler::explain;
use crate::config::StorageConfig;
use crate::error::ReplayError;
use crate::source::StorageLocator;

/// Builds the single frame a current-state view shows.
#[derive(Debug, Clone)]
pub struct StateProjector {
    locator: StorageLocator,
}

impl StateProjector {
    /// Create a projector over the storage described by `config`.
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            locator: StorageLocator::new(config),
        }
    }

    /// The frame at the run's latest step: the recorded final step for an
    /// archive, the largest step present for a live run.
    ///
    /// # Errors
    ///
    /// [`ReplayError::NotFound`] when no storage exists or a live run has
    /// not written any step yet, [`ReplayError::Malformed`] when the
    /// step's records cannot be used.
    pub fn current(&self, sim_id: &SimId) -> Result<Frame, ReplayError> {
        let mut source = self.locator.open(sim_id)?;
        let step = source
            .latest_step()
            .ok_or_else(|| ReplayError::NotFound(sim_id.clone()))?;
        source.frame_at(step)
    }

    /// Like [`StateProjector::current`], but a failure becomes a step-0
    /// state whose single event explains what went wrong.
    pub fn current_or_explain(&self, sim_id: &SimId) -> CurrentState {
        self.current(sim_id)
            .unwrap_or_else(|e| {
                Frame::explanatory(0, Utc::now(), explain("Simulation", sim_id, &e))
            })
            .into()
    }
}
