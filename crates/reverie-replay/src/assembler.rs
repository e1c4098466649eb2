//! Full, paginated replay construction.

use chrono::Utc;
use reverie_types::{Frame, Replay, ReplayMetadata, SimId};
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::StorageConfig;
use crate::error::ReplayError;
use crate::sampler::{paginate, sample};
use crate::source::StorageLocator;

/// Default page size.
pub const DEFAULT_LIMIT: usize = 100;

/// Paging and sampling parameters of a replay request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReplayRequest {
    /// Offset into the sampled step list.
    pub offset: usize,
    /// Requested page size, clamped to `1..=max_page_limit`.
    pub limit: usize,
    /// Skip down-sampling.
    pub all_frames: bool,
}

impl Default for ReplayRequest {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_LIMIT,
            all_frames: false,
        }
    }
}

/// Builds [`Replay`] payloads from whichever storage backs an id.
#[derive(Debug, Clone)]
pub struct ReplayAssembler {
    locator: StorageLocator,
    max_page_limit: usize,
}

impl ReplayAssembler {
    /// Create an assembler over the storage described by `config`.
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            locator: StorageLocator::new(config),
            max_page_limit: config.max_page_limit,
        }
    }

    /// The page size actually served: at least one frame, at most the
    /// configured maximum.
    fn page_limit(&self, requested: usize) -> usize {
        requested.min(self.max_page_limit).max(1)
    }

    /// Build one page of the replay for `sim_id`.
    ///
    /// Steps are sampled first and the page is cut from the sampled list.
    /// `total_steps` always reports the run's historical length.
    ///
    /// # Errors
    ///
    /// [`ReplayError::NotFound`] when no storage exists for the id,
    /// [`ReplayError::Malformed`] when an essential record cannot be used.
    pub fn build(&self, sim_id: &SimId, request: &ReplayRequest) -> Result<Replay, ReplayError> {
        let mut source = self.locator.open(sim_id)?;
        let limit = self.page_limit(request.limit);

        let sampled = sample(source.steps(), request.all_frames);
        let page = paginate(&sampled, request.offset, limit);

        let frames = page
            .steps
            .iter()
            .map(|&step| source.frame_at(step))
            .collect::<Result<Vec<Frame>, _>>()?;

        let total_steps = source.total_steps();
        let metadata = ReplayMetadata {
            total_steps,
            duration_seconds: total_steps.saturating_mul(source.seconds_per_step()),
            agent_count: source.agent_count()?,
            offset: request.offset,
            limit,
            returned: frames.len(),
            has_more: page.has_more,
        };

        info!(
            sim_id = %sim_id,
            kind = ?source.kind(),
            frames = frames.len(),
            total_steps,
            "assembled replay"
        );

        Ok(Replay {
            id: sim_id.clone(),
            simulation_id: source.simulation_id(),
            name: display_name(sim_id),
            frames,
            metadata,
        })
    }

    /// Like [`ReplayAssembler::build`], but a failure becomes a one-frame
    /// replay whose single event explains what went wrong.
    pub fn build_or_explain(&self, sim_id: &SimId, request: &ReplayRequest) -> Replay {
        match self.build(sim_id, request) {
            Ok(replay) => replay,
            Err(e) => {
                let frame = Frame::explanatory(0, Utc::now(), explain("Replay", sim_id, &e));
                Replay {
                    id: sim_id.clone(),
                    simulation_id: sim_id.to_string(),
                    name: display_name(sim_id),
                    frames: vec![frame],
                    metadata: ReplayMetadata {
                        total_steps: 1,
                        duration_seconds: 0,
                        agent_count: 0,
                        offset: 0,
                        limit: self.page_limit(request.limit),
                        returned: 1,
                        has_more: false,
                    },
                }
            }
        }
    }
}

fn display_name(sim_id: &SimId) -> String {
    format!("Replay {sim_id}")
}

/// The explanatory event for a failed request, logging the failure.
pub(crate) fn explain(subject: &str, sim_id: &SimId, error: &ReplayError) -> String {
    match error {
        ReplayError::NotFound(_) => format!("{subject} {sim_id} not found"),
        ReplayError::Malformed { path, reason } => {
            warn!(
                sim_id = %sim_id,
                path = %path.display(),
                error = %reason,
                "serving explanation for unreadable simulation"
            );
            format!("{subject} {sim_id} could not be read: {reason}")
        }
    }
}
