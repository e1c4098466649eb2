//! Shared application state for the replay API server.

use reverie_replay::{ReplayAssembler, StateProjector, StorageConfig};

/// State shared by every request handler.
///
/// Holds no per-request data: each request opens the storage it needs and
/// drops it when the response is built.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Builds paginated replays.
    pub assembler: ReplayAssembler,
    /// Builds current-state views.
    pub projector: StateProjector,
    /// The storage configuration both were built from.
    pub storage: StorageConfig,
}

impl AppState {
    /// Build the components over the storage described by `storage`.
    pub fn new(storage: StorageConfig) -> Self {
        Self {
            assembler: ReplayAssembler::new(&storage),
            projector: StateProjector::new(&storage),
            storage,
        }
    }
}
