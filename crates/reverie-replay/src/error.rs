//! Error types for replay reconstruction.
//!
//! Only two failure kinds ever leave a component: the id has no storage
//! ([`ReplayError::NotFound`]), or a record exists but cannot be used
//! ([`ReplayError::Malformed`]). Non-essential lookups (persona
//! descriptions, movement enrichment) degrade to their documented defaults
//! and are logged instead of returned.

use std::path::PathBuf;

use reverie_types::SimId;

/// Errors that can occur while reading simulation storage.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    /// Neither archived nor live storage exists for the id.
    #[error("simulation {0} not found")]
    NotFound(SimId),

    /// A record exists but failed to read, parse, or validate.
    #[error("malformed record {}: {reason}", path.display())]
    Malformed {
        /// The offending file or directory.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },
}

impl ReplayError {
    /// Shorthand for a [`ReplayError::Malformed`] about `path`.
    pub fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
