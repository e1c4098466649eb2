//! Typed outcomes for individual file reads.
//!
//! Every read of a simulation record produces a [`ReadOutcome`] rather than
//! an error, so the caller decides whether a missing or unparseable file is
//! fatal ([`ReadOutcome::required`]) or degrades to a default
//! ([`ReadOutcome::optional`]).

use std::io::ErrorKind;
use std::path::Path;

use reverie_types::Step;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::ReplayError;

/// Result of reading and parsing one JSON record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome<T> {
    /// The file exists and parsed.
    Found(T),
    /// The file does not exist.
    Missing,
    /// The file exists but could not be read or parsed.
    Malformed(String),
}

impl<T> ReadOutcome<T> {
    /// Treat the record as essential: anything but [`ReadOutcome::Found`]
    /// becomes [`ReplayError::Malformed`].
    pub fn required(self, path: &Path) -> Result<T, ReplayError> {
        match self {
            Self::Found(value) => Ok(value),
            Self::Missing => Err(ReplayError::malformed(path, "record is missing")),
            Self::Malformed(reason) => Err(ReplayError::malformed(path, reason)),
        }
    }

    /// Treat the record as enrichment: a malformed file is logged and
    /// handled the same way as a missing one.
    pub fn optional(self, path: &Path) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::Missing => None,
            Self::Malformed(reason) => {
                warn!(
                    path = %path.display(),
                    error = %reason,
                    "ignoring unreadable optional record"
                );
                None
            }
        }
    }
}

/// Read and parse a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> ReadOutcome<T> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return ReadOutcome::Missing,
        Err(e) => return ReadOutcome::Malformed(e.to_string()),
    };
    match serde_json::from_slice(&bytes) {
        Ok(value) => ReadOutcome::Found(value),
        Err(e) => ReadOutcome::Malformed(e.to_string()),
    }
}

/// Parse a record key or filename stem as a step index.
pub fn parse_step(raw: &str) -> Option<Step> {
    raw.trim().parse().ok()
}

/// List the `<step>.json` files in `dir` as ascending, de-duplicated steps.
///
/// Entries whose stem is not a non-negative integer are skipped.
///
/// # Errors
///
/// Returns [`ReplayError::Malformed`] if the directory cannot be listed.
pub fn numeric_json_stems(dir: &Path) -> Result<Vec<Step>, ReplayError> {
    let entries = std::fs::read_dir(dir).map_err(|e| ReplayError::malformed(dir, e.to_string()))?;

    let mut steps = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ReplayError::malformed(dir, e.to_string()))?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        match path.file_stem().and_then(|stem| stem.to_str()).and_then(parse_step) {
            Some(step) => steps.push(step),
            None => debug!(path = %path.display(), "skipping non-numeric step file"),
        }
    }
    steps.sort_unstable();
    steps.dedup();
    Ok(steps)
}
