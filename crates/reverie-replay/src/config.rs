//! Storage configuration for the replay components.
//!
//! Every component receives a [`StorageConfig`] at construction; nothing
//! reads the environment after startup. Values come from environment
//! variables with defaults matching the simulation engine's layout.

use std::path::PathBuf;

/// Default live storage root, relative to the working directory.
pub const DEFAULT_LIVE_ROOT: &str = "environment/frontend_server/storage";

/// Default archive storage root, relative to the working directory.
pub const DEFAULT_ARCHIVE_ROOT: &str = "environment/frontend_server/compressed_storage";

/// Live runs record no step duration; this is assumed instead.
pub const DEFAULT_LIVE_SECONDS_PER_STEP: u64 = 10;

/// Default upper bound on a replay page size.
pub const DEFAULT_MAX_PAGE_LIMIT: usize = 1000;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable held a value that could not be used.
    #[error("invalid {var}: {reason}")]
    Invalid {
        /// The variable name.
        var: &'static str,
        /// What was wrong with the value.
        reason: String,
    },
}

/// Where simulation storage lives and how it is presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Root of live (per-step) simulation directories.
    pub live_root: PathBuf,
    /// Root of archived (consolidated) simulation directories.
    pub archive_root: PathBuf,
    /// Step duration assumed for live runs.
    pub live_seconds_per_step: u64,
    /// Largest page a replay request may ask for.
    pub max_page_limit: usize,
    /// Whether live frames are enriched from `movement/<step>.json`.
    pub live_movement_enrichment: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            live_root: PathBuf::from(DEFAULT_LIVE_ROOT),
            archive_root: PathBuf::from(DEFAULT_ARCHIVE_ROOT),
            live_seconds_per_step: DEFAULT_LIVE_SECONDS_PER_STEP,
            max_page_limit: DEFAULT_MAX_PAGE_LIMIT,
            live_movement_enrichment: true,
        }
    }
}

impl StorageConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional variables:
    /// - `NSPLLM_STORAGE_ROOT` -- live storage root
    /// - `NSPLLM_ARCHIVE_ROOT` -- archive storage root
    /// - `LIVE_SECONDS_PER_STEP` -- assumed live step duration (default 10, must be > 0)
    /// - `REPLAY_MAX_PAGE_LIMIT` -- largest replay page (default 1000, must be > 0)
    /// - `LIVE_MOVEMENT_ENRICHMENT` -- read movement files for live frames (default `true`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let live_root = lookup("NSPLLM_STORAGE_ROOT").map_or(defaults.live_root, PathBuf::from);
        let archive_root =
            lookup("NSPLLM_ARCHIVE_ROOT").map_or(defaults.archive_root, PathBuf::from);

        let live_seconds_per_step = parse_var(
            &lookup,
            "LIVE_SECONDS_PER_STEP",
            defaults.live_seconds_per_step,
        )?;
        if live_seconds_per_step == 0 {
            return Err(ConfigError::Invalid {
                var: "LIVE_SECONDS_PER_STEP",
                reason: "must be at least 1".to_owned(),
            });
        }

        let max_page_limit =
            parse_var(&lookup, "REPLAY_MAX_PAGE_LIMIT", defaults.max_page_limit)?;
        if max_page_limit == 0 {
            return Err(ConfigError::Invalid {
                var: "REPLAY_MAX_PAGE_LIMIT",
                reason: "must be at least 1".to_owned(),
            });
        }

        let live_movement_enrichment = parse_var(
            &lookup,
            "LIVE_MOVEMENT_ENRICHMENT",
            defaults.live_movement_enrichment,
        )?;

        Ok(Self {
            live_root,
            archive_root,
            live_seconds_per_step,
            max_page_limit,
            live_movement_enrichment,
        })
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(var).map_or(Ok(default), |raw| {
        raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: format!("{raw:?}: {e}"),
        })
    })
}
