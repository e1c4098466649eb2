//! Validated identifiers used to address simulation storage.
//!
//! A [`SimId`] is the only value a caller controls that ends up inside a
//! filesystem path, so it is validated once at construction and carried
//! around as a proof of safety. Persona names come from recorded files and
//! are checked separately with [`is_safe_path_segment`] before they are
//! joined onto a path.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use ts_rs::TS;

/// A simulation tick. Steps are non-negative and strictly ordered.
pub type Step = u64;

/// Maximum accepted length of a [`SimId`] in bytes.
pub const MAX_SIM_ID_LEN: usize = 255;

/// Errors produced when validating a [`SimId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimIdError {
    /// The identifier was empty.
    #[error("simulation id must not be empty")]
    Empty,

    /// The identifier exceeded [`MAX_SIM_ID_LEN`].
    #[error("simulation id is {len} bytes, maximum is {MAX_SIM_ID_LEN}")]
    TooLong {
        /// Actual length in bytes.
        len: usize,
    },

    /// The identifier started with a dot (hidden entry or `..`).
    #[error("simulation id must not start with '.'")]
    LeadingDot,

    /// The identifier contained a character outside `[A-Za-z0-9_.-]`.
    #[error("simulation id contains forbidden character {found:?}")]
    ForbiddenCharacter {
        /// The first offending character.
        found: char,
    },
}

/// Opaque identifier naming a simulation or replay instance.
///
/// Only ASCII alphanumerics, `_`, `-` and `.` are accepted, and the first
/// character may not be `.`, so a `SimId` can never escape the storage root
/// it is joined onto.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SimId(String);

impl SimId {
    /// Validate and wrap a raw identifier.
    ///
    /// # Errors
    ///
    /// Returns a [`SimIdError`] describing the first rule the input breaks.
    pub fn parse(raw: &str) -> Result<Self, SimIdError> {
        if raw.is_empty() {
            return Err(SimIdError::Empty);
        }
        if raw.len() > MAX_SIM_ID_LEN {
            return Err(SimIdError::TooLong { len: raw.len() });
        }
        if raw.starts_with('.') {
            return Err(SimIdError::LeadingDot);
        }
        if let Some(found) = raw
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')))
        {
            return Err(SimIdError::ForbiddenCharacter { found });
        }
        Ok(Self(raw.to_owned()))
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for SimId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SimId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for SimId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SimId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

impl TryFrom<String> for SimId {
    type Error = SimIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SimId> for String {
    fn from(id: SimId) -> Self {
        id.0
    }
}

/// Whether `segment` can be joined onto a directory as exactly one path
/// component.
///
/// Used for persona names read out of recorded files. Spaces and other
/// printable characters are allowed (persona names look like
/// `Isabella Rodriguez`), but separators, control characters, leading
/// dots and drive prefixes are not.
pub fn is_safe_path_segment(segment: &str) -> bool {
    !segment.is_empty()
        && !segment.starts_with('.')
        && !segment
            .chars()
            .any(|c| matches!(c, '/' | '\\' | ':') || c.is_control())
}
