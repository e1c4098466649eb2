//! Display text for an agent's current activity.
//!
//! The engine records activity in up to three places, with varying
//! reliability. [`resolve_action`] picks the first usable one, keeps the
//! world-level sentinel out of the result, and prefixes the emoji the
//! engine attached to the movement.

/// Shown when no recorded source describes the activity.
pub const DEFAULT_ACTION: &str = "Exploring the environment";

/// World-level maze name the engine writes where a real label is missing.
pub const AREA_SENTINEL: &str = "the_ville";

/// The optional text sources for one agent at one step, in priority order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionSources<'a> {
    /// Description from the movement record.
    pub movement_description: Option<&'a str>,
    /// Inline `current_action` from the position record.
    pub current_action: Option<&'a str>,
    /// Inline `description` from the position record.
    pub position_description: Option<&'a str>,
    /// Emoji ("pronunciatio") attached to the movement.
    pub emoji: Option<&'a str>,
}

/// Merge the sources into one display string.
///
/// The first non-blank text wins; the sentinel is replaced by
/// [`DEFAULT_ACTION`]; a non-blank emoji is prefixed unless the text
/// already contains it.
pub fn resolve_action(sources: &ActionSources<'_>) -> String {
    let text = [
        sources.movement_description,
        sources.current_action,
        sources.position_description,
    ]
    .into_iter()
    .flatten()
    .map(str::trim)
    .find(|s| !s.is_empty())
    .filter(|s| *s != AREA_SENTINEL)
    .unwrap_or(DEFAULT_ACTION);

    match sources.emoji.map(str::trim).filter(|e| !e.is_empty()) {
        Some(emoji) if !text.contains(emoji) => format!("{emoji} {text}"),
        _ => text.to_owned(),
    }
}
