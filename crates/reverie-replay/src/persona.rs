//! Persona description lookup from recorded memory snapshots.
//!
//! Archives keep each persona's associative memory at a fixed path; live
//! runs scatter it across the persona's `bootstrap_memory` tree. Either way
//! the lookup is best-effort: any failure yields
//! [`DEFAULT_PERSONA_DESCRIPTION`] and never aborts frame construction.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use reverie_types::{SimId, is_safe_path_segment};
use serde_json::Value;
use tracing::{debug, warn};

use crate::storage::{ReadOutcome, read_json};

/// Returned when no recorded description can be found.
pub const DEFAULT_PERSONA_DESCRIPTION: &str = "A generative agent";

/// Memory snapshot inside an archived persona directory.
const ARCHIVE_MEMORY_FILE: &[&str] = &["bootstrap_memory", "associative_memory", "nodes.json"];

/// Path segment that marks files eligible in a live persona tree.
const BOOTSTRAP_SEGMENT: &str = "bootstrap_memory";

/// Live persona trees deeper than this are not descended into.
const MAX_WALK_DEPTH: usize = 8;

/// Where persona memory lives inside a simulation directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonaLayout {
    /// `personas/<name>/bootstrap_memory/associative_memory/nodes.json`.
    Archived,
    /// Any `*.json` under `personas/<name>/` with a `bootstrap_memory`
    /// path segment, searched in sorted order.
    Live,
}

/// Resolves persona descriptions for one storage layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersonaDescriptionResolver {
    layout: PersonaLayout,
}

impl PersonaDescriptionResolver {
    /// Create a resolver for the given layout.
    pub const fn new(layout: PersonaLayout) -> Self {
        Self { layout }
    }

    /// Resolve the description of `persona` in simulation `sim_id` under
    /// `storage_root`, falling back to [`DEFAULT_PERSONA_DESCRIPTION`].
    pub fn resolve(&self, storage_root: &Path, sim_id: &SimId, persona: &str) -> String {
        if !is_safe_path_segment(persona) {
            warn!(sim_id = %sim_id, persona, "refusing unsafe persona name");
            return DEFAULT_PERSONA_DESCRIPTION.to_owned();
        }
        let persona_dir = storage_root
            .join(sim_id.as_str())
            .join("personas")
            .join(persona);

        let found = match self.layout {
            PersonaLayout::Archived => archived_description(&persona_dir),
            PersonaLayout::Live => live_description(&persona_dir),
        };
        found.unwrap_or_else(|| {
            debug!(sim_id = %sim_id, persona, "no recorded persona description");
            DEFAULT_PERSONA_DESCRIPTION.to_owned()
        })
    }
}

/// Per-request memo so each persona is resolved at most once while a
/// replay materializes many frames. Dropped with the request.
#[derive(Debug, Clone)]
pub struct PersonaMemo<'a> {
    resolver: PersonaDescriptionResolver,
    storage_root: &'a Path,
    sim_id: SimId,
    resolved: BTreeMap<String, String>,
}

impl<'a> PersonaMemo<'a> {
    /// Create an empty memo for one simulation.
    pub const fn new(
        resolver: PersonaDescriptionResolver,
        storage_root: &'a Path,
        sim_id: SimId,
    ) -> Self {
        Self {
            resolver,
            storage_root,
            sim_id,
            resolved: BTreeMap::new(),
        }
    }

    /// The description of `persona`, resolving it on first use.
    pub fn describe(&mut self, persona: &str) -> String {
        if let Some(known) = self.resolved.get(persona) {
            return known.clone();
        }
        let description = self
            .resolver
            .resolve(self.storage_root, &self.sim_id, persona);
        self.resolved
            .insert(persona.to_owned(), description.clone());
        description
    }
}

fn archived_description(persona_dir: &Path) -> Option<String> {
    let path = ARCHIVE_MEMORY_FILE
        .iter()
        .fold(persona_dir.to_path_buf(), |acc, segment| acc.join(segment));
    read_json::<Value>(&path)
        .optional(&path)
        .as_ref()
        .and_then(first_entry_description)
}

fn live_description(persona_dir: &Path) -> Option<String> {
    let mut files = Vec::new();
    collect_json_files(persona_dir, 0, &mut files);
    files.sort();

    files
        .iter()
        .filter(|path| {
            path.strip_prefix(persona_dir)
                .is_ok_and(|rel| rel.iter().any(|c| c == BOOTSTRAP_SEGMENT))
        })
        .find_map(|path| match read_json::<Value>(path) {
            ReadOutcome::Found(value) => top_level_description(&value)
                .or_else(|| first_entry_description(&value)),
            ReadOutcome::Missing => None,
            ReadOutcome::Malformed(reason) => {
                debug!(path = %path.display(), error = %reason, "skipping unreadable persona file");
                None
            }
        })
}

/// Recursively gather `*.json` files without following symlinks.
fn collect_json_files(dir: &Path, depth: usize, out: &mut Vec<PathBuf>) {
    if depth > MAX_WALK_DEPTH {
        return;
    }
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        let path = entry.path();
        if file_type.is_dir() {
            collect_json_files(&path, depth.saturating_add(1), out);
        } else if file_type.is_file()
            && path.extension().and_then(|ext| ext.to_str()) == Some("json")
        {
            out.push(path);
        }
    }
}

fn top_level_description(value: &Value) -> Option<String> {
    non_blank(value.get("description")?)
}

/// The `description` of the first entry of an object (file order) or array.
fn first_entry_description(value: &Value) -> Option<String> {
    let first = match value {
        Value::Object(map) => map.values().next()?,
        Value::Array(items) => items.first()?,
        _ => return None,
    };
    non_blank(first.get("description")?)
}

fn non_blank(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use super::*;

    fn sim() -> SimId {
        SimId::parse("sim_1").unwrap()
    }

    fn write(path: &Path, body: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    #[test]
    fn archived_uses_first_entry_in_file_order() {
        let root = tempfile::tempdir().unwrap();
        let nodes = root
            .path()
            .join("sim_1/personas/Alice/bootstrap_memory/associative_memory/nodes.json");
        write(
            &nodes,
            r#"{"node_2": {"description": "Alice is a researcher"}, "node_1": {"description": "later"}}"#,
        );

        let resolver = PersonaDescriptionResolver::new(PersonaLayout::Archived);
        assert_eq!(
            resolver.resolve(root.path(), &sim(), "Alice"),
            "Alice is a researcher"
        );
    }

    #[test]
    fn archived_falls_back_when_missing_or_malformed() {
        let root = tempfile::tempdir().unwrap();
        let resolver = PersonaDescriptionResolver::new(PersonaLayout::Archived);
        assert_eq!(
            resolver.resolve(root.path(), &sim(), "Bob"),
            DEFAULT_PERSONA_DESCRIPTION
        );

        let nodes = root
            .path()
            .join("sim_1/personas/Bob/bootstrap_memory/associative_memory/nodes.json");
        write(&nodes, "{broken");
        assert_eq!(
            resolver.resolve(root.path(), &sim(), "Bob"),
            DEFAULT_PERSONA_DESCRIPTION
        );
    }

    #[test]
    fn live_walk_requires_bootstrap_segment_and_picks_first_sorted_match() {
        let root = tempfile::tempdir().unwrap();
        let base = root.path().join("sim_1/personas/Alice");
        write(&base.join("notes.json"), r#"{"description": "outside bootstrap"}"#);
        write(
            &base.join("bootstrap_memory/scratch.json"),
            r#"{"innate": "kind"}"#,
        );
        write(
            &base.join("bootstrap_memory/associative_memory/nodes.json"),
            r#"{"node_1": {"description": "from nodes"}}"#,
        );
        write(
            &base.join("bootstrap_memory/b.json"),
            r#"{"description": "from b"}"#,
        );

        let resolver = PersonaDescriptionResolver::new(PersonaLayout::Live);
        assert_eq!(resolver.resolve(root.path(), &sim(), "Alice"), "from nodes");
    }

    #[test]
    fn memo_resolves_once() {
        let root = tempfile::tempdir().unwrap();
        let nodes = root
            .path()
            .join("sim_1/personas/Alice/bootstrap_memory/associative_memory/nodes.json");
        write(&nodes, r#"[{"description": "first"}]"#);

        let resolver = PersonaDescriptionResolver::new(PersonaLayout::Archived);
        let mut memo = PersonaMemo::new(resolver, root.path(), sim());
        assert_eq!(memo.describe("Alice"), "first");

        // Later edits are not observed within the same request.
        write(&nodes, r#"[{"description": "second"}]"#);
        assert_eq!(memo.describe("Alice"), "first");
    }

    #[test]
    fn unsafe_persona_names_are_refused() {
        let root = tempfile::tempdir().unwrap();
        let resolver = PersonaDescriptionResolver::new(PersonaLayout::Live);
        assert_eq!(
            resolver.resolve(root.path(), &sim(), "../../etc"),
            DEFAULT_PERSONA_DESCRIPTION
        );
    }
}
