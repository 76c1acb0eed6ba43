//! Page table and component usage graph.
//!
//! The manifest's `page` object maps every page to its window
//! configuration. Components are not listed there; they only show up as
//! `usingComponents` specifiers of pages (or of other components). Resolving
//! those specifiers gives each component a placeholder entry so that its
//! configuration file can be reconstructed too.

use super::type_name;
use crate::error::{Error, Result};
use crate::path::PageKey;
use serde_json::{Map, Value};
use std::collections::{btree_map, BTreeMap, HashSet, VecDeque};
use tracing::{debug, warn};

const PLUGIN_SCHEME: &str = "plugin://";
const PLUGIN_ROOT: &str = "/__plugin__/";

/// Window flag marking an entry as a component
const COMPONENT_FLAG: &str = "component";

/// Configuration of one page or component
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageEntry {
    /// Window configuration, written out as the page's `.json` file
    pub window: Map<String, Value>,
}

impl PageEntry {
    /// Creates an entry with the given window object
    pub fn new(window: Map<String, Value>) -> Self {
        Self { window }
    }

    /// The `usingComponents` mapping, if present and an object
    pub fn using_components(&self) -> Option<&Map<String, Value>> {
        self.window.get("usingComponents").and_then(Value::as_object)
    }

    /// Returns true if the entry is flagged as a component
    pub fn is_component(&self) -> bool {
        self.window
            .get(COMPONENT_FLAG)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Flags the entry as a component. Other window fields are untouched.
    pub fn mark_component(&mut self) {
        self.window
            .insert(COMPONENT_FLAG.to_string(), Value::Bool(true));
    }
}

/// Every known page and component, keyed by [`PageKey`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageTable {
    entries: BTreeMap<PageKey, PageEntry>,
}

impl PageTable {
    /// Creates an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the table from the manifest's `page` object.
    ///
    /// Keys are canonicalized; when two raw keys collide the first one
    /// wins. An entry without a `window` gets an empty one.
    pub fn from_value(value: Value) -> Result<Self> {
        let raw = match value {
            Value::Object(raw) => raw,
            other => {
                return Err(Error::malformed(
                    "page",
                    format!("expected an object, found {}", type_name(&other)),
                ))
            }
        };

        let mut table = Self::new();
        for (raw_key, entry) in raw {
            let window = match entry {
                Value::Object(mut entry) => match entry.shift_remove("window") {
                    Some(Value::Object(window)) => window,
                    None | Some(Value::Null) => Map::new(),
                    Some(other) => {
                        return Err(Error::malformed(
                            format!("page[{raw_key}].window"),
                            format!("expected an object, found {}", type_name(&other)),
                        ))
                    }
                },
                other => {
                    return Err(Error::malformed(
                        format!("page[{raw_key}]"),
                        format!("expected an object, found {}", type_name(&other)),
                    ))
                }
            };
            table
                .entries
                .entry(PageKey::new(&raw_key))
                .or_insert_with(|| PageEntry::new(window));
        }
        Ok(table)
    }

    /// Returns the entry for `key`
    pub fn get(&self, key: &str) -> Option<&PageEntry> {
        self.entries.get(key)
    }

    /// Inserts or replaces an entry
    pub fn insert(&mut self, key: PageKey, entry: PageEntry) {
        self.entries.insert(key, entry);
    }

    /// Returns the entry for `key`, creating an empty one if absent.
    ///
    /// The flag is true if the entry was created.
    pub fn ensure(&mut self, key: PageKey) -> (&mut PageEntry, bool) {
        match self.entries.entry(key) {
            btree_map::Entry::Occupied(e) => (e.into_mut(), false),
            btree_map::Entry::Vacant(e) => (e.insert(PageEntry::default()), true),
        }
    }

    /// Iterates over keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &PageKey> {
        self.entries.keys()
    }

    /// Iterates over entries in sorted key order
    pub fn iter(&self) -> impl Iterator<Item = (&PageKey, &PageEntry)> {
        self.entries.iter()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Maps a `usingComponents` specifier to the key of the component it names.
///
/// `plugin://X` becomes `__plugin__/X`, a leading `/` makes the specifier
/// absolute, anything else is relative to the directory of `from`.
pub fn resolve_specifier(from: &PageKey, specifier: &str) -> PageKey {
    let specifier = specifier.replacen(PLUGIN_SCHEME, PLUGIN_ROOT, 1);
    match specifier.strip_prefix('/') {
        Some(absolute) => PageKey::new(absolute),
        None => from.resolve_relative(&specifier),
    }
}

/// Outcome of component graph resolution
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ComponentStats {
    /// Specifiers resolved
    pub resolved: usize,
    /// Placeholder entries created
    pub created: usize,
}

/// Resolves every `usingComponents` specifier in the table and flags the
/// targets as components, creating placeholder entries where needed.
///
/// Each key is visited once, so cyclic usage terminates.
pub fn resolve_components(table: &mut PageTable) -> ComponentStats {
    let mut stats = ComponentStats::default();
    let mut queue: VecDeque<PageKey> = table.keys().cloned().collect();
    let mut visited: HashSet<PageKey> = HashSet::new();

    while let Some(key) = queue.pop_front() {
        if !visited.insert(key.clone()) {
            continue;
        }

        let using = table
            .get(key.as_str())
            .and_then(PageEntry::using_components);
        let specifiers: Vec<String> = match using {
            Some(using) => using
                .iter()
                .filter_map(|(name, spec)| match spec {
                    Value::String(spec) => Some(spec.clone()),
                    other => {
                        warn!(
                            "Ignoring non-string component specifier {}.{} ({})",
                            key,
                            name,
                            type_name(other)
                        );
                        None
                    }
                })
                .collect(),
            None => continue,
        };

        for specifier in specifiers {
            let target = resolve_specifier(&key, &specifier);
            let (entry, created) = table.ensure(target.clone());
            entry.mark_component();
            stats.resolved += 1;
            if created {
                stats.created += 1;
                queue.push_back(target);
            }
        }
    }

    debug!(
        "Resolved {} component references, {} placeholder entries",
        stats.resolved, stats.created
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_resolve_specifier() {
        let from = PageKey::new("pages/index");
        assert_eq!(resolve_specifier(&from, "plugin://foo/bar").as_str(), "__plugin__/foo/bar");
        assert_eq!(resolve_specifier(&from, "/comp/x").as_str(), "comp/x");
        assert_eq!(resolve_specifier(&from, "./c").as_str(), "pages/c");
        assert_eq!(resolve_specifier(&from, "../lib/y").as_str(), "lib/y");
    }

    #[test]
    fn test_from_value_canonicalizes_keys() {
        let table = PageTable::from_value(json!({
            "pages/index.html": {"window": {"title": "A"}},
            "pages/other": {},
        }))
        .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("pages/index").unwrap().window["title"], json!("A"));
        assert!(table.get("pages/other").unwrap().window.is_empty());
    }

    #[test]
    fn test_creates_flagged_placeholder() {
        let mut table = PageTable::from_value(json!({
            "pages/index": {"window": {"usingComponents": {"c": "./c"}}},
        }))
        .unwrap();

        let stats = resolve_components(&mut table);

        assert_eq!(stats, ComponentStats { resolved: 1, created: 1 });
        assert!(table.get("pages/c").unwrap().is_component());
        assert!(!table.get("pages/index").unwrap().is_component());
    }

    #[test]
    fn test_existing_window_is_preserved() {
        let mut table = PageTable::from_value(json!({
            "pages/index": {"window": {"usingComponents": {"c": "/comp/card"}}},
            "comp/card": {"window": {"styleIsolation": "shared", "usingComponents": {}}},
        }))
        .unwrap();

        resolve_components(&mut table);

        let card = &table.get("comp/card").unwrap().window;
        assert_eq!(
            Value::Object(card.clone()),
            json!({"styleIsolation": "shared", "usingComponents": {}, "component": true})
        );
    }

    #[test]
    fn test_cyclic_usage_terminates() {
        let mut table = PageTable::from_value(json!({
            "comp/a": {"window": {"usingComponents": {"b": "./b"}}},
            "comp/b": {"window": {"usingComponents": {"a": "./a"}}},
        }))
        .unwrap();

        let stats = resolve_components(&mut table);

        assert_eq!(stats, ComponentStats { resolved: 2, created: 0 });
        assert!(table.get("comp/a").unwrap().is_component());
        assert!(table.get("comp/b").unwrap().is_component());
    }

    #[test]
    fn test_non_string_specifier_is_skipped() {
        let mut table = PageTable::from_value(json!({
            "pages/index": {"window": {"usingComponents": {"bad": 3, "ok": "./ok"}}},
        }))
        .unwrap();

        let stats = resolve_components(&mut table);
        assert_eq!(stats.resolved, 1);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_rejects_non_object_page() {
        assert!(PageTable::from_value(json!([])).is_err());
        assert!(PageTable::from_value(json!({"a": 1})).is_err());
    }
}
