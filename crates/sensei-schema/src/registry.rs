//! Path-keyed lookup tables.

use std::collections::{BTreeMap, HashSet};

use crate::types::SchemaEntry;

/// Completion candidates keyed by dotted context path.
///
/// The root path is `""`. Paths form an implicit tree (`llm.format.type` sits
/// below `llm.format`), but a path may be registered without its ancestors.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    paths: BTreeMap<&'static str, &'static [SchemaEntry]>,
}

impl SchemaRegistry {
    pub fn new(paths: impl IntoIterator<Item = (&'static str, &'static [SchemaEntry])>) -> Self {
        Self {
            paths: paths.into_iter().collect(),
        }
    }

    /// Exact lookup, no fallback.
    pub fn get(&self, path: &str) -> Option<&'static [SchemaEntry]> {
        self.paths.get(path).copied()
    }

    /// Look up `path`, stripping trailing `.segment`s until a registered path
    /// is found.
    ///
    /// Returns the path that matched together with its entries. When nothing
    /// matches, not even the root, the result is `("", &[])`.
    pub fn lookup<'p>(&self, path: &'p str) -> (&'p str, &'static [SchemaEntry]) {
        let mut current = path;
        loop {
            if let Some(entries) = self.get(current) {
                return (current, entries);
            }
            if current.is_empty() {
                return ("", &[]);
            }
            current = match current.rfind('.') {
                Some(dot) => &current[..dot],
                None => "",
            };
        }
    }

    /// The entry labelled `label` directly under `path`.
    pub fn entry(&self, path: &str, label: &str) -> Option<&'static SchemaEntry> {
        self.get(path)?.iter().find(|e| e.label == label)
    }

    /// Every label in the registry, deduplicated, in path order then
    /// declaration order.
    pub fn labels(&self) -> Vec<&'static str> {
        let mut seen = HashSet::new();
        self.paths
            .values()
            .flat_map(|entries| entries.iter())
            .map(|e| e.label)
            .filter(|label| seen.insert(*label))
            .collect()
    }

    /// Registered paths in sorted order.
    pub fn paths(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.paths.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Keys a document is expected to define.
///
/// Only used for hinting; nothing is rejected on the client side.
#[derive(Debug, Clone, Default)]
pub struct RequiredFieldSpec {
    /// Required keys at the document root.
    pub top_level: &'static [&'static str],
    /// Required child keys per context path.
    pub nested: &'static [(&'static str, &'static [&'static str])],
}

impl RequiredFieldSpec {
    /// Required child keys of `path`. The root path yields the top-level list.
    pub fn required_at(&self, path: &str) -> &'static [&'static str] {
        if path.is_empty() {
            return self.top_level;
        }
        self.nested
            .iter()
            .find(|(p, _)| *p == path)
            .map(|(_, keys)| *keys)
            .unwrap_or(&[])
    }

    /// Every path that carries requirements, the root first.
    pub fn paths(&self) -> impl Iterator<Item = &'static str> + '_ {
        std::iter::once("").chain(self.nested.iter().map(|(p, _)| *p))
    }
}
