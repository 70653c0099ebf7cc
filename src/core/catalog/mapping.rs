//! Provenance mapping: which original file each renamed image came from.
//!
//! Stored as a flat JSON object `{ "item-1-1.jpg": "2025-10-29 12.00.25.jpg" }`.
//! Entries always point at the first known name, even after several runs.

use super::store::{read_json_if_exists, write_json_atomic};
use crate::error::CatalogError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Mapping from current file name to original file name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProvenanceMapping {
    entries: BTreeMap<String, String>,
}

impl ProvenanceMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a mapping file; a missing file yields an empty mapping
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        Ok(read_json_if_exists(path)?.unwrap_or_default())
    }

    /// Atomically write the mapping file
    pub fn save(&self, path: &Path) -> Result<(), CatalogError> {
        write_json_atomic(path, self)
    }

    /// Original name recorded for `current`, if any
    pub fn original_for(&self, current: &str) -> Option<&str> {
        self.entries.get(current).map(String::as_str)
    }

    /// Original name for `current`, falling back to `current` itself
    pub fn origin_of<'a>(&'a self, current: &'a str) -> &'a str {
        self.original_for(current).unwrap_or(current)
    }

    /// Record that `new_name` originally was `original`
    pub fn insert(&mut self, new_name: impl Into<String>, original: impl Into<String>) {
        self.entries.insert(new_name.into(), original.into());
    }

    pub fn remove(&mut self, new_name: &str) -> Option<String> {
        self.entries.remove(new_name)
    }

    /// Keep only the entries for which `keep(new_name, original)` is true
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str, &str) -> bool,
    {
        self.entries.retain(|k, v| keep(k.as_str(), v.as_str()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for ProvenanceMapping {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
