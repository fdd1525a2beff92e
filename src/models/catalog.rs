//! Mountain catalog model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mountain name -> elevation-band forecast URLs.
///
/// Mountains iterate in name order; each URL list keeps the order the
/// elevation selector lists the bands in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MountainCatalog {
    mountains: BTreeMap<String, Vec<String>>,
}

impl MountainCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mountain, replacing any URLs already stored under the same name
    pub fn insert(&mut self, mountain: impl Into<String>, urls: Vec<String>) {
        self.mountains.insert(mountain.into(), urls);
    }

    #[must_use]
    pub fn urls(&self, mountain: &str) -> Option<&[String]> {
        self.mountains.get(mountain).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.mountains
            .iter()
            .map(|(name, urls)| (name.as_str(), urls.as_slice()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.mountains.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mountains.is_empty()
    }

    /// Total number of elevation pages across all mountains
    #[must_use]
    pub fn url_count(&self) -> usize {
        self.mountains.values().map(Vec::len).sum()
    }

    /// Keep only the named mountains; returns the names that were not found
    pub fn retain_mountains(&mut self, names: &[String]) -> Vec<String> {
        let missing = names
            .iter()
            .filter(|name| !self.mountains.contains_key(name.as_str()))
            .cloned()
            .collect();
        self.mountains.retain(|name, _| names.contains(name));
        missing
    }
}
